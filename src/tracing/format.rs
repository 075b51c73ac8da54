use chrono::Utc;
use tracing::Event;
use tracing::Subscriber;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::fmt::FormattedFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::registry::LookupSpan;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// `LEVEL timestamp::engine::[file:line::]span{fields}::...::message`
///
/// The span chain carries the analysis context, e.g. the address under
/// analysis and the signature being extracted, so every line can be traced
/// back to the transaction it came from.
#[derive(Debug, Clone)]
pub struct MuhaqqiqFormat {
    engine_name: String,
    source_location: bool,
}

impl MuhaqqiqFormat {
    pub fn new(
        engine_name: impl Into<String>,
        source_location: bool,
    ) -> Self {
        Self {
            engine_name: engine_name.into(),
            source_location,
        }
    }
}

impl<S, N> FormatEvent<S, N> for MuhaqqiqFormat
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} {}::{}::",
            metadata.level(),
            Utc::now().format(TIMESTAMP_FORMAT),
            self.engine_name
        )?;

        if self.source_location
            && let (Some(file), Some(line)) = (metadata.file(), metadata.line())
        {
            write!(writer, "{}:{}::", file, line)?;
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>()
                    && !fields.is_empty()
                {
                    write!(writer, "{{{}}}", fields)?;
                }
                write!(writer, "::")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::LogBuffer;

    fn capture(
        source_location: bool,
        emit: impl FnOnce(),
    ) -> String {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .event_format(MuhaqqiqFormat::new("muhaqqiq", source_location))
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        buffer.contents()
    }

    #[test]
    fn lines_carry_the_span_chain() {
        let line = capture(false, || {
            let address = tracing::info_span!("analyze_address", address = %"Addr1");
            let _address = address.enter();
            let extract = tracing::info_span!("extract", signature = %"sig-1");
            let _extract = extract.enter();
            tracing::info!("extracted_transfers::parsed::{}", 2);
        });

        assert!(line.starts_with("INFO "));
        assert!(line.ends_with(
            "::muhaqqiq::analyze_address{address=Addr1}::extract{signature=sig-1}::extracted_transfers::parsed::2\n"
        ));
    }

    #[test]
    fn source_location_is_optional() {
        let with_location = capture(true, || tracing::warn!("rpc_slow"));
        let without_location = capture(false, || tracing::warn!("rpc_slow"));

        assert!(with_location.contains("format.rs:"));
        assert!(!without_location.contains("format.rs:"));
        assert!(without_location.ends_with("::muhaqqiq::rpc_slow\n"));
    }
}
