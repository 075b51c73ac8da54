use tracing::Level;
use tracing::Metadata;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::Filter;
use tracing_subscriber::registry::LookupSpan;

/// Only events emitted from this crate reach the log files.
pub const CRATE_TARGET: &str = "muhaqqiq";

// Spans of the crate pass at every level so each sink keeps the analysis
// context; events pass only at the listed levels.
fn passes(
    meta: &Metadata<'_>,
    levels: &[Level],
) -> bool {
    meta.target().starts_with(CRATE_TARGET) && (meta.is_span() || levels.contains(meta.level()))
}

macro_rules! level_filter {
    ($(#[$attr:meta])* $name:ident => [$($level:expr),+]) => {
        $(#[$attr])*
        pub struct $name;

        $(#[$attr])*
        impl<S> Filter<S> for $name
        where
            S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
        {
            fn enabled(
                &self,
                meta: &Metadata<'_>,
                _ctx: &Context<'_, S>,
            ) -> bool {
                passes(meta, &[$($level),+])
            }
        }
    };
}

level_filter!(DebugOnlyFilter => [Level::DEBUG]);
level_filter!(ErrorWarnFilter => [Level::ERROR, Level::WARN]);
level_filter!(#[cfg(feature = "dev")] InfoOnlyFilter => [Level::INFO]);
level_filter!(#[cfg(feature = "prod")] ErrorOnlyFilter => [Level::ERROR]);

#[cfg(test)]
mod tests {
    use tracing_subscriber::Layer;
    use tracing_subscriber::prelude::*;

    use super::*;
    use crate::test_utils::fixtures::LogBuffer;
    use crate::tracing::MuhaqqiqFormat;

    #[test]
    fn error_sink_keeps_info_spans_and_drops_info_events() {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(MuhaqqiqFormat::new("muhaqqiq", false))
                .with_writer(buffer.clone())
                .with_ansi(false)
                .with_filter(ErrorWarnFilter),
        );

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("analyze_address", address = %"Addr1");
            let _entered = span.enter();
            tracing::info!("not_written");
            tracing::warn!("rpc_slow");
        });

        let contents = buffer.contents();
        assert!(!contents.contains("not_written"));
        assert!(contents.contains("::analyze_address{address=Addr1}::rpc_slow"));
    }
}
