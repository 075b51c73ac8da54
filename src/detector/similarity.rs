use tracing::debug;

use crate::model::PoisoningCandidate;
use crate::model::PoisoningReport;
use crate::model::SimilarityKind;
use crate::model::SimilarityScore;

const PREFIX_WEIGHT: f64 = 0.8;
const SUFFIX_WEIGHT: f64 = 0.2;
const PREFIX_SPAN: usize = 8;
const SUFFIX_SPAN: usize = 4;

/// Default score a candidate has to exceed.
pub const CANDIDATE_THRESHOLD: f64 = 0.7;

/// Visual similarity of two addresses in `[0, 1]`, weighted towards the leading
/// characters that wallets display first. Matches beyond eight leading or four
/// trailing characters add nothing.
pub fn similarity(
    a: &str,
    b: &str,
) -> SimilarityScore {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let min_len = a.len().min(b.len());

    let prefix_len = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix_len = a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count();

    let score = if min_len == 0 {
        0.0
    } else {
        let ratio = |common: usize, span: usize| (common as f64 / span.min(min_len) as f64).min(1.0);
        PREFIX_WEIGHT * ratio(prefix_len, PREFIX_SPAN) + SUFFIX_WEIGHT * ratio(suffix_len, SUFFIX_SPAN)
    };

    let kind = if prefix_len >= 8 {
        SimilarityKind::Prefix
    } else if suffix_len >= 4 {
        SimilarityKind::Suffix
    } else if prefix_len >= 4 && suffix_len >= 2 {
        SimilarityKind::Both
    } else {
        SimilarityKind::None
    };

    SimilarityScore {
        score,
        kind,
        prefix_len,
        suffix_len,
    }
}

/// Scores `target` against `known` addresses. Candidates keep input order;
/// the target itself is never a candidate.
pub fn analyze_similarity<S: AsRef<str>>(
    target: &str,
    known: &[S],
    threshold: f64,
) -> PoisoningReport {
    let candidates: Vec<PoisoningCandidate> = known
        .iter()
        .map(AsRef::as_ref)
        .filter(|address| *address != target)
        .filter_map(|address| {
            let score = similarity(target, address);
            (score.score > threshold).then(|| PoisoningCandidate {
                address: address.to_string(),
                similarity: score,
            })
        })
        .collect();

    let risk = poisoning_risk(&candidates);
    debug!(
        "similarity_analysis::target::{}::known::{}::candidates::{}::risk::{:.3}",
        target,
        known.len(),
        candidates.len(),
        risk
    );

    PoisoningReport {
        target: target.to_string(),
        candidates,
        risk,
    }
}

pub fn poisoning_risk(candidates: &[PoisoningCandidate]) -> f64 {
    let Some(max) = candidates
        .iter()
        .map(|candidate| candidate.similarity.score)
        .reduce(f64::max)
    else {
        return 0.0;
    };
    let count_factor = (candidates.len() as f64 / 5.0).min(1.0);
    0.7 * max + 0.3 * count_factor
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn shared_eight_char_prefix() {
        let score = similarity("Aaaaaaaa1111", "Aaaaaaaa2222");
        assert_eq!(score.kind, SimilarityKind::Prefix);
        assert_eq!(score.prefix_len, 8);
        assert_eq!(score.suffix_len, 0);
        assert!((score.score - 0.8).abs() < 1e-9);
    }

    #[rstest]
    #[case("abcdefgh", "zzzzefgh", SimilarityKind::Suffix)]
    #[case("abcdXXef", "abcdYYef", SimilarityKind::Both)]
    #[case("abcdefgh", "zyxwvuts", SimilarityKind::None)]
    fn classifies_kind(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: SimilarityKind,
    ) {
        assert_eq!(similarity(a, b).kind, expected);
    }

    #[test]
    fn empty_address_scores_zero() {
        assert_eq!(similarity("", "abc").score, 0.0);
    }

    #[test]
    fn risk_combines_max_and_count() {
        let report = analyze_similarity(
            "Aaaaaaaa1111",
            &["Aaaaaaaa2222", "Bbbbbbbb3333", "Aaaaaaaa1111"],
            CANDIDATE_THRESHOLD,
        );
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].address, "Aaaaaaaa2222");
        // 0.7 * 0.8 + 0.3 * 1/5
        assert!((report.risk - 0.62).abs() < 1e-9);
    }

    #[test]
    fn no_candidates_no_risk() {
        let report = analyze_similarity::<&str>("Aaaaaaaa1111", &[], CANDIDATE_THRESHOLD);
        assert!(report.candidates.is_empty());
        assert_eq!(report.risk, 0.0);
    }
}
