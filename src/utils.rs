use solana_native_token::LAMPORTS_PER_SOL;

/// Whole-SOL amounts that stand out when moved in one piece.
const ROUND_SOL_AMOUNTS: &[u64] = &[1, 5, 10, 20, 50, 100, 200, 500, 1000, 10000];

/// Exactly one of the conspicuous whole-SOL amounts.
pub fn is_round_sol_amount(lamports: u64) -> bool {
    lamports % LAMPORTS_PER_SOL == 0 && ROUND_SOL_AMOUNTS.contains(&(lamports / LAMPORTS_PER_SOL))
}

/// `|a - b| / max(a, b, 1)`
pub fn relative_difference(
    a: u128,
    b: u128,
) -> f64 {
    a.abs_diff(b) as f64 / a.max(b).max(1) as f64
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(LAMPORTS_PER_SOL, true)]
    #[case(500 * LAMPORTS_PER_SOL, true)]
    #[case(3 * LAMPORTS_PER_SOL, false)]
    #[case(LAMPORTS_PER_SOL + 1, false)]
    #[case(0, false)]
    fn round_amounts(
        #[case] lamports: u64,
        #[case] expected: bool,
    ) {
        assert_eq!(is_round_sol_amount(lamports), expected);
    }

    #[test]
    fn relative_difference_never_divides_by_zero() {
        assert_eq!(relative_difference(0, 0), 0.0);
        assert!((relative_difference(100, 85) - 0.15).abs() < 1e-9);
    }
}
