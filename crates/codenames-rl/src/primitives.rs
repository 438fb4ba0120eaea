//! Numeric primitives the reward recursion is built on.
//!
//! Neither function validates its input. Out-of-range arguments produce the
//! natural floating-point result (an infinity or NaN), which callers are
//! expected to rule out beforehand.

/// Logit transform `ln(p / (1 - p))`, defined for `0 < p < 1`.
#[inline]
pub fn log_odds(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Reference probability that a guess made uniformly among the bad words
/// plus one generic "non-bad" outcome avoids every bad word.
///
/// Always in (0, 1]; exactly 1.0 when the game has no bad words.
#[inline]
pub fn base_probability(bad_words_in_game: usize) -> f64 {
    1.0 / (bad_words_in_game as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_odds_midpoint() {
        assert_eq!(log_odds(0.5), 0.0);
    }

    #[test]
    fn test_log_odds_known_values() {
        assert!((log_odds(0.25) - (1.0f64 / 3.0).ln()).abs() < 1e-15);
        assert!((log_odds(0.6) - 1.5f64.ln()).abs() < 1e-15);
    }

    #[test]
    fn test_log_odds_boundary_is_not_finite() {
        assert_eq!(log_odds(1.0), f64::INFINITY);
        assert_eq!(log_odds(0.0), f64::NEG_INFINITY);
        assert!(log_odds(1.5).is_nan());
    }

    #[test]
    fn test_base_probability() {
        assert_eq!(base_probability(0), 1.0);
        assert_eq!(base_probability(1), 0.5);
        assert_eq!(base_probability(3), 0.25);
        for bad in 0..50 {
            assert!(base_probability(bad + 1) < base_probability(bad));
        }
    }
}
