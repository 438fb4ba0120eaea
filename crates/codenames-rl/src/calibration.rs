//! Batch-level calibration of the acceptance probability.
//!
//! The calibrated probability is the mean, over judged samples, of the
//! reported surviving targets divided by the game's good-word count.

use codenames_core::{Game, Oversight};

/// Value returned when a batch has no judged samples to calibrate against.
pub const CALIBRATION_FALLBACK: f64 = 0.5;

/// Mean surviving fraction over `(oversight, game)` pairs.
///
/// Pairs without an oversight are skipped. Returns `None` when nothing was
/// judged. The result is in [0, 1] for verdicts accepted by
/// [`codenames_core::JudgedClue::new`].
pub fn calibrate_from_pairs<'a, I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<&'a Oversight>, &'a Game)>,
{
    let mut sum = 0.0;
    let mut n_valid = 0usize;
    for (oversight, game) in pairs {
        if let Some(oversight) = oversight {
            sum += oversight.n_surviving() as f64 / game.good_count() as f64;
            n_valid += 1;
        }
    }
    if n_valid == 0 {
        None
    } else {
        Some(sum / n_valid as f64)
    }
}

/// Calibrated acceptance probability for a batch.
///
/// `oversights` and `games` are index-aligned and must have the same length.
/// Falls back to [`CALIBRATION_FALLBACK`] when every oversight is absent.
/// For well-formed verdicts the result is in the closed interval [0, 1];
/// see [`clamp_probability`] before feeding it to the reward engine.
pub fn approximate_calibrate_p(oversights: &[Option<Oversight>], games: &[Game]) -> f64 {
    assert_eq!(
        oversights.len(),
        games.len(),
        "oversights length ({}) must match games length ({})",
        oversights.len(),
        games.len()
    );
    calibrate_from_pairs(oversights.iter().map(Option::as_ref).zip(games))
        .unwrap_or(CALIBRATION_FALLBACK)
}

/// Keep `p` inside `[margin, 1 - margin]`.
///
/// Returns the (possibly) clamped value and whether clamping happened.
pub fn clamp_probability(p: f64, margin: f64) -> (f64, bool) {
    let clamped = p.clamp(margin, 1.0 - margin);
    (clamped, clamped != p)
}
