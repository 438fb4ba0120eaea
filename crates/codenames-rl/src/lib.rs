//! codenames-rl: calibrated rewards for debate-supervised clue giving
//!
//! Turns oversight verdicts on Codenames clues into scalar rewards for a
//! KL-regularized policy-gradient trainer.
//!
//! ## Architecture
//!
//! 1. **Primitives**: log-odds and the bad-word base probability
//! 2. **Calibration**: one acceptance probability per batch from oversight outcomes
//! 3. **Engine**: recursive accept/reject rewards, memoized on their exact arguments
//! 4. **Scorer**: batch orchestration, domain checks and statistics
//!
//! The engine operates on counts and probabilities only; games and
//! oversights never reach it.

pub mod calibration;
pub mod engine;
pub mod logging;
pub mod primitives;
pub mod scorer;

pub use calibration::{approximate_calibrate_p, clamp_probability, CALIBRATION_FALLBACK};
pub use engine::{initial_reward_reject, reward_accept, reward_reject, RewardEngine, RewardParams};
pub use primitives::{base_probability, log_odds};
pub use scorer::{BatchRewards, BatchStats, RewardScorer, SampleReward};
