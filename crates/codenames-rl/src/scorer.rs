//! Batch reward scoring for judged clues.
//!
//! Algorithm:
//! 1. Calibrate one acceptance probability over every judged sample
//! 2. Clamp it away from 0 and 1 so log-odds stay finite
//! 3. Per judged sample, validate the reward arguments and pick the accept
//!    reward when every claimed target survived, the reject reward otherwise
//! 4. Unjudged samples get no reward
//!
//! A fault while rewarding one sample is recorded on that sample; the rest of
//! the batch is still scored.

use codenames_core::{CodenamesError, JudgedClue, RewardConfig, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::calibration::{calibrate_from_pairs, clamp_probability, CALIBRATION_FALLBACK};
use crate::engine::{RewardEngine, RewardParams};

/// Reward assigned to one sample of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReward {
    /// Position in the batch.
    pub index: usize,
    /// `None` when the sample was not judged or could not be rewarded.
    pub accepted: Option<bool>,
    /// `None` when the sample was not judged or could not be rewarded.
    pub reward: Option<f64>,
    /// Why the reward computation for this sample was abandoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SampleReward {
    fn unjudged(index: usize) -> Self {
        Self {
            index,
            accepted: None,
            reward: None,
            error: None,
        }
    }

    fn failed(index: usize, err: &CodenamesError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::unjudged(index)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary statistics over the judged samples of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub n_samples: usize,
    /// Samples that received a reward.
    pub n_judged: usize,
    /// Judged samples whose reward computation failed.
    pub n_failed: usize,
    pub n_accepted: usize,
    pub mean_reward: f64,
    pub reward_std: f64,
    /// Accepted / judged.
    pub acceptance_rate: f64,
}

impl BatchStats {
    fn from_samples(samples: &[SampleReward]) -> Self {
        let rewards: Vec<f64> = samples.iter().filter_map(|s| s.reward).collect();
        let n_judged = rewards.len();
        let n_accepted = samples.iter().filter(|s| s.accepted == Some(true)).count();
        let n_failed = samples.iter().filter(|s| s.is_failed()).count();

        if n_judged == 0 {
            return Self {
                n_samples: samples.len(),
                n_failed,
                ..Default::default()
            };
        }

        let n = n_judged as f64;
        let mean_reward = rewards.iter().sum::<f64>() / n;
        let variance = rewards.iter().map(|r| (r - mean_reward).powi(2)).sum::<f64>() / n;

        Self {
            n_samples: samples.len(),
            n_judged,
            n_failed,
            n_accepted,
            mean_reward,
            reward_std: variance.sqrt(),
            acceptance_rate: n_accepted as f64 / n,
        }
    }
}

/// Result of scoring one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRewards {
    /// Probability the rewards were computed with.
    pub calibrated_p: f64,
    /// Estimator output before clamping.
    pub raw_calibrated_p: f64,
    /// No sample was judged, so the fixed fallback was used.
    pub used_fallback: bool,
    /// `raw_calibrated_p` had to be moved inside the margin.
    pub clamped: bool,
    pub samples: Vec<SampleReward>,
    pub stats: BatchStats,
}

impl BatchRewards {
    /// Per-sample rewards in batch order.
    pub fn rewards(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.reward).collect()
    }
}

/// Scores batches of judged clues against a reward configuration.
pub struct RewardScorer {
    config: RewardConfig,
    engine: &'static RewardEngine,
}

impl RewardScorer {
    /// Create a scorer. Memoized configs share the process-wide engine.
    pub fn new(config: RewardConfig) -> Result<Self> {
        static UNCACHED: RewardEngine = RewardEngine::uncached();

        config.validate()?;
        let engine = if config.memoize {
            RewardEngine::global()
        } else {
            &UNCACHED
        };
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn engine(&self) -> &RewardEngine {
        self.engine
    }

    /// Calibrate over the batch and assign a reward to every judged sample.
    ///
    /// A sample whose arguments are outside the reward domain, or whose reward
    /// is not finite, is marked failed and left out of the statistics.
    pub fn score_batch(&self, samples: &[JudgedClue]) -> Result<BatchRewards> {
        let estimate = calibrate_from_pairs(samples.iter().map(|s| (s.oversight(), s.game())));
        let used_fallback = estimate.is_none();
        let raw_calibrated_p = estimate.unwrap_or(CALIBRATION_FALLBACK);
        let (calibrated_p, clamped) =
            clamp_probability(raw_calibrated_p, self.config.probability_margin);

        debug!(
            n_samples = samples.len(),
            raw_calibrated_p,
            calibrated_p,
            used_fallback,
            clamped,
            "Calibrated batch"
        );

        let kl_coeff = self.config.kl_coeff;
        let score_one = |(index, sample): (usize, &JudgedClue)| -> SampleReward {
            let Some(oversight) = sample.oversight() else {
                return SampleReward::unjudged(index);
            };
            let n_surviving = oversight.n_surviving();
            match self.reward_judged(index, sample, n_surviving, kl_coeff, calibrated_p) {
                Ok(scored) => scored,
                Err(e) => {
                    error!(sample = index, error = %e, "Abandoning reward for sample");
                    SampleReward::failed(index, &e)
                }
            }
        };

        let scored: Vec<SampleReward> = if self.config.parallel {
            samples.par_iter().enumerate().map(&score_one).collect()
        } else {
            samples.iter().enumerate().map(&score_one).collect()
        };

        let stats = BatchStats::from_samples(&scored);
        Ok(BatchRewards {
            calibrated_p,
            raw_calibrated_p,
            used_fallback,
            clamped,
            samples: scored,
            stats,
        })
    }

    fn reward_judged(
        &self,
        index: usize,
        sample: &JudgedClue,
        n_surviving: usize,
        kl_coeff: f64,
        calibrated_p: f64,
    ) -> Result<SampleReward> {
        let params = RewardParams {
            bad_words_in_game: sample.game().bad_words_in_game(),
            n_targets: sample.clue().num_words,
            kl_coeff,
            calibrated_p,
        };
        params.validate()?;

        let accepted = n_surviving >= params.n_targets;
        let reward = params.reward(self.engine, accepted);
        if !reward.is_finite() {
            return Err(CodenamesError::NonFiniteReward {
                sample: index,
                reward,
            });
        }

        Ok(SampleReward {
            index,
            accepted: Some(accepted),
            reward: Some(reward),
            error: None,
        })
    }
}
