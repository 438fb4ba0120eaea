//! Calibrated accept/reject rewards for KL-regularized clue giving.
//!
//! A clue claiming `n` targets is judged one target at a time. With
//! `delta = log_odds(p) - log_odds(base_probability(bad))`, the rewards are
//! chosen so that the expected reward of each guess reproduces the KL
//! contribution of that guess:
//!
//! ```text
//! p * accept(n) + (1 - p) * reject(n) = kl * delta + accept(n - 1)
//! accept(0) = 0
//! reject(n) = (kl * delta - p) / (1 - p) + (n - 1) * kl * delta
//! ```
//!
//! Solving for `accept(n)` gives the recursion below. Nothing here validates
//! its arguments; use [`RewardParams::validate`] at the boundary.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use codenames_core::{CodenamesError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::primitives::{base_probability, log_odds};

// ============================================================================
// Formulas
// ============================================================================

#[inline]
fn log_odds_delta(bad_words_in_game: usize, calibrated_p: f64) -> f64 {
    log_odds(calibrated_p) - log_odds(base_probability(bad_words_in_game))
}

#[inline]
fn initial_reject_formula(bad_words_in_game: usize, kl_coeff: f64, calibrated_p: f64) -> f64 {
    let delta = log_odds_delta(bad_words_in_game, calibrated_p);
    (kl_coeff * delta - calibrated_p) / (1.0 - calibrated_p)
}

#[inline]
fn reject_formula(
    initial: f64,
    bad_words_in_game: usize,
    n_targets: usize,
    kl_coeff: f64,
    calibrated_p: f64,
) -> f64 {
    initial
        + (n_targets as f64 - 1.0) * kl_coeff * log_odds_delta(bad_words_in_game, calibrated_p)
}

#[inline]
fn accept_formula(
    previous_accept: f64,
    reject: f64,
    bad_words_in_game: usize,
    kl_coeff: f64,
    calibrated_p: f64,
) -> f64 {
    (previous_accept + kl_coeff * log_odds_delta(bad_words_in_game, calibrated_p)
        - (1.0 - calibrated_p) * reject)
        / calibrated_p
}

// ============================================================================
// Uncached reference functions
// ============================================================================

/// Reward for rejecting the sole remaining target.
pub fn initial_reward_reject(bad_words_in_game: usize, kl_coeff: f64, calibrated_p: f64) -> f64 {
    initial_reject_formula(bad_words_in_game, kl_coeff, calibrated_p)
}

/// Reward for a rejected guess when the clue claims `n_targets` targets.
pub fn reward_reject(
    bad_words_in_game: usize,
    n_targets: usize,
    kl_coeff: f64,
    calibrated_p: f64,
) -> f64 {
    let initial = initial_reward_reject(bad_words_in_game, kl_coeff, calibrated_p);
    reject_formula(initial, bad_words_in_game, n_targets, kl_coeff, calibrated_p)
}

/// Reward for a confirmed target with `n_targets` targets claimed.
///
/// Recursion depth equals `n_targets`; `reward_accept(_, 0, _, _)` is 0.
pub fn reward_accept(
    bad_words_in_game: usize,
    n_targets: usize,
    kl_coeff: f64,
    calibrated_p: f64,
) -> f64 {
    if n_targets == 0 {
        return 0.0;
    }
    let previous = reward_accept(bad_words_in_game, n_targets - 1, kl_coeff, calibrated_p);
    let reject = reward_reject(bad_words_in_game, n_targets, kl_coeff, calibrated_p);
    accept_formula(previous, reject, bad_words_in_game, kl_coeff, calibrated_p)
}

// ============================================================================
// Memoized engine
// ============================================================================

/// Exact argument tuple; floats are keyed by bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RewardKey {
    bad_words_in_game: usize,
    n_targets: usize,
    kl_bits: u64,
    p_bits: u64,
}

impl RewardKey {
    fn new(bad_words_in_game: usize, n_targets: usize, kl_coeff: f64, calibrated_p: f64) -> Self {
        Self {
            bad_words_in_game,
            n_targets,
            kl_bits: kl_coeff.to_bits(),
            p_bits: calibrated_p.to_bits(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoTables {
    initial: HashMap<RewardKey, f64>,
    reject: HashMap<RewardKey, f64>,
    accept: HashMap<RewardKey, f64>,
}

impl MemoTables {
    fn len(&self) -> usize {
        self.initial.len() + self.reject.len() + self.accept.len()
    }
}

#[derive(Clone, Copy)]
enum Table {
    Initial,
    Reject,
    Accept,
}

/// Reward engine with an optional memo table shared across threads.
///
/// Cached values are bit-identical to the uncached functions in this module.
/// The lock is only held for lookups and inserts, never while recursing, so
/// concurrent callers may race to fill the same entry with the same value.
#[derive(Debug)]
pub struct RewardEngine {
    memo: Option<Mutex<MemoTables>>,
}

impl Default for RewardEngine {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_ENGINE: Lazy<RewardEngine> = Lazy::new(RewardEngine::new);

impl RewardEngine {
    /// Engine with memoization enabled.
    pub fn new() -> Self {
        Self {
            memo: Some(Mutex::new(MemoTables::default())),
        }
    }

    /// Engine that recomputes every value.
    pub const fn uncached() -> Self {
        Self { memo: None }
    }

    /// Process-wide memoized engine.
    pub fn global() -> &'static RewardEngine {
        &GLOBAL_ENGINE
    }

    /// Whether results are kept in the memo tables.
    pub fn is_memoized(&self) -> bool {
        self.memo.is_some()
    }

    /// Number of cached entries across all tables.
    pub fn cache_len(&self) -> usize {
        self.memo
            .as_ref()
            .map_or(0, |m| m.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    /// Drop every cached value.
    pub fn clear_cache(&self) {
        if let Some(memo) = &self.memo {
            let mut tables = memo.lock().unwrap_or_else(PoisonError::into_inner);
            tables.initial.clear();
            tables.reject.clear();
            tables.accept.clear();
        }
    }

    fn cached(&self, table: Table, key: RewardKey, compute: impl FnOnce() -> f64) -> f64 {
        let Some(memo) = &self.memo else {
            return compute();
        };

        {
            let tables = memo.lock().unwrap_or_else(PoisonError::into_inner);
            let hit = match table {
                Table::Initial => tables.initial.get(&key),
                Table::Reject => tables.reject.get(&key),
                Table::Accept => tables.accept.get(&key),
            };
            if let Some(&value) = hit {
                return value;
            }
        }

        trace!(
            bad_words_in_game = key.bad_words_in_game,
            n_targets = key.n_targets,
            "reward cache miss"
        );
        let value = compute();

        let mut tables = memo.lock().unwrap_or_else(PoisonError::into_inner);
        let target = match table {
            Table::Initial => &mut tables.initial,
            Table::Reject => &mut tables.reject,
            Table::Accept => &mut tables.accept,
        };
        target.insert(key, value);
        value
    }

    /// See [`initial_reward_reject`].
    pub fn initial_reward_reject(
        &self,
        bad_words_in_game: usize,
        kl_coeff: f64,
        calibrated_p: f64,
    ) -> f64 {
        let key = RewardKey::new(bad_words_in_game, 1, kl_coeff, calibrated_p);
        self.cached(Table::Initial, key, || {
            initial_reject_formula(bad_words_in_game, kl_coeff, calibrated_p)
        })
    }

    /// See [`reward_reject`].
    pub fn reward_reject(
        &self,
        bad_words_in_game: usize,
        n_targets: usize,
        kl_coeff: f64,
        calibrated_p: f64,
    ) -> f64 {
        let key = RewardKey::new(bad_words_in_game, n_targets, kl_coeff, calibrated_p);
        self.cached(Table::Reject, key, || {
            let initial = self.initial_reward_reject(bad_words_in_game, kl_coeff, calibrated_p);
            reject_formula(initial, bad_words_in_game, n_targets, kl_coeff, calibrated_p)
        })
    }

    /// See [`reward_accept`].
    pub fn reward_accept(
        &self,
        bad_words_in_game: usize,
        n_targets: usize,
        kl_coeff: f64,
        calibrated_p: f64,
    ) -> f64 {
        if n_targets == 0 {
            return 0.0;
        }
        let key = RewardKey::new(bad_words_in_game, n_targets, kl_coeff, calibrated_p);
        self.cached(Table::Accept, key, || {
            let previous =
                self.reward_accept(bad_words_in_game, n_targets - 1, kl_coeff, calibrated_p);
            let reject = self.reward_reject(bad_words_in_game, n_targets, kl_coeff, calibrated_p);
            accept_formula(previous, reject, bad_words_in_game, kl_coeff, calibrated_p)
        })
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Arguments of one reward query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardParams {
    /// Number of bad words on the board.
    pub bad_words_in_game: usize,
    /// Number of targets the clue claims.
    pub n_targets: usize,
    /// KL divergence penalty coefficient.
    pub kl_coeff: f64,
    /// Batch-level calibrated acceptance probability.
    pub calibrated_p: f64,
}

impl RewardParams {
    /// Check the domain the reward formulas are defined on.
    ///
    /// A game without bad words has base probability 1, whose log-odds are
    /// infinite, so at least one bad word is required.
    pub fn validate(&self) -> Result<()> {
        if !self.kl_coeff.is_finite() || self.kl_coeff <= 0.0 {
            return Err(CodenamesError::RewardDomain {
                reason: format!("kl_coeff must be finite and > 0, got {}", self.kl_coeff),
            });
        }
        if !(self.calibrated_p > 0.0 && self.calibrated_p < 1.0) {
            return Err(CodenamesError::RewardDomain {
                reason: format!(
                    "calibrated_p must be strictly inside (0, 1), got {}",
                    self.calibrated_p
                ),
            });
        }
        if self.bad_words_in_game == 0 {
            return Err(CodenamesError::RewardDomain {
                reason: "game has no bad words; base probability is 1".into(),
            });
        }
        Ok(())
    }

    /// Reward for this query: accept if `accepted`, otherwise reject.
    pub fn reward(&self, engine: &RewardEngine, accepted: bool) -> f64 {
        if accepted {
            engine.reward_accept(
                self.bad_words_in_game,
                self.n_targets,
                self.kl_coeff,
                self.calibrated_p,
            )
        } else {
            engine.reward_reject(
                self.bad_words_in_game,
                self.n_targets,
                self.kl_coeff,
                self.calibrated_p,
            )
        }
    }
}
