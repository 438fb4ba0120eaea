//! Structured logging for reward scoring with tracing.
//!
//! Provides JSON or console output and per-batch reward metrics, with
//! automatic warnings when calibration is degenerate.

use tracing::{debug, error, info, span, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::scorer::BatchRewards;

/// Judged fraction below which a batch is reported as poorly calibrated.
pub const LOW_JUDGED_FRACTION: f64 = 0.5;

/// Initialize structured logging.
///
/// Reads log level from RUST_LOG environment variable (defaults to "info").
/// Outputs JSON-formatted logs for production monitoring.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,codenames_rl=info,codenames_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Structured logging initialized");
}

/// Initialize console logging, falling back to `default_level` when
/// RUST_LOG is unset.
pub fn init_console_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Log a scored batch with structured metrics.
///
/// Emits warnings for:
/// - Calibration fallback (no judged samples)
/// - Clamped calibrated probability
/// - Samples whose reward computation failed
/// - Few judged samples relative to batch size
pub fn log_batch_rewards(step: usize, batch: &BatchRewards) {
    let span = span!(Level::INFO, "reward_batch", step = step);
    let _enter = span.enter();
    let stats = &batch.stats;

    if !stats.mean_reward.is_finite() {
        error!(
            mean_reward = stats.mean_reward,
            step = step,
            "Batch reward is not finite"
        );
        return;
    }

    info!(
        n_samples = stats.n_samples,
        n_judged = stats.n_judged,
        n_failed = stats.n_failed,
        n_accepted = stats.n_accepted,
        acceptance_rate = stats.acceptance_rate,
        mean_reward = stats.mean_reward,
        reward_std = stats.reward_std,
        calibrated_p = batch.calibrated_p,
        "Batch scored"
    );

    if batch.used_fallback {
        warn!(
            step = step,
            calibrated_p = batch.calibrated_p,
            "Calibration fell back to a fixed probability; rewards for this batch are not anchored to judged data"
        );
    } else if batch.clamped {
        warn!(
            step = step,
            raw_calibrated_p = batch.raw_calibrated_p,
            calibrated_p = batch.calibrated_p,
            "Calibrated probability clamped away from the boundary"
        );
    }

    if stats.n_failed > 0 {
        warn!(
            n_failed = stats.n_failed,
            step = step,
            "Some judged samples received no reward"
        );
    }

    if stats.n_samples > 0 {
        let judged_fraction = stats.n_judged as f64 / stats.n_samples as f64;
        if judged_fraction < LOW_JUDGED_FRACTION {
            warn!(
                judged_fraction = judged_fraction,
                threshold = LOW_JUDGED_FRACTION,
                step = step,
                "Few samples were judged - check the oversight pipeline"
            );
        }
    }

    debug!(
        step = step,
        rewards = ?batch.rewards(),
        "Per-sample rewards"
    );
}
