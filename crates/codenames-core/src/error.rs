//! Centralized error types for codenames reward calibration.
//!
//! Uses thiserror for ergonomic error handling with context.

use thiserror::Error;

/// Main error type for codenames operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CodenamesError {
    /// Invalid configuration detected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Game record that cannot be scored.
    #[error("Invalid game: {0}")]
    InvalidGame(String),

    /// Clue text that does not match the `<word>, <count>` form.
    #[error("Failed to parse clue {input:?}: {reason}")]
    ClueParse { input: String, reason: String },

    /// Reward arguments outside the domain the engine is defined on.
    #[error("Reward parameters out of domain: {reason}")]
    RewardDomain { reason: String },

    /// Reward evaluated to NaN or an infinity.
    #[error("Non-finite reward for sample {sample}: reward={reward}")]
    NonFiniteReward { sample: usize, reward: f64 },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, CodenamesError>;

impl CodenamesError {
    /// Check if error is recoverable (the batch can be retried as-is).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CodenamesError::Io(_))
    }

    /// Check if error means upstream counting or calibration produced
    /// arguments the reward engine cannot evaluate.
    pub fn is_domain_violation(&self) -> bool {
        matches!(
            self,
            CodenamesError::RewardDomain { .. } | CodenamesError::NonFiniteReward { .. }
        )
    }
}
