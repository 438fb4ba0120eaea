//! Core types shared across codenames crates.
//!
//! Provides:
//! - Centralized error types via thiserror
//! - Configuration management with TOML support
//! - Game, clue and oversight records

pub mod config;
pub mod error;
pub mod game;

// Re-export commonly used types
pub use config::{AppConfig, RewardConfig};
pub use error::{CodenamesError, Result};
pub use game::{Clue, Game, JudgedClue, Oversight, CLUE_MARKER};
