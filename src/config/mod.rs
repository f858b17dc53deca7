//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, cache lifetimes, annotation keys)
//! - CLI/environment option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{AppEnv, Config, KubeEnv, LogFormat, LogLevel};
