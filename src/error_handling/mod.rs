//! Error handling.
//!
//! This module provides:
//! - Error type definitions for initialization, discovery and the exclusion file
//! - Sanitising of error text before it is shown on the dashboard

mod sanitize;
mod types;

// Re-export public API
pub use sanitize::{sanitize_error_message, truncate_detail};
pub use types::{DiscoveryError, ExclusionError, InitializationError};
