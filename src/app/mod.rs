//! Application orchestration.
//!
//! This module ties discovery and probing together, runs the periodic sweep
//! loop and handles graceful shutdown.

pub mod checker;
pub mod scheduler;
pub mod shutdown;

// Re-export public API
pub use checker::PortalChecker;
pub use scheduler::{sleep_cancellable, spawn_scheduler};
pub use shutdown::{shutdown_gracefully, shutdown_signal};
