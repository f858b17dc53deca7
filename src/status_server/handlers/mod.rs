//! Web layer HTTP handlers.

mod api;
mod cache;
mod dashboard;
mod memory;

pub use api::{api_urls_handler, exclude_handler, health_handler, refresh_handler, version_handler};
pub use cache::{cache_clear_handler, cache_force_refresh_handler, cache_info_handler};
pub use dashboard::{dashboard_handler, render_dashboard};
pub use memory::{current_memory_usage, memory_handler};
