//! Persisted discovery results.
//!
//! The last successful discovery is written to a YAML file so a restarted
//! process can probe something before the cluster answers. Files are
//! replaced atomically.

mod atomic;
mod urls_file;

// Re-export public API
pub use atomic::write_atomically;
pub use urls_file::{load_urls_from_file, parse_urls_document, save_urls_to_file};
