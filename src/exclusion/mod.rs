//! URL exclusion.
//!
//! Patterns come from a YAML file and are matched against URLs with scheme and
//! one trailing slash removed:
//! - no wildcard: exact match
//! - single trailing `*`: prefix match
//! - any other wildcard: glob, where `*` also spans `/`
//!
//! A resource annotated `portal-checker.io/exclude: "true"` is always excluded.

mod file;
mod matcher;
mod pattern;

// Re-export public API
pub use file::{add_exclusion, normalize_exclusion_entry, parse_exclusion_document, read_exclusion_file};
pub use matcher::{has_exclude_annotation, matches_any, ExclusionMatcher};
pub use pattern::{compile_patterns, normalize_url, ExclusionPattern, StarGlob};
