//! Annotation trimming.
//!
//! Cluster annotations can be arbitrarily verbose (last-applied-configuration,
//! JSON policies...). Records only keep a bounded subset.

use std::collections::BTreeMap;

use crate::config::{
    ESSENTIAL_ANNOTATIONS, EXCLUDE_ANNOTATION, MAX_ANNOTATIONS, MAX_ANNOTATION_VALUE_LENGTH,
};

/// Keeps at most `MAX_ANNOTATIONS` entries.
///
/// The exclude annotation goes first, then the allow-listed keys in allow-list
/// order, then any other key (in key order) whose value is shorter than
/// `MAX_ANNOTATION_VALUE_LENGTH` characters.
pub fn filter_annotations(annotations: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut kept = BTreeMap::new();

    let priority = std::iter::once(EXCLUDE_ANNOTATION).chain(
        ESSENTIAL_ANNOTATIONS
            .iter()
            .copied()
            .filter(|key| *key != EXCLUDE_ANNOTATION),
    );
    for key in priority {
        if kept.len() >= MAX_ANNOTATIONS {
            return kept;
        }
        if let Some(value) = annotations.get(key) {
            kept.insert(key.to_string(), value.clone());
        }
    }

    for (key, value) in annotations {
        if kept.len() >= MAX_ANNOTATIONS {
            break;
        }
        if kept.contains_key(key) || value.chars().count() >= MAX_ANNOTATION_VALUE_LENGTH {
            continue;
        }
        kept.insert(key.clone(), value.clone());
    }

    kept
}
