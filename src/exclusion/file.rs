//! Exclusion file reading and writing.
//!
//! Two layouts are accepted on read:
//!
//! ```yaml
//! - monitoring.*
//! - exact.com/path
//! ```
//!
//! ```yaml
//! excluded_urls:
//!   - monitoring.*
//! ```
//!
//! Writes always use the flat list layout.

use std::path::Path;

use serde_yaml::Value;

use crate::error_handling::ExclusionError;
use crate::storage::write_atomically;

use super::pattern::normalize_url;

/// Reads the raw pattern strings from `path`.
///
/// Returns `Ok(None)` when the file does not exist and `Ok(Some(vec![]))` for
/// an empty document.
pub fn read_exclusion_file(path: &Path) -> Result<Option<Vec<String>>, ExclusionError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    parse_exclusion_document(&content).map(Some)
}

/// Parses an exclusion document in either accepted layout.
pub fn parse_exclusion_document(content: &str) -> Result<Vec<String>, ExclusionError> {
    let document: Value = serde_yaml::from_str(content)?;
    match document {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => strings_from_sequence(items),
        Value::Mapping(map) => match map.get("excluded_urls") {
            Some(Value::Sequence(items)) => strings_from_sequence(items.clone()),
            Some(Value::Null) => Ok(Vec::new()),
            Some(_) => Err(ExclusionError::Format(
                "`excluded_urls` must be a list of strings".to_string(),
            )),
            None => Err(ExclusionError::Format(
                "mapping without an `excluded_urls` key".to_string(),
            )),
        },
        Value::Tagged(_) => Err(ExclusionError::Format(
            "expected a list of strings".to_string(),
        )),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Err(ExclusionError::NotAList),
    }
}

fn strings_from_sequence(items: Vec<Value>) -> Result<Vec<String>, ExclusionError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(ExclusionError::Format(format!(
                "non-string entry in exclusion list: {other:?}"
            ))),
        })
        .collect()
}

/// Reduces a user-supplied URL to the `host/path` form stored in the file.
///
/// Scheme, query string and fragment are dropped, as is one trailing `/`.
pub fn normalize_exclusion_entry(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        if let Ok(parsed) = url::Url::parse(trimmed) {
            if let Some(host) = parsed.host_str() {
                let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
                let joined = format!("{host}{port}{}", parsed.path());
                return normalize_url(&joined).to_string();
            }
        }
    }
    normalize_url(trimmed).to_string()
}

/// Appends `url` to the exclusion file unless an identical entry exists.
///
/// Returns the normalised entry and whether it was newly added. The file is
/// created when missing, and a file holding a single scalar is replaced by a
/// fresh list. Any other parse failure is returned and the file is left
/// untouched.
pub fn add_exclusion(path: &Path, url: &str) -> Result<(String, bool), ExclusionError> {
    let entry = normalize_exclusion_entry(url);
    if entry.is_empty() {
        return Err(ExclusionError::EmptyUrl);
    }

    let mut entries = match read_exclusion_file(path) {
        Ok(Some(entries)) => entries,
        Ok(None) => Vec::new(),
        Err(ExclusionError::NotAList) => {
            log::warn!(
                "Exclusion file {} is not a list, rewriting it as one",
                path.display()
            );
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    if entries.iter().any(|existing| existing.trim() == entry) {
        return Ok((entry, false));
    }
    entries.push(entry.clone());

    let serialized = serde_yaml::to_string(&entries)?;
    write_atomically(path, serialized.as_bytes())?;

    Ok((entry, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_flat_list() {
        let parsed = parse_exclusion_document("- a.com\n- b.*\n").unwrap();
        assert_eq!(parsed, vec!["a.com", "b.*"]);
    }

    #[test]
    fn test_parse_mapping_layout() {
        let parsed = parse_exclusion_document("excluded_urls:\n  - a.com\n").unwrap();
        assert_eq!(parsed, vec!["a.com"]);
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_exclusion_document("").unwrap().is_empty());
        assert!(parse_exclusion_document("excluded_urls:\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_exclusion_document("just a string"),
            Err(ExclusionError::NotAList)
        ));
        assert!(matches!(
            parse_exclusion_document("- a.com\n- \"unterminated\n"),
            Err(ExclusionError::Syntax(_))
        ));
        assert!(matches!(
            parse_exclusion_document("- a.com\n- { nested: true }\n"),
            Err(ExclusionError::Format(_))
        ));
        assert!(matches!(
            parse_exclusion_document("other_key: [a]\n"),
            Err(ExclusionError::Format(_))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_exclusion_file(&dir.path().join("nope.yaml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_normalize_exclusion_entry() {
        assert_eq!(
            normalize_exclusion_entry("https://app.example.com/path/?q=1#frag"),
            "app.example.com/path"
        );
        assert_eq!(
            normalize_exclusion_entry("http://app.example.com:8080/"),
            "app.example.com:8080"
        );
        assert_eq!(normalize_exclusion_entry("app.example.com/"), "app.example.com");
    }

    #[test]
    fn test_add_exclusion_creates_and_dedups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("excluded-urls.yaml");

        let (entry, added) = add_exclusion(&path, "https://app.example.com/").unwrap();
        assert_eq!(entry, "app.example.com");
        assert!(added);

        let (_, added_again) = add_exclusion(&path, "app.example.com").unwrap();
        assert!(!added_again);

        let stored = read_exclusion_file(&path).unwrap().unwrap();
        assert_eq!(stored, vec!["app.example.com"]);
    }

    #[test]
    fn test_add_exclusion_preserves_mapping_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("excluded.yaml");
        std::fs::write(&path, "excluded_urls:\n  - monitoring.*\n").unwrap();

        add_exclusion(&path, "other.com").unwrap();

        let stored = read_exclusion_file(&path).unwrap().unwrap();
        assert_eq!(stored, vec!["monitoring.*", "other.com"]);
    }

    #[test]
    fn test_add_exclusion_rejects_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("excluded.yaml");
        assert!(matches!(
            add_exclusion(&path, "https://"),
            Err(ExclusionError::EmptyUrl)
        ));
    }

    #[test]
    fn test_add_exclusion_keeps_file_with_syntax_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("excluded.yaml");
        let original = "- monitoring.*\n- exact.com/path\n- \"unterminated\n";
        std::fs::write(&path, original).unwrap();

        let result = add_exclusion(&path, "new.com");
        assert!(matches!(result, Err(ExclusionError::Syntax(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_add_exclusion_keeps_file_with_bad_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("excluded.yaml");
        let original = "- monitoring.*\n- { nested: true }\n";
        std::fs::write(&path, original).unwrap();

        assert!(matches!(
            add_exclusion(&path, "new.com"),
            Err(ExclusionError::Format(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_add_exclusion_replaces_scalar_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("excluded.yaml");
        std::fs::write(&path, "nothing here\n").unwrap();

        let (_, added) = add_exclusion(&path, "new.com").unwrap();
        assert!(added);
        assert_eq!(read_exclusion_file(&path).unwrap().unwrap(), vec!["new.com"]);
        assert!(!dir.path().join("excluded.yaml.tmp").exists());
    }
}
