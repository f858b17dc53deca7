//! URL file reading and writing.
//!
//! Written as `urls: [...]`; a bare list of records is also accepted on read.

use std::path::Path;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::error_handling::DiscoveryError;
use crate::models::UrlRecord;

use super::atomic::write_atomically;

#[derive(Serialize)]
struct UrlsDocumentRef<'a> {
    urls: &'a [UrlRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UrlsDocument {
    Wrapped {
        #[serde(default)]
        urls: Option<Vec<UrlRecord>>,
    },
    Bare(Vec<UrlRecord>),
}

/// Parses a URL file body in either layout. An empty document has no URLs.
pub fn parse_urls_document(content: &str) -> Result<Vec<UrlRecord>, DiscoveryError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let document: UrlsDocument = serde_yaml::from_str(content)
        .map_err(|e| DiscoveryError::Storage(format!("invalid URL file: {e}")))?;
    Ok(match document {
        UrlsDocument::Wrapped { urls } => urls.unwrap_or_default(),
        UrlsDocument::Bare(urls) => urls,
    })
}

/// Writes `records` to `path`, creating parent directories.
///
/// The file is replaced atomically, so readers never see a truncated file.
pub fn save_urls_to_file(path: &Path, records: &[UrlRecord]) -> Result<(), DiscoveryError> {
    let body = serde_yaml::to_string(&UrlsDocumentRef { urls: records })
        .map_err(|e| DiscoveryError::Storage(format!("failed to serialize URLs: {e}")))?;
    write_atomically(path, body.as_bytes())
        .map_err(|e| DiscoveryError::Storage(format!("{}: {e}", path.display())))?;

    debug!("Saved {} URLs to {}", records.len(), path.display());
    Ok(())
}

/// Reads the URL file. A missing or unparsable file yields an empty list.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<UrlRecord>, DiscoveryError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("URL file not found: {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(DiscoveryError::Storage(format!("{}: {e}", path.display())));
        }
    };
    match parse_urls_document(&content) {
        Ok(records) => Ok(records),
        Err(e) => {
            error!("Ignoring URL file {}: {e}", path.display());
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Backend, ResourceKind};
    use tempfile::TempDir;

    fn record(url: &str) -> UrlRecord {
        UrlRecord {
            url: url.to_string(),
            namespace: "apps".to_string(),
            name: "app".to_string(),
            resource_kind: ResourceKind::HttpRoute,
            annotations: Default::default(),
            labels: Default::default(),
            gateway_or_ingress_class: Some("gateway/public".to_string()),
            path: "/".to_string(),
            backend: Backend {
                service: Some("app".to_string()),
                port: Some(80),
            },
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("urls.yaml");
        let records = vec![record("a.example.com"), record("b.example.com/api")];

        save_urls_to_file(&path, &records).unwrap();
        let loaded = load_urls_from_file(&path).unwrap();
        assert_eq!(loaded, records);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("urls:"));
        assert!(raw.contains("type: httproute"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_urls_from_file(&dir.path().join("none.yaml"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_bare_list_and_minimal_fields() {
        let parsed = parse_urls_document(
            "- url: legacy.example.com\n  namespace: old\n  name: legacy\n  type: ingress\n",
        )
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].resource_kind, ResourceKind::Ingress);
        assert_eq!(parsed[0].path, "/");
        assert!(parsed[0].annotations.is_empty());
    }

    #[test]
    fn test_empty_documents() {
        assert!(parse_urls_document("").unwrap().is_empty());
        assert!(parse_urls_document("urls:\n").unwrap().is_empty());
    }

    #[test]
    fn test_unparsable_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("urls.yaml");
        std::fs::write(&path, "urls: [unterminated\n").unwrap();
        assert!(load_urls_from_file(&path).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_storage_error() {
        assert!(matches!(
            parse_urls_document("urls: 42\n"),
            Err(DiscoveryError::Storage(_))
        ));
    }
}
