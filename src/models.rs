//! Data records shared between discovery, probing and the web layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of cluster resource a URL was discovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// `networking.k8s.io/v1` Ingress
    #[serde(rename = "ingress", alias = "Ingress")]
    Ingress,
    /// `gateway.networking.k8s.io` HTTPRoute
    #[serde(rename = "httproute", alias = "HTTPRoute")]
    HttpRoute,
}

impl ResourceKind {
    /// Short lowercase label used on the dashboard and in the URL file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Ingress => "ingress",
            ResourceKind::HttpRoute => "httproute",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend a route or ingress path forwards to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    /// Service name
    #[serde(default)]
    pub service: Option<String>,
    /// Service port number
    #[serde(default)]
    pub port: Option<i32>,
}

/// One discovered or configured endpoint.
///
/// Identity is `(url, namespace, name)`: the same URL owned by two different
/// resources yields two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Host plus path, without scheme (the scheme is chosen at probe time)
    pub url: String,
    /// Namespace of the owning resource
    #[serde(default)]
    pub namespace: String,
    /// Name of the owning resource
    #[serde(default)]
    pub name: String,
    /// Kind of the owning resource
    #[serde(rename = "type")]
    pub resource_kind: ResourceKind,
    /// Essential annotations, bounded in size
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Labels of the owning resource
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Ingress class, or `gateway/<name>` for HTTPRoutes
    #[serde(default, rename = "ingress_class")]
    pub gateway_or_ingress_class: Option<String>,
    /// Declared path
    #[serde(default = "default_path")]
    pub path: String,
    /// Backend the path forwards to
    #[serde(default)]
    pub backend: Backend,
}

fn default_path() -> String {
    "/".to_string()
}

impl UrlRecord {
    /// Deduplication key.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.url, &self.namespace, &self.name)
    }
}

/// TLS metadata attached to a check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SslInfo {
    /// Certificate details of an HTTPS endpoint
    Certificate(CertificateInfo),
    /// Marker for plain-HTTP endpoints
    HttpOnly {
        /// Always `true`
        http_only: bool,
    },
}

impl SslInfo {
    /// Marker for a plain-HTTP endpoint.
    pub fn http_only() -> Self {
        SslInfo::HttpOnly { http_only: true }
    }
}

/// Leaf certificate expiry information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// `notAfter` of the leaf certificate
    pub expiry_date: DateTime<Utc>,
    /// Whole days between now and `expiry_date` (negative once expired)
    pub days_remaining: i64,
    /// Issuer distinguished name
    pub issuer: String,
    /// Subject distinguished name
    pub subject: String,
}

/// Outcome of probing one `UrlRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The probed record
    #[serde(flatten)]
    pub record: UrlRecord,
    /// HTTP status, or 504/503/495/500 for timeout/connection/TLS/unexpected failures
    pub status: u16,
    /// Short human-readable explanation
    pub details: String,
    /// Rounded request latency in milliseconds
    #[serde(rename = "response_time")]
    pub response_time_ms: u64,
    /// Certificate metadata, when fetched
    pub ssl_info: Option<SslInfo>,
}
