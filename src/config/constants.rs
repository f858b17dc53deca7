//! Configuration constants.
//!
//! This module defines the defaults and fixed limits used throughout the
//! application: probe timeouts, cache lifetimes, annotation keys and file locations.

use std::time::Duration;

/// Default HTTP port for the dashboard and JSON API
pub const DEFAULT_PORT: u16 = 5000;

/// Default per-request probe timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Default number of probes allowed in flight at once (semaphore limit)
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;
/// Default lifetime of the loaded exclusion pattern list (5 minutes)
pub const DEFAULT_EXCLUSION_CACHE_TTL_SECS: u64 = 300;
/// Default lifetime of a discovery snapshot (10 minutes)
pub const DEFAULT_DISCOVERY_CACHE_TTL_SECS: u64 = 600;
/// Default interval between two probe sweeps
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;

/// Default location of the persisted discovered-URL file
pub const DEFAULT_URLS_FILE: &str = "/app/data/urls.yaml";
/// Default location of the exclusion pattern file
pub const DEFAULT_EXCLUDED_URLS_FILE: &str = "/app/config/excluded-urls.yaml";

// Network operation timeouts for the certificate metadata fetch
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

/// Granularity of the scheduler's cancellable sleep.
pub const SCHEDULER_TICK: Duration = Duration::from_secs(1);

/// User-Agent sent with every probe
pub const DEFAULT_USER_AGENT: &str = concat!("portal-checker/", env!("CARGO_PKG_VERSION"));

// Probe details
/// Maximum length of an error message carried in `CheckResult.details`
pub const MAX_DETAIL_ERROR_LENGTH: usize = 50;

// Annotations
/// Annotation that removes a resource from probing when set to `"true"`
pub const EXCLUDE_ANNOTATION: &str = "portal-checker.io/exclude";
/// Legacy ingress class annotation
pub const LEGACY_INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
/// Vendor ingress class annotations, consulted in order after the legacy one
pub const VENDOR_INGRESS_CLASS_ANNOTATIONS: &[&str] = &[
    "nginx.ingress.kubernetes.io/ingress.class",
    "traefik.ingress.kubernetes.io/ingress.class",
];

/// Annotations always kept on a discovered record, ahead of any other key.
pub const ESSENTIAL_ANNOTATIONS: &[&str] = &[
    "cert-manager.io/cluster-issuer",
    "cert-manager.io/issuer",
    "kubernetes.io/ingress.class",
    "nginx.ingress.kubernetes.io/backend-protocol",
    "nginx.ingress.kubernetes.io/ssl-redirect",
    "nginx.ingress.kubernetes.io/force-ssl-redirect",
    "nginx.ingress.kubernetes.io/auth-url",
    "nginx.ingress.kubernetes.io/whitelist-source-range",
    "nginx.ingress.kubernetes.io/limit-rps",
    "nginx.ingress.kubernetes.io/limit-connections",
    "portal-checker.io/exclude",
    "traefik.ingress.kubernetes.io/router.tls",
    "traefik.ingress.kubernetes.io/router.entrypoints",
    "traefik.ingress.kubernetes.io/router.middlewares",
];
/// Maximum number of annotations kept per record
pub const MAX_ANNOTATIONS: usize = 10;
/// Non-essential annotations are only kept when their value is shorter than this
pub const MAX_ANNOTATION_VALUE_LENGTH: usize = 50;

// Gateway API
/// API group of the HTTPRoute resource
pub const GATEWAY_API_GROUP: &str = "gateway.networking.k8s.io";
/// Served version of the HTTPRoute resource
pub const GATEWAY_API_VERSION: &str = "v1";
/// Kind of the HTTPRoute resource
pub const HTTP_ROUTE_KIND: &str = "HTTPRoute";
/// Plural of the HTTPRoute resource
pub const HTTP_ROUTE_PLURAL: &str = "httproutes";
/// Namespaces whose HTTPRoutes are listed concurrently during discovery
pub const DISCOVERY_NAMESPACE_CONCURRENCY: usize = 8;
