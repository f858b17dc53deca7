//! Configuration types and CLI options.
//!
//! Every option can be given as a command-line flag or through its
//! environment variable, which is how the checker is configured in-cluster.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Deployment environment.
///
/// `Development` disables certificate verification for probes when no custom
/// CA bundle is configured.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AppEnv {
    /// Strict TLS verification
    Production,
    /// Relaxed TLS verification for local clusters with self-signed certificates
    Development,
}

/// How the Kubernetes client finds its credentials.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KubeEnv {
    /// Service account mounted into the pod
    Production,
    /// Local kubeconfig (`~/.kube/config` or `KUBECONFIG`)
    Local,
}

/// Portal checker configuration.
///
/// # Examples
///
/// ```no_run
/// use portal_checker::Config;
///
/// let config = Config {
///     max_concurrent_requests: 20,
///     check_interval_secs: 60,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portal_checker",
    version,
    about = "Discovers cluster endpoints and checks that they answer"
)]
pub struct Config {
    /// Address the dashboard binds to
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Port the dashboard listens on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Per-request probe timeout in seconds
    #[arg(long = "request-timeout", env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Maximum number of probes in flight at once
    #[arg(long, env = "MAX_CONCURRENT_REQUESTS", default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS)]
    pub max_concurrent_requests: usize,

    /// Lifetime of the loaded exclusion patterns in seconds
    #[arg(long = "cache-ttl", env = "CACHE_TTL_SECONDS", default_value_t = DEFAULT_EXCLUSION_CACHE_TTL_SECS)]
    pub exclusion_cache_ttl_secs: u64,

    /// Lifetime of a discovery snapshot in seconds
    #[arg(long = "kubernetes-poll-interval", env = "KUBERNETES_POLL_INTERVAL", default_value_t = DEFAULT_DISCOVERY_CACHE_TTL_SECS)]
    pub discovery_cache_ttl_secs: u64,

    /// Interval between probe sweeps in seconds
    #[arg(long = "check-interval", env = "CHECK_INTERVAL", default_value_t = DEFAULT_CHECK_INTERVAL_SECS)]
    pub check_interval_secs: u64,

    /// File the discovered URLs are persisted to
    #[arg(long, env = "URLS_FILE", default_value = DEFAULT_URLS_FILE)]
    pub urls_file: PathBuf,

    /// File holding the exclusion patterns
    #[arg(long, env = "EXCLUDED_URLS_FILE", default_value = DEFAULT_EXCLUDED_URLS_FILE)]
    pub excluded_urls_file: PathBuf,

    /// PEM bundle of extra CA certificates trusted by probes
    #[arg(long, env = "CUSTOM_CERT")]
    pub custom_cert: Option<PathBuf>,

    /// Where Kubernetes credentials come from
    #[arg(long, env = "KUBE_ENV", value_enum, default_value = "production")]
    pub kube_env: KubeEnv,

    /// Deployment environment
    #[arg(long, env = "APP_ENV", value_enum, default_value = "production")]
    pub app_env: AppEnv,

    /// Discover and probe once before serving
    #[arg(long, env = "AUTO_REFRESH_ON_START", default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_refresh_on_start: bool,

    /// Fetch certificate expiry metadata for HTTPS endpoints
    #[arg(long, env = "ENABLE_SSL_INFO", default_value_t = true, action = clap::ArgAction::Set)]
    pub enable_ssl_info: bool,

    /// Send Slack alerts for failing endpoints
    #[arg(long, env = "ENABLE_SLACK_NOTIFICATIONS", default_value_t = false, action = clap::ArgAction::Set)]
    pub enable_slack_notifications: bool,

    /// Slack incoming webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub slack_webhook_url: Option<String>,
}

impl Config {
    /// Per-request probe timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Lifetime of the exclusion pattern cache.
    pub fn exclusion_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.exclusion_cache_ttl_secs)
    }

    /// Lifetime of a discovery snapshot.
    pub fn discovery_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.discovery_cache_ttl_secs)
    }

    /// Interval between probe sweeps.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Whether probes skip certificate verification.
    ///
    /// Only true in development mode without a custom CA bundle.
    pub fn insecure_tls(&self) -> bool {
        self.app_env == AppEnv::Development && self.custom_cert.is_none()
    }

    /// Slack webhook, when alerts are enabled and a webhook is configured.
    pub fn slack_webhook(&self) -> Option<&str> {
        if !self.enable_slack_notifications {
            return None;
        }
        self.slack_webhook_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            exclusion_cache_ttl_secs: DEFAULT_EXCLUSION_CACHE_TTL_SECS,
            discovery_cache_ttl_secs: DEFAULT_DISCOVERY_CACHE_TTL_SECS,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            urls_file: PathBuf::from(DEFAULT_URLS_FILE),
            excluded_urls_file: PathBuf::from(DEFAULT_EXCLUDED_URLS_FILE),
            custom_cert: None,
            kube_env: KubeEnv::Production,
            app_env: AppEnv::Production,
            auto_refresh_on_start: true,
            enable_ssl_info: true,
            enable_slack_notifications: false,
            slack_webhook_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_parse_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["portal_checker"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.request_timeout_secs, default.request_timeout_secs);
        assert_eq!(
            parsed.max_concurrent_requests,
            default.max_concurrent_requests
        );
        assert_eq!(parsed.check_interval_secs, default.check_interval_secs);
        assert_eq!(
            parsed.discovery_cache_ttl_secs,
            default.discovery_cache_ttl_secs
        );
        assert_eq!(parsed.urls_file, default.urls_file);
        assert!(parsed.auto_refresh_on_start);
    }

    #[test]
    fn test_parse_flags() {
        let parsed = Config::try_parse_from([
            "portal_checker",
            "--max-concurrent-requests",
            "25",
            "--request-timeout",
            "3",
            "--auto-refresh-on-start",
            "false",
            "--kube-env",
            "local",
        ])
        .unwrap();
        assert_eq!(parsed.max_concurrent_requests, 25);
        assert_eq!(parsed.request_timeout(), Duration::from_secs(3));
        assert!(!parsed.auto_refresh_on_start);
        assert_eq!(parsed.kube_env, KubeEnv::Local);
    }

    #[test]
    fn test_insecure_tls_only_in_development_without_bundle() {
        let mut config = Config::default();
        assert!(!config.insecure_tls());

        config.app_env = AppEnv::Development;
        assert!(config.insecure_tls());

        config.custom_cert = Some(PathBuf::from("/etc/ssl/custom.pem"));
        assert!(!config.insecure_tls());
    }

    #[test]
    fn test_slack_webhook_requires_flag_and_url() {
        let mut config = Config {
            slack_webhook_url: Some("https://hooks.slack.com/services/x".to_string()),
            ..Default::default()
        };
        assert!(config.slack_webhook().is_none());

        config.enable_slack_notifications = true;
        assert_eq!(
            config.slack_webhook(),
            Some("https://hooks.slack.com/services/x")
        );

        config.slack_webhook_url = Some("  ".to_string());
        assert!(config.slack_webhook().is_none());
    }
}
