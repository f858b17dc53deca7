//! Error type definitions.
//!
//! Hard failures are `thiserror` enums. Per-namespace discovery failures and
//! per-URL probe failures are recovered where they happen and never show up here.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The custom CA bundle could not be read or parsed.
    #[error("CA bundle error for {path}: {message}")]
    CaBundleError {
        /// Bundle location
        path: String,
        /// What went wrong
        message: String,
    },

    /// The TLS client configuration could not be built.
    #[error("TLS configuration error: {0}")]
    TlsConfigError(#[from] rustls::Error),

    /// Error building the Kubernetes client.
    #[error("Kubernetes client initialization error: {0}")]
    KubeClientError(String),
}

/// Errors that abort a discovery attempt.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Namespace enumeration failed; nothing can be discovered.
    #[error("Cluster API error: {0}")]
    ClusterApi(String),

    /// The discovered URL file could not be written or read.
    #[error("URL file error: {0}")]
    Storage(String),
}

/// Errors raised while reading or writing the exclusion file.
///
/// The matcher itself never surfaces these: a broken file means "no exclusions".
#[derive(Error, Debug)]
pub enum ExclusionError {
    /// File could not be read or written.
    #[error("Exclusion file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid YAML.
    #[error("Exclusion file syntax error: {0}")]
    Syntax(String),

    /// File is YAML but its list holds something other than strings, or it is
    /// a mapping without a usable `excluded_urls` key.
    #[error("Exclusion file format error: {0}")]
    Format(String),

    /// File is a single scalar instead of a list.
    #[error("Exclusion file is not a list")]
    NotAList,

    /// Nothing left to exclude after normalisation.
    #[error("Empty URL cannot be excluded")]
    EmptyUrl,
}

impl From<serde_yaml::Error> for ExclusionError {
    fn from(e: serde_yaml::Error) -> Self {
        ExclusionError::Syntax(e.to_string())
    }
}
