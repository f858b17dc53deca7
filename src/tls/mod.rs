//! TLS certificate inspection.
//!
//! This module opens a TLS connection to an HTTPS endpoint and reads the leaf
//! certificate's expiry, issuer and subject. Trust roots are the Mozilla set
//! from `webpki-roots` plus an optional PEM bundle for internal CAs.
//!
//! Uses `tokio-rustls` for the handshake and `x509-parser` for certificate parsing.

mod extract;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, warn};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName};
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};
use crate::error_handling::InitializationError;
use crate::models::{CertificateInfo, SslInfo};

pub(crate) use extract::certificate_info_from_der;

/// Reads a PEM CA bundle. A missing file is logged and yields `None`.
pub fn read_ca_bundle(path: &Path) -> Result<Option<Vec<u8>>, InitializationError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("CA bundle {} not found, using default trust roots", path.display());
            Ok(None)
        }
        Err(e) => Err(InitializationError::CaBundleError {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// Parses every certificate of a PEM bundle.
pub fn parse_ca_bundle(
    path: &Path,
    pem: &[u8],
) -> Result<Vec<CertificateDer<'static>>, InitializationError> {
    let bundle_err = |message: String| InitializationError::CaBundleError {
        path: path.display().to_string(),
        message,
    };
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| bundle_err(e.to_string()))?;
    if certs.is_empty() {
        return Err(bundle_err("no certificate found".to_string()));
    }
    Ok(certs)
}

/// Mozilla roots plus the certificates of `custom_ca`, if any.
pub fn build_root_store(custom_ca: Option<&Path>) -> Result<RootCertStore, InitializationError> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    if let Some(path) = custom_ca {
        if let Some(pem) = read_ca_bundle(path)? {
            let certs = parse_ca_bundle(path, &pem)?;
            let (added, ignored) = root_store.add_parsable_certificates(certs);
            debug!(
                "Loaded {added} custom CA certificates from {} ({ignored} ignored)",
                path.display()
            );
        }
    }
    Ok(root_store)
}

/// Fetches leaf certificate metadata over a verified TLS connection.
#[derive(Clone)]
pub struct SslInspector {
    connector: TlsConnector,
    connect_timeout: Duration,
    handshake_timeout: Duration,
}

impl SslInspector {
    /// Builds an inspector trusting `root_store`.
    pub fn new(root_store: RootCertStore) -> Result<Self, InitializationError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout: Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            handshake_timeout: Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        })
    }

    /// Connects to `host:port` and reads the leaf certificate.
    pub async fn certificate_info(&self, host: &str, port: u16) -> Result<CertificateInfo> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| anyhow!("Invalid server name {host}: {e}"))?;

        let sock = match tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((host, port)),
        )
        .await
        {
            Ok(Ok(sock)) => sock,
            Ok(Err(e)) => return Err(anyhow!("Failed to connect to {host}:{port}: {e}")),
            Err(_) => {
                return Err(anyhow!(
                    "TCP connection timeout for {host}:{port} ({}s)",
                    self.connect_timeout.as_secs()
                ))
            }
        };

        let tls_stream = match tokio::time::timeout(
            self.handshake_timeout,
            self.connector.connect(server_name, sock),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(anyhow!("TLS handshake failed for {host}: {e}")),
            Err(_) => {
                return Err(anyhow!(
                    "TLS handshake timeout for {host} ({}s)",
                    self.handshake_timeout.as_secs()
                ))
            }
        };

        let leaf = tls_stream
            .get_ref()
            .1
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| anyhow!("No peer certificate presented by {host}"))?;

        certificate_info_from_der(leaf.as_ref(), Utc::now())
    }

    /// SSL metadata for a probe target.
    ///
    /// Plain-HTTP targets get the `http_only` marker. For HTTPS targets any
    /// failure is logged at debug level and yields `None`.
    pub async fn ssl_info_for(&self, target: &str) -> Option<SslInfo> {
        let parsed = match url::Url::parse(target) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Cannot inspect certificate of {target}: {e}");
                return None;
            }
        };
        match parsed.scheme() {
            "http" => return Some(SslInfo::http_only()),
            "https" => {}
            _ => return None,
        }
        let host = parsed.host_str()?;
        let port = parsed.port_or_known_default().unwrap_or(443);

        match self.certificate_info(host, port).await {
            Ok(info) => Some(SslInfo::Certificate(info)),
            Err(e) => {
                debug!("No certificate info for {target}: {e}");
                None
            }
        }
    }
}
