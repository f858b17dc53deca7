//! HTTP and Kubernetes client initialization.

use log::{info, warn};
use reqwest::{Certificate, ClientBuilder};

use crate::config::{Config, KubeEnv, DEFAULT_USER_AGENT};
use crate::error_handling::InitializationError;
use crate::tls::read_ca_bundle;

/// Initializes the HTTP client used for probes and Slack alerts.
///
/// Creates a `reqwest::Client` configured with:
/// - the probe timeout from the configuration
/// - the checker's user agent
/// - redirect following (reqwest's default of 10 hops)
/// - every certificate of the custom CA bundle, when one is configured
///
/// Certificate verification is disabled only when [`Config::insecure_tls`]
/// says so.
///
/// # Errors
///
/// Returns an error if the CA bundle exists but cannot be parsed, or if
/// client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let mut builder = ClientBuilder::new()
        .timeout(config.request_timeout())
        .user_agent(DEFAULT_USER_AGENT);

    if let Some(path) = &config.custom_cert {
        if let Some(pem) = read_ca_bundle(path)? {
            let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| {
                InitializationError::CaBundleError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            info!(
                "Trusting {} certificate(s) from {}",
                certificates.len(),
                path.display()
            );
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }
    }

    if config.insecure_tls() {
        warn!("Development mode without a custom CA: certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder.build()?)
}

/// Builds the Kubernetes client.
///
/// In production the pod's service account is used; locally the usual
/// kubeconfig lookup applies (`KUBECONFIG`, then `~/.kube/config`).
///
/// # Errors
///
/// Returns `InitializationError::KubeClientError` if no configuration can be
/// loaded or the client cannot be built from it.
pub async fn init_kube_client(env: &KubeEnv) -> Result<kube::Client, InitializationError> {
    let kube_config = match env {
        KubeEnv::Production => kube::Config::incluster()
            .map_err(|e| InitializationError::KubeClientError(format!("in-cluster config: {e}")))?,
        KubeEnv::Local => kube::Config::infer()
            .await
            .map_err(|e| InitializationError::KubeClientError(format!("kubeconfig: {e}")))?,
    };
    info!("Kubernetes API at {}", kube_config.cluster_url);

    kube::Client::try_from(kube_config)
        .map_err(|e| InitializationError::KubeClientError(e.to_string()))
}
