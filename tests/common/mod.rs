//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::DynamicObject;
use portal_checker::discovery::ClusterSource;
use portal_checker::{Config, LogFormat, LogLevel, ResourceKind, UrlRecord};
use serde_json::json;
use tempfile::TempDir;

/// Fixed cluster contents served from memory.
#[derive(Default)]
pub struct StaticCluster {
    pub namespaces: Vec<String>,
    pub routes: Vec<DynamicObject>,
    pub ingresses: Vec<Ingress>,
    pub unreachable: AtomicBool,
}

impl StaticCluster {
    /// Adds an HTTPRoute with one `PathPrefix` match per path.
    pub fn route(
        mut self,
        namespace: &str,
        name: &str,
        hostname: &str,
        paths: &[&str],
        annotations: BTreeMap<String, String>,
    ) -> Self {
        let matches: Vec<_> = paths
            .iter()
            .map(|p| json!({"path": {"type": "PathPrefix", "value": p}}))
            .collect();
        let route = serde_json::from_value(json!({
            "apiVersion": "gateway.networking.k8s.io/v1",
            "kind": "HTTPRoute",
            "metadata": {"name": name, "namespace": namespace, "annotations": annotations},
            "spec": {
                "hostnames": [hostname],
                "parentRefs": [{"name": "public"}],
                "rules": [{"matches": matches, "backendRefs": [{"name": name, "port": 80}]}]
            }
        }))
        .expect("valid HTTPRoute");
        if !self.namespaces.iter().any(|n| n == namespace) {
            self.namespaces.push(namespace.to_string());
        }
        self.routes.push(route);
        self
    }

    /// Adds an Ingress with a single host rule.
    pub fn ingress(mut self, namespace: &str, name: &str, host: &str, path: &str) -> Self {
        let ingress = serde_json::from_value(json!({
            "metadata": {"name": name, "namespace": namespace},
            "spec": {
                "ingressClassName": "nginx",
                "rules": [{
                    "host": host,
                    "http": {"paths": [{
                        "path": path,
                        "pathType": "Prefix",
                        "backend": {"service": {"name": name, "port": {"number": 8080}}}
                    }]}
                }]
            }
        }))
        .expect("valid Ingress");
        self.ingresses.push(ingress);
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClusterSource for StaticCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.namespaces.clone())
    }

    async fn list_http_routes(&self, namespace: &str) -> Result<Vec<DynamicObject>> {
        Ok(self
            .routes
            .iter()
            .filter(|r| r.metadata.namespace.as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn list_ingresses(&self) -> Result<Vec<Ingress>> {
        Ok(self.ingresses.clone())
    }
}

/// Test configuration with all files inside `dir` and a one-second timeout.
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        log_level: LogLevel::Error,
        log_format: LogFormat::Plain,
        request_timeout_secs: 1,
        exclusion_cache_ttl_secs: 0,
        urls_file: dir.path().join("urls.yaml"),
        excluded_urls_file: dir.path().join("excluded-urls.yaml"),
        enable_ssl_info: false,
        ..Default::default()
    }
}

/// A record pointing at `url` as-is.
pub fn record(url: &str) -> UrlRecord {
    UrlRecord {
        url: url.to_string(),
        namespace: "default".to_string(),
        name: "test".to_string(),
        resource_kind: ResourceKind::HttpRoute,
        annotations: BTreeMap::new(),
        labels: BTreeMap::new(),
        gateway_or_ingress_class: None,
        path: "/".to_string(),
        backend: Default::default(),
    }
}
