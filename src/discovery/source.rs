//! Cluster API access.
//!
//! `ClusterSource` is the seam between discovery and the Kubernetes API so
//! that discovery can run against an in-memory cluster in tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::{Api, Client};

use crate::config::{GATEWAY_API_GROUP, GATEWAY_API_VERSION, HTTP_ROUTE_KIND, HTTP_ROUTE_PLURAL};

/// Read-only view of the cluster resources discovery needs.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Names of every namespace.
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// HTTPRoute objects in one namespace.
    async fn list_http_routes(&self, namespace: &str) -> Result<Vec<DynamicObject>>;

    /// Ingress objects across all namespaces, in one call.
    async fn list_ingresses(&self) -> Result<Vec<Ingress>>;
}

/// `ClusterSource` backed by a live `kube::Client`.
#[derive(Clone)]
pub struct KubeClusterSource {
    client: Client,
    http_route: ApiResource,
}

/// `ApiResource` describing the Gateway API HTTPRoute.
pub fn http_route_api_resource() -> ApiResource {
    let gvk = GroupVersionKind::gvk(GATEWAY_API_GROUP, GATEWAY_API_VERSION, HTTP_ROUTE_KIND);
    ApiResource::from_gvk_with_plural(&gvk, HTTP_ROUTE_PLURAL)
}

impl KubeClusterSource {
    /// Wraps an initialised client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            http_route: http_route_api_resource(),
        }
    }
}

#[async_trait]
impl ClusterSource for KubeClusterSource {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .context("Failed to list namespaces")?;
        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    async fn list_http_routes(&self, namespace: &str) -> Result<Vec<DynamicObject>> {
        let routes: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &self.http_route);
        let list = routes
            .list(&ListParams::default())
            .await
            .with_context(|| format!("Failed to list HTTPRoutes in namespace {namespace}"))?;
        Ok(list.items)
    }

    async fn list_ingresses(&self) -> Result<Vec<Ingress>> {
        let ingresses: Api<Ingress> = Api::all(self.client.clone());
        let list = ingresses
            .list(&ListParams::default())
            .await
            .context("Failed to list ingresses")?;
        Ok(list.items)
    }
}
