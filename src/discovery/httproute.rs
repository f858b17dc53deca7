//! HTTPRoute → `UrlRecord` conversion.
//!
//! HTTPRoutes arrive as `DynamicObject`s; only the fields discovery reads are
//! deserialized.

use kube::api::DynamicObject;
use serde::Deserialize;

use crate::models::{Backend, ResourceKind, UrlRecord};

use super::annotations::filter_annotations;
use super::{normalize_path, url_for};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpRouteSpec {
    #[serde(default)]
    hostnames: Vec<String>,
    #[serde(default)]
    parent_refs: Vec<ParentRef>,
    #[serde(default)]
    rules: Vec<HttpRouteRule>,
}

#[derive(Debug, Deserialize)]
struct ParentRef {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpRouteRule {
    #[serde(default)]
    matches: Vec<HttpRouteMatch>,
    #[serde(default)]
    backend_refs: Vec<BackendRef>,
}

#[derive(Debug, Deserialize)]
struct HttpRouteMatch {
    path: Option<PathMatch>,
}

#[derive(Debug, Deserialize)]
struct PathMatch {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BackendRef {
    name: Option<String>,
    port: Option<i32>,
}

impl HttpRouteRule {
    fn backend(&self) -> Backend {
        self.backend_refs
            .first()
            .map(|b| Backend {
                service: b.name.clone(),
                port: b.port,
            })
            .unwrap_or_default()
    }

    /// Declared paths of this rule; a match without a path means `/`.
    fn paths(&self) -> Vec<String> {
        self.matches
            .iter()
            .map(|m| {
                normalize_path(m.path.as_ref().and_then(|p| p.value.as_deref()))
            })
            .collect()
    }
}

/// `(path, backend)` pairs declared by a route, or a single `/` when none are.
fn route_paths(spec: &HttpRouteSpec) -> Vec<(String, Backend)> {
    let mut pairs = Vec::new();
    for rule in &spec.rules {
        let backend = rule.backend();
        let paths = rule.paths();
        if paths.is_empty() {
            pairs.push(("/".to_string(), backend));
        } else {
            pairs.extend(paths.into_iter().map(|path| (path, backend.clone())));
        }
    }
    if pairs.is_empty() {
        pairs.push(("/".to_string(), Backend::default()));
    }
    pairs
}

/// One record per `hostname × path` of `route`.
///
/// The class is `gateway/<first parentRef name>`. A route without hostnames
/// yields nothing; a spec that cannot be read is logged and skipped.
pub fn records_from_http_route(namespace: &str, route: &DynamicObject) -> Vec<UrlRecord> {
    let metadata = &route.metadata;
    let name = metadata.name.clone().unwrap_or_default();

    let spec: HttpRouteSpec = match route.data.get("spec") {
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(spec) => spec,
            Err(e) => {
                log::warn!("Skipping HTTPRoute {namespace}/{name}: unreadable spec: {e}");
                return Vec::new();
            }
        },
        None => HttpRouteSpec::default(),
    };

    if spec.hostnames.is_empty() {
        return Vec::new();
    }

    let raw_annotations = metadata.annotations.clone().unwrap_or_default();
    let annotations = filter_annotations(&raw_annotations);
    let labels = metadata.labels.clone().unwrap_or_default();
    let gateway = spec
        .parent_refs
        .first()
        .and_then(|p| p.name.as_deref())
        .unwrap_or("unknown");
    let class = format!("gateway/{gateway}");
    let paths = route_paths(&spec);

    let mut records = Vec::with_capacity(spec.hostnames.len() * paths.len());
    for hostname in spec.hostnames.iter().filter(|h| !h.is_empty()) {
        for (path, backend) in &paths {
            records.push(UrlRecord {
                url: url_for(hostname, path),
                namespace: namespace.to_string(),
                name: name.clone(),
                resource_kind: ResourceKind::HttpRoute,
                annotations: annotations.clone(),
                labels: labels.clone(),
                gateway_or_ingress_class: Some(class.clone()),
                path: path.clone(),
                backend: backend.clone(),
            });
        }
    }
    records
}
