//! Ingress → `UrlRecord` conversion.

use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress};

use crate::config::{LEGACY_INGRESS_CLASS_ANNOTATION, VENDOR_INGRESS_CLASS_ANNOTATIONS};
use crate::models::{Backend, ResourceKind, UrlRecord};

use super::annotations::filter_annotations;
use super::{normalize_path, url_for};

/// Ingress class, by precedence: `spec.ingressClassName`, the legacy
/// annotation, then the vendor annotations in order.
pub fn ingress_class(ingress: &Ingress, annotations: &BTreeMap<String, String>) -> Option<String> {
    ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.ingress_class_name.clone())
        .filter(|class| !class.is_empty())
        .or_else(|| {
            std::iter::once(LEGACY_INGRESS_CLASS_ANNOTATION)
                .chain(VENDOR_INGRESS_CLASS_ANNOTATIONS.iter().copied())
                .find_map(|key| annotations.get(key).filter(|v| !v.is_empty()).cloned())
        })
}

fn backend_of(path: &HTTPIngressPath) -> Backend {
    match &path.backend.service {
        Some(service) => Backend {
            service: Some(service.name.clone()),
            port: service.port.as_ref().and_then(|port| port.number),
        },
        None => Backend::default(),
    }
}

/// One record per `host × path` of every rule that names a host.
///
/// A rule without paths yields a single `/` record; rules without a host
/// (catch-all) are skipped.
pub fn records_from_ingress(ingress: &Ingress) -> Vec<UrlRecord> {
    let metadata = &ingress.metadata;
    let namespace = metadata.namespace.clone().unwrap_or_default();
    let name = metadata.name.clone().unwrap_or_default();
    let raw_annotations = metadata.annotations.clone().unwrap_or_default();
    let labels = metadata.labels.clone().unwrap_or_default();
    let annotations = filter_annotations(&raw_annotations);
    let class = ingress_class(ingress, &raw_annotations);

    let rules = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.as_ref())
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut records = Vec::new();
    for rule in rules {
        let Some(host) = rule.host.as_deref().filter(|h| !h.is_empty()) else {
            continue;
        };

        let paths: Vec<(String, Backend)> = match rule.http.as_ref() {
            Some(http) if !http.paths.is_empty() => http
                .paths
                .iter()
                .map(|p| (normalize_path(p.path.as_deref()), backend_of(p)))
                .collect(),
            _ => vec![("/".to_string(), Backend::default())],
        };

        for (path, backend) in paths {
            records.push(UrlRecord {
                url: url_for(host, &path),
                namespace: namespace.clone(),
                name: name.clone(),
                resource_kind: ResourceKind::Ingress,
                annotations: annotations.clone(),
                labels: labels.clone(),
                gateway_or_ingress_class: class.clone(),
                path,
                backend,
            });
        }
    }
    records
}
