//! Resource kind definitions
//!
//! Operators type `deploy`, `po` or `svc`; everything past the target parser
//! works with canonical lower-case kind names. This module owns that mapping
//! and the closed set of kinds that can be resolved down to a pod.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::ResourceObject;

/// Expand a kind abbreviation or plural into its canonical lower-case name
///
/// Unknown kinds pass through lower-cased so custom resources still resolve
/// against API discovery.
pub fn expand_shortname(kind: &str) -> String {
    let lower = kind.trim().to_lowercase();
    let canonical = match lower.as_str() {
        "po" | "pods" => "pod",
        "deploy" | "deployments" => "deployment",
        "sts" | "statefulsets" => "statefulset",
        "ds" | "daemonsets" => "daemonset",
        "rs" | "replicasets" => "replicaset",
        "jobs" => "job",
        "cj" | "cronjobs" => "cronjob",
        "svc" | "services" => "service",
        "ing" | "ingresses" => "ingress",
        "cm" | "configmaps" => "configmap",
        "secrets" => "secret",
        "ns" | "namespaces" => "namespace",
        "no" | "nodes" => "node",
        "pvc" | "persistentvolumeclaims" => "persistentvolumeclaim",
        "pv" | "persistentvolumes" => "persistentvolume",
        "sa" | "serviceaccounts" => "serviceaccount",
        "ep" | "endpoint" => "endpoints",
        "ev" | "events" => "event",
        "hpa" | "horizontalpodautoscalers" => "horizontalpodautoscaler",
        "pdb" | "poddisruptionbudgets" => "poddisruptionbudget",
        "netpol" | "networkpolicies" => "networkpolicy",
        "crd" | "crds" | "customresourcedefinitions" => "customresourcedefinition",
        "sc" | "storageclasses" => "storageclass",
        _ => return lower,
    };
    canonical.to_string()
}

/// Kinds whose pods can be discovered, either directly or through a label selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PodSourceKind {
    Pod,
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    Service,
}

impl PodSourceKind {
    /// Every pod-producing kind, in the order offered when a target names no kind
    pub const ALL: [PodSourceKind; 7] = [
        PodSourceKind::Pod,
        PodSourceKind::Deployment,
        PodSourceKind::StatefulSet,
        PodSourceKind::DaemonSet,
        PodSourceKind::ReplicaSet,
        PodSourceKind::Job,
        PodSourceKind::Service,
    ];

    /// Canonical lower-case kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            PodSourceKind::Pod => "pod",
            PodSourceKind::Deployment => "deployment",
            PodSourceKind::StatefulSet => "statefulset",
            PodSourceKind::DaemonSet => "daemonset",
            PodSourceKind::ReplicaSet => "replicaset",
            PodSourceKind::Job => "job",
            PodSourceKind::Service => "service",
        }
    }

    /// Try to parse a kind, returning None when pods cannot be derived from it
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Extract the label selector a controller uses to pick its pods
    ///
    /// Workloads carry it under `spec.selector.matchLabels`, services directly
    /// under `spec.selector`. Pods have no selector and return None.
    pub fn pod_selector(&self, object: &ResourceObject) -> Option<BTreeMap<String, String>> {
        let selector = object.data.get("spec").and_then(|spec| spec.get("selector"));
        let labels = match self {
            PodSourceKind::Pod => return None,
            PodSourceKind::Service => selector,
            PodSourceKind::Deployment
            | PodSourceKind::StatefulSet
            | PodSourceKind::DaemonSet
            | PodSourceKind::ReplicaSet
            | PodSourceKind::Job => selector.and_then(|s| s.get("matchLabels")),
        }?;
        string_map(labels)
    }
}

fn string_map(value: &Value) -> Option<BTreeMap<String, String>> {
    let map = value.as_object()?;
    Some(
        map.iter()
            .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
            .collect(),
    )
}

impl fmt::Display for PodSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PodSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match expand_shortname(s).as_str() {
            "pod" => Ok(PodSourceKind::Pod),
            "deployment" => Ok(PodSourceKind::Deployment),
            "statefulset" => Ok(PodSourceKind::StatefulSet),
            "daemonset" => Ok(PodSourceKind::DaemonSet),
            "replicaset" => Ok(PodSourceKind::ReplicaSet),
            "job" => Ok(PodSourceKind::Job),
            "service" => Ok(PodSourceKind::Service),
            _ => Err(format!("kind '{}' does not map to pods", s)),
        }
    }
}
