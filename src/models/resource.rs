//! Generic resource objects
//!
//! Listers hand back every kind in the same shape: identity, labels, owner
//! references and the remaining document for kind-specific lookups such as
//! `spec.selector`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backlink from a resource to one of its owners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: String,
    pub name: String,
}

/// A listed cluster object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    /// Kind as reported by the cluster (e.g. `Deployment`)
    pub kind: String,
    pub name: String,
    /// Empty for cluster-scoped resources
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerRef>,
    /// Everything outside `metadata` (spec, status, ...)
    #[serde(default)]
    pub data: Value,
}

impl ResourceObject {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            owner_references: Vec::new(),
            data: Value::Null,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_owner(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.owner_references.push(OwnerRef {
            kind: kind.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Identity key, using `kind` when the object does not report one
    pub fn key_as(&self, kind: &str) -> ResourceKey {
        let kind = if self.kind.is_empty() { kind } else { &self.kind };
        ResourceKey::new(&self.namespace, kind, &self.name)
    }

    /// True when every selector pair is present on this object's labels
    pub fn matches_labels(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(key, value)| self.labels.get(key) == Some(value))
    }

    /// `namespace/kind/name`, dropping the namespace for cluster-scoped objects
    pub fn display_path(&self) -> String {
        ResourceKey::format_path(&self.namespace, &self.kind, &self.name)
    }
}

/// Identity of an object within one cluster: `(namespace, kind, name)`
///
/// Kinds are stored lower-cased so `Deployment` from an owner reference and
/// `deployment` from a parsed target compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub namespace: String,
    pub kind: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: &str, kind: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: kind.to_lowercase(),
            name: name.to_string(),
        }
    }

    pub(crate) fn format_path(namespace: &str, kind: &str, name: &str) -> String {
        if namespace.is_empty() {
            format!("{}/{}", kind, name)
        } else {
            format!("{}/{}/{}", namespace, kind, name)
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::format_path(&self.namespace, &self.kind, &self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_labels_is_containment() {
        let pod = ResourceObject::new("Pod", "web-1", "default")
            .with_label("app", "web")
            .with_label("pod-template-hash", "7f8");

        let mut selector = BTreeMap::new();
        selector.insert("app".to_string(), "web".to_string());
        assert!(pod.matches_labels(&selector));

        selector.insert("tier".to_string(), "frontend".to_string());
        assert!(!pod.matches_labels(&selector));
    }

    #[test]
    fn test_matches_labels_requires_exact_values() {
        let pod = ResourceObject::new("Pod", "web-1", "default").with_label("app", "web-canary");
        let mut selector = BTreeMap::new();
        selector.insert("app".to_string(), "web".to_string());
        assert!(!pod.matches_labels(&selector));
    }

    #[test]
    fn test_key_is_case_insensitive_on_kind() {
        let rs = ResourceObject::new("ReplicaSet", "web-7f8", "default");
        assert_eq!(
            rs.key_as("replicaset"),
            ResourceKey::new("default", "replicaset", "web-7f8")
        );
        let unnamed_kind = ResourceObject::new("", "web-7f8", "default");
        assert_eq!(
            unnamed_kind.key_as("ReplicaSet"),
            ResourceKey::new("default", "ReplicaSet", "web-7f8")
        );
    }

    #[test]
    fn test_display_path() {
        assert_eq!(
            ResourceObject::new("Pod", "web-1", "default").display_path(),
            "default/Pod/web-1"
        );
        assert_eq!(
            ResourceObject::new("Node", "worker-1", "").display_path(),
            "Node/worker-1"
        );
    }
}
