//! Resource listing
//!
//! [`ResourceLister`] is the seam between resolution logic and the cluster.
//! [`KubeLister`] implements it over API discovery and `Api<DynamicObject>`,
//! so any kind the cluster serves (including custom resources) can be listed
//! by its lower-case kind or plural name.

use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::api::{ListParams, ObjectList};
use kube::core::DynamicObject;
use kube::discovery::{ApiCapabilities, ApiResource, Discovery, Scope};
use kube::{Api, Client};
use tokio::sync::OnceCell;

use crate::models::{OwnerRef, ResourceObject};

/// Lists objects of one kind, optionally scoped to a namespace
#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// `namespace` of None lists across all namespaces
    async fn list(&self, kind: &str, namespace: Option<&str>) -> Result<Vec<ResourceObject>>;
}

/// Lister backed by a live cluster
pub struct KubeLister {
    client: Client,
    resources: OnceCell<Vec<(ApiResource, ApiCapabilities)>>,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resources: OnceCell::new(),
        }
    }

    /// Run API discovery once per lister
    async fn discovered(&self) -> Result<&[(ApiResource, ApiCapabilities)]> {
        let resources = self
            .resources
            .get_or_try_init(|| async {
                tracing::debug!("Running API discovery");
                let discovery = Discovery::new(self.client.clone())
                    .run()
                    .await
                    .context("Failed to discover Kubernetes API resources")?;
                let resources: Vec<_> = discovery
                    .groups()
                    .flat_map(|group| group.recommended_resources())
                    .collect();
                tracing::debug!("Discovered {} API resources", resources.len());
                Ok::<_, anyhow::Error>(resources)
            })
            .await?;
        Ok(resources.as_slice())
    }

    async fn find_resource(&self, kind: &str) -> Result<(ApiResource, ApiCapabilities)> {
        let wanted = kind.to_lowercase();
        self.discovered()
            .await?
            .iter()
            .find(|(resource, _)| resource_matches(resource, &wanted))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("the server doesn't have a resource type \"{}\"", kind))
    }
}

fn resource_matches(resource: &ApiResource, wanted: &str) -> bool {
    resource.kind.to_lowercase() == wanted || resource.plural == wanted
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list(&self, kind: &str, namespace: Option<&str>) -> Result<Vec<ResourceObject>> {
        let (resource, caps) = self.find_resource(kind).await?;

        let api: Api<DynamicObject> = match (namespace, &caps.scope) {
            (Some(ns), Scope::Namespaced) => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        };

        let list: ObjectList<DynamicObject> = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("Failed to list {}", resource.plural))?;

        tracing::debug!(
            "Listed {} {} in {}",
            list.items.len(),
            resource.plural,
            namespace.unwrap_or("all namespaces")
        );

        Ok(list
            .items
            .into_iter()
            .map(|obj| to_resource_object(obj, &resource.kind))
            .collect())
    }
}

/// Convert a listed object, falling back to the discovered kind since list
/// items usually omit their type fields
pub fn to_resource_object(obj: DynamicObject, kind: &str) -> ResourceObject {
    let kind = obj
        .types
        .map(|types| types.kind)
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| kind.to_string());
    let meta = obj.metadata;

    ResourceObject {
        kind,
        name: meta.name.unwrap_or_default(),
        namespace: meta.namespace.unwrap_or_default(),
        labels: meta.labels.unwrap_or_default(),
        owner_references: meta
            .owner_references
            .unwrap_or_default()
            .into_iter()
            .map(|owner| OwnerRef {
                kind: owner.kind,
                name: owner.name,
            })
            .collect(),
        data: obj.data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_resource_object() {
        let obj: DynamicObject = serde_json::from_value(json!({
            "metadata": {
                "name": "web-7f8-abcde",
                "namespace": "default",
                "labels": {"app": "web"},
                "ownerReferences": [{
                    "apiVersion": "apps/v1",
                    "kind": "ReplicaSet",
                    "name": "web-7f8",
                    "uid": "1234"
                }]
            },
            "spec": {"nodeName": "worker-1"}
        }))
        .unwrap();

        let resource = to_resource_object(obj, "Pod");
        assert_eq!(resource.kind, "Pod");
        assert_eq!(resource.name, "web-7f8-abcde");
        assert_eq!(resource.namespace, "default");
        assert_eq!(resource.labels.get("app").map(String::as_str), Some("web"));
        assert_eq!(
            resource.owner_references,
            vec![OwnerRef {
                kind: "ReplicaSet".to_string(),
                name: "web-7f8".to_string()
            }]
        );
        assert_eq!(resource.data["spec"]["nodeName"], "worker-1");
    }

    #[test]
    fn test_resource_matches() {
        let resource = ApiResource {
            group: "apps".to_string(),
            version: "v1".to_string(),
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            plural: "deployments".to_string(),
        };
        assert!(resource_matches(&resource, "deployment"));
        assert!(resource_matches(&resource, "deployments"));
        assert!(!resource_matches(&resource, "deploy"));
    }
}
