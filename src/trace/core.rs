//! Core ownership walk

use std::collections::HashSet;

use futures::future::{BoxFuture, FutureExt};

use crate::kube::ResourceLister;
use crate::models::{OwnerRef, ResourceKey, ResourceObject};
use crate::trace::models::{NodeStatus, OwnershipNode};

/// Build the ownership tree rooted at `root`
///
/// Each owner is looked up in the child's namespace. A failed lookup becomes
/// a [`NodeStatus::LookupFailed`] leaf and the rest of the walk continues; an
/// owner already visited, by its reference or by the object the lookup
/// returned, becomes a [`NodeStatus::CycleDetected`] leaf and is not expanded
/// again.
pub async fn build_ownership_graph(
    lister: &dyn ResourceLister,
    root: &ResourceObject,
    root_kind: &str,
) -> OwnershipNode {
    let kind = if root.kind.is_empty() {
        root_kind
    } else {
        root.kind.as_str()
    };

    let mut visited = HashSet::new();
    let node = walk(lister, root.clone(), kind.to_string(), &mut visited).await;
    tracing::debug!(
        "Built ownership tree for {} with {} nodes",
        root.display_path(),
        node.node_count()
    );
    node
}

fn walk<'a>(
    lister: &'a dyn ResourceLister,
    resource: ResourceObject,
    kind: String,
    visited: &'a mut HashSet<ResourceKey>,
) -> BoxFuture<'a, OwnershipNode> {
    async move {
        visited.insert(resource.key_as(&kind));

        let mut parents = Vec::with_capacity(resource.owner_references.len());
        for owner in &resource.owner_references {
            let key = ResourceKey::new(&resource.namespace, &owner.kind, &owner.name);
            if visited.contains(&key) {
                tracing::debug!("Owner {} already visited, not expanding", key);
                parents.push(OwnershipNode::leaf(
                    &resource.namespace,
                    &owner.kind,
                    &owner.name,
                    NodeStatus::CycleDetected,
                ));
                continue;
            }

            match lookup_owner(lister, owner, &resource.namespace).await {
                // A cluster-scoped owner keys differently from its reference
                Ok(found) if visited.contains(&found.key_as(&owner.kind)) => {
                    tracing::debug!("Owner {} already visited, not expanding", key);
                    parents.push(OwnershipNode::leaf(
                        &found.namespace,
                        &owner.kind,
                        &found.name,
                        NodeStatus::CycleDetected,
                    ));
                }
                Ok(found) => {
                    visited.insert(key);
                    let node = walk(lister, found, owner.kind.clone(), &mut *visited).await;
                    parents.push(node);
                }
                Err(reason) => {
                    tracing::warn!("Failed to look up owner {}: {}", key, reason);
                    parents.push(OwnershipNode::leaf(
                        &resource.namespace,
                        &owner.kind,
                        &owner.name,
                        NodeStatus::LookupFailed(reason),
                    ));
                }
            }
        }

        OwnershipNode {
            namespace: resource.namespace,
            kind,
            name: resource.name,
            status: NodeStatus::Resolved,
            parents,
        }
    }
    .boxed()
}

async fn lookup_owner(
    lister: &dyn ResourceLister,
    owner: &OwnerRef,
    namespace: &str,
) -> Result<ResourceObject, String> {
    let scope = if namespace.is_empty() {
        None
    } else {
        Some(namespace)
    };

    let candidates = lister
        .list(&owner.kind, scope)
        .await
        .map_err(|e| format!("{:#}", e))?;

    candidates
        .into_iter()
        .find(|obj| obj.name == owner.name)
        .ok_or_else(|| "not found".to_string())
}
