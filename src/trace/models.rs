//! Data structures for ownership trees

use crate::models::ResourceKey;

/// How a node came to be in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    /// Looked up and expanded
    Resolved,
    /// Already visited in this walk; not expanded again
    CycleDetected,
    /// The owner could not be fetched; carries the reason
    LookupFailed(String),
}

/// A resource and the owners it points at
///
/// `parents` are the node's owners in `ownerReferences` order. Leaves with a
/// status other than [`NodeStatus::Resolved`] never have parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipNode {
    pub namespace: String,
    pub kind: String,
    pub name: String,
    pub status: NodeStatus,
    pub parents: Vec<OwnershipNode>,
}

impl OwnershipNode {
    pub fn leaf(namespace: &str, kind: &str, name: &str, status: NodeStatus) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            status,
            parents: Vec::new(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.namespace, &self.kind, &self.name)
    }

    /// `namespace/kind/name`, without the namespace for cluster-scoped owners
    pub fn path(&self) -> String {
        ResourceKey::format_path(&self.namespace, &self.kind, &self.name)
    }

    /// Rendered line text: the path plus a marker for unresolved leaves
    pub fn label(&self) -> String {
        match &self.status {
            NodeStatus::Resolved => self.path(),
            NodeStatus::CycleDetected => format!("{} (cycle detected)", self.path()),
            NodeStatus::LookupFailed(reason) => {
                format!("{} (lookup failed: {})", self.path(), reason)
            }
        }
    }

    /// Total nodes in this tree, the root included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.parents.iter());
        }
        count
    }
}
