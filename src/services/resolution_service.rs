//! Resolution service
//!
//! Entry point for the commands: parse a target, resolve it to a resource or
//! a pod, and build its ownership tree.

use std::sync::Arc;

use crate::kube::ResourceLister;
use crate::models::ResourceObject;
use crate::resolve::{self, ResolveError};
use crate::select::{SelectConfig, Selector};
use crate::target::{self, Target};
use crate::trace::{self, OwnershipNode};

/// Service for target resolution
#[derive(Clone)]
pub struct ResolutionService {
    lister: Arc<dyn ResourceLister>,
    selector: Arc<dyn Selector>,
}

impl ResolutionService {
    pub fn new(lister: Arc<dyn ResourceLister>, selector: Arc<dyn Selector>) -> Self {
        Self { lister, selector }
    }

    pub fn parse_target(&self, raw: &str) -> Target {
        target::parse_target(raw)
    }

    /// Resolve a kind and partial name to one resource
    pub async fn resolve_resource(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
        config: &SelectConfig,
    ) -> Result<ResourceObject, ResolveError> {
        resolve::resolve_resource(
            self.lister.as_ref(),
            self.selector.as_ref(),
            kind,
            name,
            namespace,
            config,
        )
        .await
    }

    /// Resolve a pod or pod-producing controller to one pod
    pub async fn resolve_pod(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
        config: &SelectConfig,
    ) -> Result<ResourceObject, ResolveError> {
        resolve::resolve_pod(
            self.lister.as_ref(),
            self.selector.as_ref(),
            kind,
            name,
            namespace,
            config,
        )
        .await
    }

    /// Ownership tree rooted at `resource`; never fails
    pub async fn build_ownership_graph(
        &self,
        resource: &ResourceObject,
        kind: &str,
    ) -> OwnershipNode {
        trace::build_ownership_graph(self.lister.as_ref(), resource, kind).await
    }

    /// Shared selector, for commands that pick among non-resource values
    pub fn selector(&self) -> &dyn Selector {
        self.selector.as_ref()
    }

    pub fn lister(&self) -> &dyn ResourceLister {
        self.lister.as_ref()
    }
}
