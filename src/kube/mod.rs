//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server for a chosen kubeconfig
//! context and provides the listing and context-discovery adapters the
//! resolvers consume.

pub mod contexts;
pub mod lister;

pub use contexts::{ContextMatcher, determine_context, determine_namespace, list_contexts};
pub use lister::{KubeLister, ResourceLister};

use anyhow::{Context, Result};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// With an explicit context the kubeconfig entry for that context is used;
/// otherwise the default loading strategy applies:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let config = match context {
        Some(name) => {
            let options = KubeConfigOptions {
                context: Some(name.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig for context '{}'", name))?
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    tracing::debug!("Connecting to {}", config.cluster_url);
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}
