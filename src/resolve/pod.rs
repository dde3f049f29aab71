use crate::kube::ResourceLister;
use crate::models::{PodSourceKind, ResourceObject};
use crate::select::{SelectConfig, Selector};

use super::{ResolveError, resolve_resource, select_one};

/// Resolve a target down to exactly one pod
///
/// A pod target resolves directly. For controllers the resolved object's
/// label selector picks the pods in its namespace; one match is returned as
/// is, several go to the selector. Kinds that cannot map to pods fail before
/// anything is listed.
pub async fn resolve_pod(
    lister: &dyn ResourceLister,
    selector: &dyn Selector,
    kind: &str,
    pattern: &str,
    namespace: Option<&str>,
    config: &SelectConfig,
) -> Result<ResourceObject, ResolveError> {
    let source = PodSourceKind::parse_optional(kind)
        .ok_or_else(|| ResolveError::UnsupportedKind(kind.to_string()))?;

    let owner = resolve_resource(lister, selector, source.as_str(), pattern, namespace, config).await?;
    if source == PodSourceKind::Pod {
        return Ok(owner);
    }

    let labels = source
        .pod_selector(&owner)
        .filter(|labels| !labels.is_empty())
        .ok_or_else(|| ResolveError::MissingSelector {
            kind: source.to_string(),
            name: owner.name.clone(),
        })?;

    let pod_namespace = if owner.namespace.is_empty() {
        namespace
    } else {
        Some(owner.namespace.as_str())
    };

    tracing::debug!(
        "Looking up pods of {}/{} with selector {:?}",
        source,
        owner.name,
        labels
    );

    let pods = lister
        .list(PodSourceKind::Pod.as_str(), pod_namespace)
        .await
        .map_err(|e| ResolveError::list_failed(PodSourceKind::Pod.as_str(), e))?;

    let mut matching: Vec<ResourceObject> = pods
        .into_iter()
        .filter(|pod| pod.matches_labels(&labels))
        .collect();

    match matching.len() {
        0 => Err(ResolveError::NoPodsFound {
            kind: source.to_string(),
            name: owner.name,
        }),
        1 => Ok(matching.remove(0)),
        _ => {
            let names: Vec<String> = matching.iter().map(|pod| pod.name.clone()).collect();
            let step = config
                .clone()
                .with_prompt(format!("Select pod of {}/{}", source, owner.name))
                .with_query("");
            let selected = select_one(selector, PodSourceKind::Pod.as_str(), &names, step).await?;

            let index = names
                .iter()
                .position(|name| *name == selected)
                .ok_or(ResolveError::UnknownSelection {
                    kind: PodSourceKind::Pod.to_string(),
                    selected,
                })?;
            Ok(matching.swap_remove(index))
        }
    }
}
