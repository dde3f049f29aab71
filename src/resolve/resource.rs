use crate::kube::ResourceLister;
use crate::models::{PodSourceKind, ResourceObject};
use crate::select::{SelectConfig, Selector};

use super::{ResolveError, select_one};

/// Resolve `kind` plus a partial name to exactly one object
///
/// Candidates are the listed objects whose name contains `pattern`. A single
/// candidate is returned without consulting the selector; several go to the
/// selector with `pattern` as the initial query and the caller's prompt, or
/// `"Select <kind>"` when the caller set none. An empty `kind` is picked
/// interactively from the pod-producing kinds first. With `namespace` of None the listing spans all
/// namespaces and candidates are offered as `namespace/name`.
pub async fn resolve_resource(
    lister: &dyn ResourceLister,
    selector: &dyn Selector,
    kind: &str,
    pattern: &str,
    namespace: Option<&str>,
    config: &SelectConfig,
) -> Result<ResourceObject, ResolveError> {
    let kind = if kind.is_empty() {
        pick_kind(selector, config).await?
    } else {
        kind.to_string()
    };

    tracing::debug!(
        "Resolving {} matching '{}' in {}",
        kind,
        pattern,
        namespace.unwrap_or("all namespaces")
    );

    let objects = lister
        .list(&kind, namespace)
        .await
        .map_err(|e| ResolveError::list_failed(&kind, e))?;

    let mut candidates: Vec<ResourceObject> = objects
        .into_iter()
        .filter(|obj| obj.name.contains(pattern))
        .collect();

    match candidates.len() {
        0 => Err(ResolveError::NotFound {
            kind,
            pattern: pattern.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        n => {
            tracing::debug!("{} {} candidates, asking selector", n, kind);
            let labels: Vec<String> = candidates
                .iter()
                .map(|obj| candidate_label(obj, namespace.is_none()))
                .collect();

            let prompt = if config.prompt.is_empty() {
                format!("Select {}", kind)
            } else {
                config.prompt.clone()
            };
            let step = config.clone().with_prompt(prompt).with_query(pattern);
            let selected = select_one(selector, &kind, &labels, step).await?;

            let index = labels
                .iter()
                .position(|label| *label == selected)
                .ok_or(ResolveError::UnknownSelection { kind, selected })?;
            Ok(candidates.swap_remove(index))
        }
    }
}

fn candidate_label(obj: &ResourceObject, qualify: bool) -> String {
    if qualify && !obj.namespace.is_empty() {
        format!("{}/{}", obj.namespace, obj.name)
    } else {
        obj.name.clone()
    }
}

async fn pick_kind(selector: &dyn Selector, config: &SelectConfig) -> Result<String, ResolveError> {
    let kinds: Vec<String> = PodSourceKind::ALL
        .iter()
        .map(|kind| kind.as_str().to_string())
        .collect();
    let step = config.clone().with_prompt("Select kind").with_query("");
    select_one(selector, "kind", &kinds, step).await
}
