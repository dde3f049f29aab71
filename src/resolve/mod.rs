//! Target resolution
//!
//! Turns a parsed target into exactly one cluster object: [`resolve_resource`]
//! narrows a kind and partial name down to one object, [`resolve_pod`] goes
//! one step further and follows a controller's label selector to one pod.
//! Whenever more than one candidate remains the [`Selector`] decides.

mod pod;
mod resource;

pub use pod::resolve_pod;
pub use resource::resolve_resource;

use std::error::Error as StdError;

use crate::select::{SelectConfig, SelectError, Selector, ordered_candidates};

/// Resolution errors
///
/// Each variant names the kind being resolved so nested resolutions
/// (controller, then pod) report which step failed.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no {kind} matching '{pattern}' found")]
    NotFound { kind: String, pattern: String },

    #[error("failed to select {kind}")]
    SelectionFailed {
        kind: String,
        #[source]
        source: SelectError,
    },

    #[error("selected {kind} '{selected}' is not among the candidates")]
    UnknownSelection { kind: String, selected: String },

    #[error("cannot resolve pods from kind '{0}'")]
    UnsupportedKind(String),

    #[error("{kind}/{name} has no pod selector")]
    MissingSelector { kind: String, name: String },

    #[error("no pods found for {kind}/{name}")]
    NoPodsFound { kind: String, name: String },

    #[error("failed to list {kind}")]
    ListFailed {
        kind: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl ResolveError {
    pub(crate) fn list_failed(kind: &str, source: anyhow::Error) -> Self {
        ResolveError::ListFailed {
            kind: kind.to_string(),
            source: source.into(),
        }
    }
}

/// Ask the selector for exactly one of `labels`
///
/// The answer must be one of the offered labels; anything else fails rather
/// than guessing.
pub(crate) async fn select_one(
    selector: &dyn Selector,
    kind: &str,
    labels: &[String],
    config: SelectConfig,
) -> Result<String, ResolveError> {
    let config = config.with_multi(false);
    let offered = ordered_candidates(labels, &config);

    let chosen = selector
        .select(&offered, &config)
        .await
        .map_err(|source| ResolveError::SelectionFailed {
            kind: kind.to_string(),
            source,
        })?;

    let selected = chosen
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::SelectionFailed {
            kind: kind.to_string(),
            source: SelectError::NoSelection,
        })?;

    if !labels.contains(&selected) {
        return Err(ResolveError::UnknownSelection {
            kind: kind.to_string(),
            selected,
        });
    }
    Ok(selected)
}
