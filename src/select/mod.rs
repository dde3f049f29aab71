//! Interactive selection
//!
//! Resolution steps that end up with more than one candidate hand the list to
//! a [`Selector`]. The production implementation drives an `fzf`-compatible
//! subprocess; tests plug in scripted fakes.

mod fzf;

pub use fzf::FzfSelector;

use async_trait::async_trait;

use crate::config::SelectorConfig;

/// Per-invocation selection settings
///
/// Values are cheap to clone; each resolution step derives its own copy with
/// its prompt and query so nested selections stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectConfig {
    /// Exact-match instead of fuzzy matching
    pub exact: bool,
    /// Sort candidates lexicographically before display
    pub sort: bool,
    /// Allow choosing several candidates
    pub multi: bool,
    pub prompt: String,
    /// Initial query typed into the selector
    pub query: String,
    /// Preview command template (`{}` is replaced by the highlighted line)
    pub preview: Option<String>,
    /// Display height hint, e.g. `40%`
    pub height: Option<String>,
}

impl SelectConfig {
    pub fn from_settings(settings: &SelectorConfig) -> Self {
        Self {
            exact: settings.exact,
            sort: settings.sort,
            multi: false,
            prompt: String::new(),
            query: String::new(),
            preview: settings.preview.clone(),
            height: settings.height.clone(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn with_preview(mut self, preview: Option<String>) -> Self {
        self.preview = preview;
        self
    }
}

/// Selection errors
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("nothing was selected")]
    NoSelection,

    #[error("selection was cancelled")]
    Cancelled,

    #[error("selector failed: {0}")]
    SubprocessFailed(String),

    #[error("cannot find '{0}' in your system, please install it first")]
    NotInstalled(String),
}

/// Chooses among candidate strings
#[async_trait]
pub trait Selector: Send + Sync {
    /// Returns the chosen candidates: one for single-select, one or more for multi-select
    async fn select(
        &self,
        candidates: &[String],
        config: &SelectConfig,
    ) -> Result<Vec<String>, SelectError>;
}

/// Order candidates the way they should be offered
///
/// Sorting is lexicographic and only applied when requested; otherwise the
/// caller's order is preserved. Deduplication is the caller's job.
pub fn ordered_candidates(candidates: &[String], config: &SelectConfig) -> Vec<String> {
    let mut ordered = candidates.to_vec();
    if config.sort {
        ordered.sort();
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ordered_candidates_sorts_when_requested() {
        let config = SelectConfig {
            sort: true,
            ..Default::default()
        };
        assert_eq!(
            ordered_candidates(&names(&["web-2", "api-1", "web-1"]), &config),
            names(&["api-1", "web-1", "web-2"])
        );
    }

    #[test]
    fn test_ordered_candidates_preserves_order() {
        let config = SelectConfig::default();
        assert_eq!(
            ordered_candidates(&names(&["web-2", "api-1"]), &config),
            names(&["web-2", "api-1"])
        );
    }

    #[test]
    fn test_builders_do_not_touch_other_fields() {
        let base = SelectConfig {
            exact: true,
            sort: true,
            height: Some("40%".to_string()),
            ..Default::default()
        };
        let step = base.clone().with_prompt("pod> ").with_query("web");
        assert!(step.exact);
        assert!(step.sort);
        assert_eq!(step.height, base.height);
        assert_eq!(step.prompt, "pod> ");
        assert_eq!(step.query, "web");
        assert!(base.prompt.is_empty());
    }
}
