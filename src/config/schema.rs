//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Binary invoked for per-context commands and pod hand-offs
    #[serde(default = "default_kubectl")]
    pub kubectl: String,

    /// Namespace used when neither `-n` nor the kubeconfig context names one
    #[serde(default)]
    pub default_namespace: String,

    /// Interactive selector configuration
    #[serde(default)]
    pub selector: SelectorConfig,

    /// Multi-context execution configuration
    #[serde(default)]
    pub fanout: FanoutConfig,
}

/// Interactive selector configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectorConfig {
    /// fzf-compatible binary
    #[serde(default = "default_selector_command")]
    pub command: String,

    /// Exact matching instead of fuzzy matching
    #[serde(default = "default_false")]
    pub exact: bool,

    /// Sort candidates before display
    #[serde(default = "default_true")]
    pub sort: bool,

    /// Display height (e.g. "40%")
    #[serde(default = "default_height")]
    pub height: Option<String>,

    /// Preview command template, `{}` is the highlighted line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Multi-context execution configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FanoutConfig {
    /// Maximum number of contexts contacted at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Default output format: raw, json or yaml
    #[serde(default = "default_format")]
    pub format: String,
}

// Default value functions
fn default_kubectl() -> String {
    "kubectl".to_string()
}

fn default_selector_command() -> String {
    "fzf".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_height() -> Option<String> {
    Some("40%".to_string())
}

fn default_max_concurrency() -> usize {
    crate::fanout::DEFAULT_MAX_CONCURRENCY
}

fn default_format() -> String {
    "raw".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kubectl: default_kubectl(),
            default_namespace: String::new(),
            selector: SelectorConfig::default(),
            fanout: FanoutConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            command: default_selector_command(),
            exact: default_false(),
            sort: default_true(),
            height: default_height(),
            preview: None,
        }
    }
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            format: default_format(),
        }
    }
}
