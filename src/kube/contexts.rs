//! Kubeconfig context discovery
//!
//! Reads the available contexts, picks the active context and namespace, and
//! expands context patterns (exact names, `*`/`?` globs, comma-separated
//! lists) for the fan-out command.

use anyhow::{Context, Result, anyhow};
use kube::config::Kubeconfig;

/// Load the merged kubeconfig (KUBECONFIG or ~/.kube/config)
pub fn load_kubeconfig() -> Result<Kubeconfig> {
    Kubeconfig::read().context("Failed to read kubeconfig")
}

/// All context names in kubeconfig order
pub fn list_contexts(kubeconfig: &Kubeconfig) -> Vec<String> {
    kubeconfig
        .contexts
        .iter()
        .map(|named| named.name.clone())
        .collect()
}

/// The explicit context if given, otherwise `current-context`
pub fn determine_context(kubeconfig: &Kubeconfig, explicit: Option<&str>) -> Result<String> {
    if let Some(name) = explicit {
        if !kubeconfig.contexts.iter().any(|named| named.name == name) {
            return Err(anyhow!("Context '{}' not found in kubeconfig", name));
        }
        return Ok(name.to_string());
    }

    kubeconfig
        .current_context
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("No current context set in kubeconfig; pass --context"))
}

/// Namespace precedence: explicit flag, configured default, the context's
/// own namespace, then "default"
pub fn determine_namespace(
    kubeconfig: &Kubeconfig,
    context: &str,
    explicit: Option<&str>,
    configured_default: &str,
) -> String {
    if let Some(ns) = explicit.filter(|ns| !ns.is_empty()) {
        return ns.to_string();
    }
    if !configured_default.is_empty() {
        return configured_default.to_string();
    }

    kubeconfig
        .contexts
        .iter()
        .find(|named| named.name == context)
        .and_then(|named| named.context.as_ref())
        .and_then(|ctx| ctx.namespace.clone())
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

/// Resolves context patterns to concrete context names
///
/// Supports:
/// - Exact names: "prod"
/// - Globs: "prod-*", "staging-?"
/// - Comma-separated lists mixing both: "prod-*, staging-01"
pub struct ContextMatcher<'a> {
    available: &'a [String],
}

impl<'a> ContextMatcher<'a> {
    pub fn new(available: &'a [String]) -> Self {
        Self { available }
    }

    /// Matches keep first-seen order with duplicates dropped.
    /// Fails on an unknown exact name or when nothing matched.
    pub fn resolve(&self, pattern: &str) -> Result<Vec<String>> {
        let mut matched: Vec<String> = Vec::new();

        for entry in pattern.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry.contains(['*', '?']) {
                for ctx in self.available {
                    if glob_match(entry, ctx) && !matched.contains(ctx) {
                        matched.push(ctx.clone());
                    }
                }
            } else if self.available.iter().any(|ctx| ctx == entry) {
                if !matched.iter().any(|ctx| ctx == entry) {
                    matched.push(entry.to_string());
                }
            } else {
                return Err(anyhow!("Context '{}' not found", entry));
            }
        }

        if matched.is_empty() {
            return Err(anyhow!("No contexts matched pattern '{}'", pattern));
        }
        Ok(matched)
    }
}

/// `*` matches any run of characters, `?` exactly one
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, from)) => {
                    p = star + 1;
                    t = from + 1;
                    backtrack = Some((star, from + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
