//! Target parsing
//!
//! Turns what the operator typed (`deploy/nginx`, `deploy nginx`, `po`) into a
//! canonical kind and a name pattern.

use std::fmt;

use crate::models::expand_shortname;

/// A parsed `kind[/ ]name` target
///
/// An empty `name` asks the resolver to offer every candidate of `kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub kind: String,
    pub name: String,
}

impl Target {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}/{}", self.kind, self.name)
        }
    }
}

/// Parse a raw target string
///
/// Splits on the first `/`, or failing that on the first whitespace, so names
/// may themselves contain `/`. Only the kind goes through shorthand expansion.
/// Never fails.
pub fn parse_target(raw: &str) -> Target {
    let trimmed = raw.trim();
    let (kind, name) = match trimmed.split_once('/') {
        Some(parts) => parts,
        None => trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, "")),
    };

    let kind = kind.trim();
    Target {
        kind: if kind.is_empty() {
            String::new()
        } else {
            expand_shortname(kind)
        },
        name: name.trim().to_string(),
    }
}
