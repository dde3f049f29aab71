//! Multi-context fan-out
//!
//! Runs one kubectl invocation per context with bounded parallelism and
//! collects exactly one [`ContextResult`] per context, sorted by context
//! name. A failing context is recorded next to the others and never stops
//! them; only an unknown output format is fatal, and it is rejected before
//! any command runs.

mod executor;
mod output;
mod runner;

pub use executor::FanoutExecutor;
pub use output::{ContextResult, OutputFormat, render, render_raw, render_structured};
pub use runner::{CommandOutput, CommandRunner, Invocation, KubectlRunner};

/// In-flight invocations when nothing else is configured
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Fan-out errors
#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    #[error("unknown output format '{0}', expected one of: json, yaml, raw")]
    InvalidFormat(String),

    #[error("failed to encode results as JSON")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode results as YAML")]
    Yaml(#[from] serde_yaml::Error),
}
