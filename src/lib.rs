//! kubepick library
//!
//! Target parsing, interactive resolution of resources and pods, ownership
//! trees and multi-context fan-out. The binary is a thin layer over these
//! modules; integration tests drive them directly with in-memory fakes.

pub mod cli;
pub mod config;
pub mod fanout;
pub mod kube;
pub mod models;
pub mod resolve;
pub mod select;
pub mod services;
pub mod target;
pub mod trace;

// Re-export commonly used types for convenience
pub use fanout::{ContextResult, FanoutExecutor, OutputFormat};
pub use models::{OwnerRef, ResourceKey, ResourceObject};
pub use resolve::ResolveError;
pub use select::{SelectConfig, SelectError, Selector};
pub use services::ResolutionService;
pub use target::{Target, parse_target};
pub use trace::{NodeStatus, OwnershipNode, render_tree};
