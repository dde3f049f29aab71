//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod config;
mod logging;
mod version;

pub use commands::{
    ClusterScope, ContextSelection, GlobalOptions, handle_ctx, handle_describe, handle_exec,
    handle_logs, handle_ns, handle_owners, handle_pod, handle_resolve, handle_run,
};
pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use version::display_version;
