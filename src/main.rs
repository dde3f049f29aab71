//! kubepick - fuzzy target resolution, ownership trees and multi-context
//! fan-out for kubectl users

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kubepick::cli::{self, ClusterScope, ConfigSubcommand, ContextSelection, GlobalOptions};
use kubepick::config::ConfigLoader;

/// Resolve Kubernetes targets interactively and run kubectl across contexts
#[derive(Parser, Debug)]
#[command(name = "kubepick")]
#[command(about = "Fuzzy target resolution, ownership trees and multi-context fan-out for kubectl", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, global = true)]
    context: Option<String>,

    /// Namespace to resolve in
    #[arg(long, short = 'n', global = true)]
    namespace: Option<String>,

    /// Resolve across all namespaces
    #[arg(long = "all-namespaces", short = 'A', global = true, conflicts_with = "namespace")]
    all_namespaces: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a target and print namespace/kind/name
    Resolve {
        /// Target such as "deploy/nginx", "deploy nginx" or "po"
        target: Vec<String>,
    },
    /// Resolve a target down to one pod and print its name
    Pod { target: Vec<String> },
    /// Exec into the pod behind a target
    Exec {
        target: Vec<String>,
        /// Container name
        #[arg(long, short = 'c')]
        container: Option<String>,
        /// Command to run in the pod
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Show logs of the pod behind a target
    Logs {
        target: Vec<String>,
        /// Follow the log stream
        #[arg(long, short = 'f')]
        follow: bool,
        /// Container name
        #[arg(long, short = 'c')]
        container: Option<String>,
    },
    /// Describe the resource behind a target
    Describe { target: Vec<String> },
    /// Print the ownership tree of a target
    Owners { target: Vec<String> },
    /// Run a kubectl command across several contexts
    Run {
        /// Context names or globs, comma-separated (default: all contexts)
        #[arg(long, conflicts_with = "pick")]
        contexts: Option<String>,
        /// Choose contexts interactively
        #[arg(long)]
        pick: bool,
        /// Output format: raw, json or yaml
        #[arg(long, short = 'o')]
        output: Option<String>,
        /// kubectl arguments
        #[arg(last = true, required = true)]
        args: Vec<String>,
    },
    /// Pick a context interactively and print it
    Ctx,
    /// Pick a namespace interactively and print it
    Ns,
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug)?;
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    match args.command {
        Command::Config { subcommand } => return cli::handle_config_command(subcommand),
        Command::Version => {
            cli::display_version();
            return Ok(());
        }
        _ => {}
    }

    let config = ConfigLoader::load().context("Failed to load configuration")?;
    ConfigLoader::check(&config).context("Invalid configuration")?;
    tracing::debug!(
        "Configuration loaded: selector={}, kubectl={}",
        config.selector.command,
        config.kubectl
    );

    let options = GlobalOptions {
        context: args.context,
        namespace: args.namespace,
        all_namespaces: args.all_namespaces,
    };

    match args.command {
        Command::Ctx => return cli::handle_ctx(&config).await,
        Command::Run {
            contexts,
            pick,
            output,
            args: kubectl_args,
        } => {
            let selection = match (contexts, pick) {
                (_, true) => ContextSelection::Pick,
                (Some(pattern), false) => ContextSelection::Pattern(pattern),
                (None, false) => ContextSelection::All,
            };
            return cli::handle_run(&options, &config, selection, output.as_deref(), &kubectl_args)
                .await;
        }
        _ => {}
    }

    let scope = ClusterScope::connect(&options, &config).await?;

    match args.command {
        Command::Resolve { target } => cli::handle_resolve(&scope, &target).await,
        Command::Pod { target } => cli::handle_pod(&scope, &target).await,
        Command::Exec {
            target,
            container,
            command,
        } => cli::handle_exec(&scope, &target, container.as_deref(), &command).await,
        Command::Logs {
            target,
            follow,
            container,
        } => cli::handle_logs(&scope, &target, follow, container.as_deref()).await,
        Command::Describe { target } => cli::handle_describe(&scope, &target).await,
        Command::Owners { target } => cli::handle_owners(&scope, &target).await,
        Command::Ns => cli::handle_ns(&scope).await,
        Command::Run { .. } | Command::Ctx | Command::Config { .. } | Command::Version => Ok(()),
    }
}
