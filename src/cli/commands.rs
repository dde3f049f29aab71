//! Command handlers
//!
//! Each handler resolves what the operator typed through the
//! [`ResolutionService`] and then prints the result or hands off to kubectl
//! with inherited stdio.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::fanout::{FanoutExecutor, KubectlRunner, OutputFormat, render};
use crate::kube::{
    ContextMatcher, KubeLister, contexts, create_client, determine_context, determine_namespace,
    list_contexts,
};
use crate::models::ResourceObject;
use crate::select::{FzfSelector, SelectConfig, Selector};
use crate::services::ResolutionService;
use crate::trace::render_tree;

/// Flags shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub all_namespaces: bool,
}

/// A connection to one context plus everything needed to resolve targets in it
pub struct ClusterScope {
    pub context: String,
    /// None when resolving across all namespaces
    pub namespace: Option<String>,
    pub kubectl: String,
    pub select: SelectConfig,
    pub service: ResolutionService,
}

impl ClusterScope {
    pub async fn connect(options: &GlobalOptions, config: &Config) -> Result<Self> {
        let kubeconfig = contexts::load_kubeconfig()?;
        let context = determine_context(&kubeconfig, options.context.as_deref())?;
        let namespace = if options.all_namespaces {
            None
        } else {
            Some(determine_namespace(
                &kubeconfig,
                &context,
                options.namespace.as_deref(),
                &config.default_namespace,
            ))
        };

        tracing::debug!(
            "Using context {} and namespace {}",
            context,
            namespace.as_deref().unwrap_or("<all>")
        );

        let client = create_client(Some(&context)).await?;
        let service = ResolutionService::new(
            Arc::new(KubeLister::new(client)),
            Arc::new(FzfSelector::new(config.selector.command.clone())),
        );

        Ok(Self {
            context,
            namespace,
            kubectl: config.kubectl.clone(),
            select: SelectConfig::from_settings(&config.selector),
            service,
        })
    }

    async fn resolve(&self, target: &[String]) -> Result<ResourceObject> {
        let target = self.service.parse_target(&target.join(" "));
        self.service
            .resolve_resource(&target.kind, &target.name, self.namespace.as_deref(), &self.select)
            .await
            .with_context(|| format!("Failed to resolve '{}'", target))
    }

    async fn resolve_pod(&self, target: &[String]) -> Result<ResourceObject> {
        let target = self.service.parse_target(&target.join(" "));
        let kind = if target.kind.is_empty() {
            "pod"
        } else {
            target.kind.as_str()
        };
        self.service
            .resolve_pod(kind, &target.name, self.namespace.as_deref(), &self.select)
            .await
            .with_context(|| format!("Failed to resolve a pod for '{}'", target))
    }

    /// kubectl arguments binding the context and the object's namespace
    fn kubectl_args(&self, object: &ResourceObject) -> Vec<String> {
        let mut args = vec!["--context".to_string(), self.context.clone()];
        if !object.namespace.is_empty() {
            args.push("--namespace".to_string());
            args.push(object.namespace.clone());
        }
        args
    }
}

/// Print `namespace/kind/name` of the resolved resource
pub async fn handle_resolve(scope: &ClusterScope, target: &[String]) -> Result<()> {
    let object = scope.resolve(target).await?;
    println!("{}", object.display_path());
    Ok(())
}

/// Print the name of the resolved pod
pub async fn handle_pod(scope: &ClusterScope, target: &[String]) -> Result<()> {
    let pod = scope.resolve_pod(target).await?;
    println!("{}", pod.name);
    Ok(())
}

pub async fn handle_exec(
    scope: &ClusterScope,
    target: &[String],
    container: Option<&str>,
    command: &[String],
) -> Result<()> {
    let pod = scope.resolve_pod(target).await?;

    let mut args = scope.kubectl_args(&pod);
    args.push("exec".to_string());
    args.push("-i".to_string());
    if std::io::stdin().is_terminal() {
        args.push("-t".to_string());
    }
    args.push(pod.name.clone());
    if let Some(container) = container {
        args.push("-c".to_string());
        args.push(container.to_string());
    }
    args.push("--".to_string());
    args.extend(command.iter().cloned());

    handoff(&scope.kubectl, &args).await
}

pub async fn handle_logs(
    scope: &ClusterScope,
    target: &[String],
    follow: bool,
    container: Option<&str>,
) -> Result<()> {
    let pod = scope.resolve_pod(target).await?;

    let mut args = scope.kubectl_args(&pod);
    args.push("logs".to_string());
    args.push(pod.name.clone());
    if follow {
        args.push("-f".to_string());
    }
    if let Some(container) = container {
        args.push("-c".to_string());
        args.push(container.to_string());
    }

    handoff(&scope.kubectl, &args).await
}

pub async fn handle_describe(scope: &ClusterScope, target: &[String]) -> Result<()> {
    let object = scope.resolve(target).await?;

    let mut args = scope.kubectl_args(&object);
    args.push("describe".to_string());
    args.push(object.kind.to_lowercase());
    args.push(object.name.clone());

    handoff(&scope.kubectl, &args).await
}

/// Print the ownership tree of the resolved resource
pub async fn handle_owners(scope: &ClusterScope, target: &[String]) -> Result<()> {
    let object = scope.resolve(target).await?;
    let tree = scope
        .service
        .build_ownership_graph(&object, &object.kind)
        .await;
    println!("{}", render_tree(&tree));
    Ok(())
}

/// Interactively pick a namespace and print it
pub async fn handle_ns(scope: &ClusterScope) -> Result<()> {
    let namespaces = scope
        .service
        .lister()
        .list("namespace", None)
        .await
        .context("Failed to list namespaces")?;
    let names: Vec<String> = namespaces.into_iter().map(|ns| ns.name).collect();

    let config = scope.select.clone().with_prompt("Select namespace> ");
    let chosen = pick_one(scope.service.selector(), &names, &config).await?;
    println!("{}", chosen);
    Ok(())
}

/// Interactively pick a context and print it
pub async fn handle_ctx(config: &Config) -> Result<()> {
    let kubeconfig = contexts::load_kubeconfig()?;
    let names = list_contexts(&kubeconfig);

    let selector = FzfSelector::new(config.selector.command.clone());
    let select = SelectConfig::from_settings(&config.selector).with_prompt("Select context> ");
    let chosen = pick_one(&selector, &names, &select).await?;
    println!("{}", chosen);
    Ok(())
}

/// How `run` picks its contexts
#[derive(Debug, Clone)]
pub enum ContextSelection {
    All,
    Pattern(String),
    Pick,
}

/// Run kubectl across contexts and print the aggregated results
///
/// Contexts come from `selection`, so the single-context `--context` and
/// `--all-namespaces` flags are rejected; `-n` is passed to every invocation.
pub async fn handle_run(
    options: &GlobalOptions,
    config: &Config,
    selection: ContextSelection,
    format: Option<&str>,
    args: &[String],
) -> Result<()> {
    let format = format.unwrap_or(config.fanout.format.as_str());
    // Reject bad flags before prompting for anything
    let output_format: OutputFormat = format.parse()?;
    check_run_options(options)?;

    let kubeconfig = contexts::load_kubeconfig()?;
    let available = list_contexts(&kubeconfig);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling fan-out");
            on_interrupt.cancel();
        }
    });

    let targets = match selection {
        ContextSelection::All => available,
        ContextSelection::Pattern(pattern) => ContextMatcher::new(&available).resolve(&pattern)?,
        ContextSelection::Pick => pick_contexts(config, &available, cancel.clone()).await?,
    };

    if targets.is_empty() {
        interrupt.abort();
        return Err(anyhow!("No contexts to run against"));
    }

    let executor = FanoutExecutor::new(Arc::new(KubectlRunner))
        .with_program(config.kubectl.clone())
        .with_namespace(options.namespace.clone())
        .with_max_concurrency(config.fanout.max_concurrency)
        .with_cancellation(cancel);

    let results = executor.run(&targets, args, format).await;
    interrupt.abort();

    let color = std::io::stdout().is_terminal();
    print!("{}", render(&results?, output_format, color)?);
    Ok(())
}

fn check_run_options(options: &GlobalOptions) -> Result<()> {
    if let Some(context) = &options.context {
        return Err(anyhow!(
            "run does not take --context ({}); use --contexts or --pick",
            context
        ));
    }
    if options.all_namespaces {
        return Err(anyhow!("run does not take --all-namespaces; pass -A after -- to kubectl"));
    }
    Ok(())
}

/// Multi-select contexts; firing `cancel` kills the selector
async fn pick_contexts(
    config: &Config,
    available: &[String],
    cancel: CancellationToken,
) -> Result<Vec<String>> {
    let selector = FzfSelector::new(config.selector.command.clone()).with_cancellation(cancel);
    let select = SelectConfig::from_settings(&config.selector)
        .with_prompt("Select contexts> ")
        .with_multi(true);
    selector
        .select(available, &select)
        .await
        .context("Failed to select contexts")
}

async fn pick_one(selector: &dyn Selector, candidates: &[String], config: &SelectConfig) -> Result<String> {
    if candidates.is_empty() {
        return Err(anyhow!("Nothing to select from"));
    }
    selector
        .select(candidates, &config.clone().with_multi(false))
        .await
        .context("Selection failed")?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Nothing was selected"))
}

async fn handoff(kubectl: &str, args: &[String]) -> Result<()> {
    tracing::debug!("Handing off to {} {}", kubectl, args.join(" "));
    let status = Command::new(kubectl)
        .args(args)
        .status()
        .await
        .with_context(|| format!("Failed to run {}", kubectl))?;

    if !status.success() {
        return Err(anyhow!("{} exited with {}", kubectl, status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::SelectError;

    #[test]
    fn test_run_rejects_single_context_flags() {
        let with_context = GlobalOptions {
            context: Some("prod".to_string()),
            ..Default::default()
        };
        let err = check_run_options(&with_context).unwrap_err();
        assert!(err.to_string().contains("--contexts"));

        let all_namespaces = GlobalOptions {
            all_namespaces: true,
            ..Default::default()
        };
        assert!(check_run_options(&all_namespaces).is_err());

        let namespaced = GlobalOptions {
            namespace: Some("shop".to_string()),
            ..Default::default()
        };
        assert!(check_run_options(&namespaced).is_ok());
    }

    #[tokio::test]
    async fn test_interrupt_cancels_context_picker() {
        let mut config = Config::default();
        config.selector.command = "cat".to_string();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pick_contexts(&config, &["dev".to_string(), "prod".to_string()], cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SelectError>(),
            Some(SelectError::Cancelled)
        ));
    }
}
