//! Per-context command invocation

use std::fmt;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use super::OutputFormat;

/// One command bound to one context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub context: String,
    pub namespace: Option<String>,
    pub args: Vec<String>,
    pub format: OutputFormat,
}

impl Invocation {
    /// Arguments passed to `program`: context and namespace flags, the user's
    /// arguments, then `-o <format>` for structured formats
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec!["--context".to_string(), self.context.clone()];
        if let Some(ns) = &self.namespace {
            argv.push("--namespace".to_string());
            argv.push(ns.clone());
        }
        argv.extend(self.args.iter().cloned());
        if self.format != OutputFormat::Raw {
            argv.push("-o".to_string());
            argv.push(self.format.to_string());
        }
        argv
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.argv().join(" "))
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// None when the process was killed by a signal
    pub exit: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

/// Executes invocations; the fan-out never spawns processes itself
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Err means the command could not be run at all
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs invocations as local processes
///
/// Dropping the returned future kills the child, which is how cancellation
/// reaches in-flight commands.
#[derive(Debug, Default, Clone)]
pub struct KubectlRunner;

#[async_trait]
impl CommandRunner for KubectlRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        tracing::debug!("Running {}", invocation);

        let output = Command::new(&invocation.program)
            .args(invocation.argv())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", invocation.program))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            exit: output.status.code(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(namespace: Option<&str>, format: OutputFormat) -> Invocation {
        Invocation {
            program: "kubectl".to_string(),
            context: "prod".to_string(),
            namespace: namespace.map(str::to_string),
            args: vec!["get".to_string(), "pods".to_string()],
            format,
        }
    }

    #[test]
    fn test_argv_raw() {
        let inv = invocation(Some("shop"), OutputFormat::Raw);
        assert_eq!(
            inv.argv(),
            vec!["--context", "prod", "--namespace", "shop", "get", "pods"]
        );
        assert_eq!(
            inv.to_string(),
            "kubectl --context prod --namespace shop get pods"
        );
    }

    #[test]
    fn test_argv_structured() {
        let inv = invocation(None, OutputFormat::Yaml);
        assert_eq!(inv.argv(), vec!["--context", "prod", "get", "pods", "-o", "yaml"]);
    }

    #[tokio::test]
    async fn test_kubectl_runner_captures_output() {
        let mut inv = invocation(None, OutputFormat::Raw);
        inv.program = "echo".to_string();
        let output = KubectlRunner.run(&inv).await.unwrap();
        assert!(output.success);
        assert_eq!(output.exit, Some(0));
        assert_eq!(output.output, "--context prod get pods\n");
    }

    #[tokio::test]
    async fn test_kubectl_runner_reports_failure() {
        let mut inv = invocation(None, OutputFormat::Raw);
        inv.program = "false".to_string();
        let output = KubectlRunner.run(&inv).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.exit, Some(1));
    }

    #[tokio::test]
    async fn test_kubectl_runner_missing_program() {
        let mut inv = invocation(None, OutputFormat::Raw);
        inv.program = "kubepick-no-such-kubectl".to_string();
        assert!(KubectlRunner.run(&inv).await.is_err());
    }
}
