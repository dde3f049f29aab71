//! Bounded concurrent execution across contexts

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

use super::{
    CommandRunner, ContextResult, DEFAULT_MAX_CONCURRENCY, FanoutError, Invocation, OutputFormat,
};

/// Runs one invocation per context
///
/// At most `max_concurrency` invocations are in flight. Each context gets its
/// own task; results come back over a channel sized to the context count and
/// are sorted by context name once all tasks are done. Once the cancellation
/// token fires, running commands are killed and contexts that had not started
/// are reported as cancelled; results already collected are kept.
pub struct FanoutExecutor {
    runner: Arc<dyn CommandRunner>,
    program: String,
    namespace: Option<String>,
    max_concurrency: usize,
    cancel: CancellationToken,
}

impl FanoutExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            program: "kubectl".to_string(),
            namespace: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Namespace passed to every context's invocation
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Values below 1 are treated as 1
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run `args` against every context
    ///
    /// `format` is validated before anything runs. The returned vector holds
    /// exactly one result per context, sorted by context name.
    pub async fn run(
        &self,
        contexts: &[String],
        args: &[String],
        format: &str,
    ) -> Result<Vec<ContextResult>, FanoutError> {
        let format: OutputFormat = format.parse()?;
        if contexts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Fanning out to {} contexts (max {} in flight)",
            contexts.len(),
            self.max_concurrency
        );

        let gate = Arc::new(Semaphore::new(self.max_concurrency));
        let (tx, mut rx) = mpsc::channel(contexts.len());

        for context in contexts {
            let invocation = Invocation {
                program: self.program.clone(),
                context: context.clone(),
                namespace: self.namespace.clone(),
                args: args.to_vec(),
                format,
            };
            let runner = Arc::clone(&self.runner);
            let gate = Arc::clone(&gate);
            let cancel = self.cancel.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let result = run_context(runner, gate, cancel, invocation).await;
                // The receiver outlives every sender
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(contexts.len());
        while let Some(result) = rx.recv().await {
            results.push(result);
        }

        // A task that panicked sent nothing; report its context anyway
        let reported: HashSet<String> = results.iter().map(|r| r.context.clone()).collect();
        for context in contexts {
            if !reported.contains(context) {
                tracing::warn!("No result from context {}", context);
                let invocation = Invocation {
                    program: self.program.clone(),
                    context: context.clone(),
                    namespace: self.namespace.clone(),
                    args: args.to_vec(),
                    format,
                };
                results.push(ContextResult::failed(&invocation, "worker exited unexpectedly"));
            }
        }

        results.sort_by(|a, b| a.context.cmp(&b.context));

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            "Fan-out finished: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );
        Ok(results)
    }
}

async fn run_context(
    runner: Arc<dyn CommandRunner>,
    gate: Arc<Semaphore>,
    cancel: CancellationToken,
    invocation: Invocation,
) -> ContextResult {
    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ContextResult::failed(&invocation, "cancelled"),
        permit = gate.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return ContextResult::failed(&invocation, "cancelled"),
        },
    };

    // Dropping the run future on cancellation kills the child process
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ContextResult::failed(&invocation, "cancelled"),
        outcome = runner.run(&invocation) => outcome,
    };

    let result = ContextResult::from_output(&invocation, outcome);
    if let Some(error) = &result.error {
        tracing::warn!("Context {} failed: {}", invocation.context, error);
    }
    result
}
