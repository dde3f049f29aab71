//! fzf-backed selector
//!
//! Candidates go to the subprocess on stdin, one per line; the chosen lines
//! come back on stdout. The terminal UI is drawn by fzf itself, so stderr is
//! inherited.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::{SelectConfig, SelectError, Selector, ordered_candidates};

/// Selector that shells out to `fzf` (or a flag-compatible binary)
pub struct FzfSelector {
    command: String,
    cancel: CancellationToken,
}

impl FzfSelector {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Kill the subprocess and report `Cancelled` once `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub(crate) fn build_args(config: &SelectConfig) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(height) = &config.height {
            args.push(format!("--height={}", height));
        }
        if config.exact {
            args.push("--exact".to_string());
        }
        if config.multi {
            args.push("--multi".to_string());
        }
        if !config.prompt.is_empty() {
            args.push(format!("--prompt={}", config.prompt));
        }
        if !config.query.is_empty() {
            args.push(format!("--query={}", config.query));
        }
        if let Some(preview) = &config.preview {
            args.push(format!("--preview={}", preview));
        }
        args
    }
}

#[async_trait]
impl Selector for FzfSelector {
    async fn select(
        &self,
        candidates: &[String],
        config: &SelectConfig,
    ) -> Result<Vec<String>, SelectError> {
        if self.cancel.is_cancelled() {
            return Err(SelectError::Cancelled);
        }

        let ordered = ordered_candidates(candidates, config);
        let mut input = ordered.join("\n");
        input.push('\n');

        tracing::debug!(
            "Launching {} with {} candidates (prompt: {:?})",
            self.command,
            ordered.len(),
            config.prompt
        );

        let mut child = match Command::new(&self.command)
            .args(Self::build_args(config))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SelectError::NotInstalled(self.command.clone()));
            }
            Err(e) => {
                return Err(SelectError::SubprocessFailed(format!(
                    "failed to launch {}: {}",
                    self.command, e
                )));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).await.map_err(|e| {
                SelectError::SubprocessFailed(format!("failed to write candidates: {}", e))
            })?;
        }

        // Dropping the child on cancellation kills it (kill_on_drop)
        let output = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SelectError::Cancelled),
            output = child.wait_with_output() => output.map_err(|e| {
                SelectError::SubprocessFailed(format!("failed to wait for {}: {}", self.command, e))
            })?,
        };

        match output.status.code() {
            Some(0) => parse_selection(&String::from_utf8_lossy(&output.stdout), config.multi),
            Some(1) => Err(SelectError::NoSelection),
            Some(130) => Err(SelectError::Cancelled),
            Some(code) => Err(SelectError::SubprocessFailed(format!(
                "{} exited with status {}: {}",
                self.command,
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            None => Err(SelectError::SubprocessFailed(format!(
                "{} was terminated by a signal",
                self.command
            ))),
        }
    }
}

fn parse_selection(stdout: &str, multi: bool) -> Result<Vec<String>, SelectError> {
    let mut chosen: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if chosen.is_empty() {
        return Err(SelectError::NoSelection);
    }
    if !multi {
        chosen.truncate(1);
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_full() {
        let config = SelectConfig {
            exact: true,
            sort: true,
            multi: true,
            prompt: "pod> ".to_string(),
            query: "web".to_string(),
            preview: Some("kubectl describe pod {}".to_string()),
            height: Some("40%".to_string()),
        };
        assert_eq!(
            FzfSelector::build_args(&config),
            vec![
                "--height=40%",
                "--exact",
                "--multi",
                "--prompt=pod> ",
                "--query=web",
                "--preview=kubectl describe pod {}",
            ]
        );
    }

    #[test]
    fn test_build_args_minimal() {
        assert!(FzfSelector::build_args(&SelectConfig::default()).is_empty());
    }

    #[test]
    fn test_parse_selection_single() {
        let chosen = parse_selection("web-1\nweb-2\n", false).unwrap();
        assert_eq!(chosen, vec!["web-1"]);
    }

    #[test]
    fn test_parse_selection_multi() {
        let chosen = parse_selection("a-ctx\nb-ctx\n", true).unwrap();
        assert_eq!(chosen, vec!["a-ctx", "b-ctx"]);
    }

    #[test]
    fn test_parse_selection_empty_output() {
        assert!(matches!(
            parse_selection("\n", false),
            Err(SelectError::NoSelection)
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let selector = FzfSelector::new("kubepick-no-such-selector-binary");
        let err = selector
            .select(&["a".to_string()], &SelectConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::NotInstalled(_)));
    }

    #[tokio::test]
    async fn test_echoing_selector_round_trip() {
        // `cat` stands in for a selector that accepts every line it is offered
        let selector = FzfSelector::new("cat");
        let config = SelectConfig {
            sort: true,
            ..Default::default()
        };
        let candidates = vec!["web-2".to_string(), "web-1".to_string()];

        let chosen = selector.select(&candidates, &config).await.unwrap();
        assert_eq!(chosen, vec!["web-1"]);
    }

    #[tokio::test]
    async fn test_cancellation_before_selection() {
        let token = CancellationToken::new();
        token.cancel();
        let selector = FzfSelector::new("cat").with_cancellation(token);
        let err = selector
            .select(&["web-1".to_string()], &SelectConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SelectError::Cancelled));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation_kills_waiting_selector() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};

        // Stands in for an operator who never answers
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-selector");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 10\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let token = CancellationToken::new();
        let selector =
            FzfSelector::new(script.to_string_lossy().into_owned()).with_cancellation(token.clone());
        let candidates = vec!["web-1".to_string()];
        let config = SelectConfig::default();

        let started = Instant::now();
        let (result, _) = tokio::join!(selector.select(&candidates, &config), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            token.cancel();
        });

        assert!(matches!(result, Err(SelectError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
