//! Result classification and rendering

use std::fmt;
use std::str::FromStr;

use crossterm::style::Stylize;
use serde::Serialize;
use serde_json::Value;

use super::{CommandOutput, FanoutError, Invocation};

/// Output encodings accepted by the fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Raw,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Raw => "raw",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FanoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(FanoutError::InvalidFormat(s.to_string())),
        }
    }
}

/// Outcome of one context's invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextResult {
    pub context: String,
    /// The command line that was run, for display
    pub invocation: String,
    /// Decoded document for structured formats, a string otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContextResult {
    pub fn failed(invocation: &Invocation, error: impl Into<String>) -> Self {
        Self {
            context: invocation.context.clone(),
            invocation: invocation.to_string(),
            output: None,
            error: Some(error.into()),
        }
    }

    /// Classify a finished command
    ///
    /// Failures keep their trimmed output next to the error. Successful raw
    /// output is stored as a string; structured output is decoded and falls
    /// back to the string when it does not parse.
    pub fn from_output(invocation: &Invocation, result: anyhow::Result<CommandOutput>) -> Self {
        let command = match result {
            Ok(command) => command,
            Err(e) => return Self::failed(invocation, format!("{:#}", e)),
        };

        let trimmed = command.output.trim();
        if !command.success {
            let error = match command.exit {
                Some(code) => format!("command exited with status {}", code),
                None => "command was terminated by a signal".to_string(),
            };
            return Self {
                output: (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string())),
                ..Self::failed(invocation, error)
            };
        }

        let output = match invocation.format {
            OutputFormat::Raw => Value::String(trimmed.to_string()),
            OutputFormat::Json => serde_json::from_str::<Value>(trimmed)
                .unwrap_or_else(|_| Value::String(trimmed.to_string())),
            OutputFormat::Yaml => serde_yaml::from_str::<Value>(trimmed)
                .unwrap_or_else(|_| Value::String(trimmed.to_string())),
        };

        Self {
            context: invocation.context.clone(),
            invocation: invocation.to_string(),
            output: Some(output),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListEnvelope<'a> {
    api_version: &'static str,
    kind: &'static str,
    items: &'a [ContextResult],
}

/// Render results in the requested format
pub fn render(
    results: &[ContextResult],
    format: OutputFormat,
    color: bool,
) -> Result<String, FanoutError> {
    match format {
        OutputFormat::Raw => Ok(render_raw(results, color)),
        structured => render_structured(results, structured),
    }
}

/// Wrap results in a `List` envelope and encode as JSON or YAML
///
/// Raw is encoded as JSON here; use [`render_raw`] for line output.
pub fn render_structured(
    results: &[ContextResult],
    format: OutputFormat,
) -> Result<String, FanoutError> {
    let envelope = ListEnvelope {
        api_version: "v1",
        kind: "List",
        items: results,
    };

    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&envelope)?),
        OutputFormat::Json | OutputFormat::Raw => {
            let mut encoded = serde_json::to_string_pretty(&envelope)?;
            encoded.push('\n');
            Ok(encoded)
        }
    }
}

/// Line-oriented rendering: a `context:` header, the error if any, then every
/// output line indented by two spaces
pub fn render_raw(results: &[ContextResult], color: bool) -> String {
    let mut out = String::new();

    for result in results {
        let header = format!("{}:", result.context);
        if color {
            out.push_str(&format!("{}\n", header.bold().cyan()));
        } else {
            out.push_str(&header);
            out.push('\n');
        }

        if let Some(error) = &result.error {
            let line = format!("  error: {}", error);
            if color {
                out.push_str(&format!("{}\n", line.red()));
            } else {
                out.push_str(&line);
                out.push('\n');
            }
        }

        let text = match &result.output {
            Some(Value::String(s)) => s.clone(),
            Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            None => String::new(),
        };
        for line in text.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invocation(format: OutputFormat) -> Invocation {
        Invocation {
            program: "kubectl".to_string(),
            context: "prod".to_string(),
            namespace: None,
            args: vec!["get".to_string(), "ns".to_string()],
            format,
        }
    }

    fn ok(output: &str) -> anyhow::Result<CommandOutput> {
        Ok(CommandOutput {
            success: true,
            exit: Some(0),
            output: output.to_string(),
        })
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("YAML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("raw".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
        assert!(matches!(
            "table".parse::<OutputFormat>(),
            Err(FanoutError::InvalidFormat(f)) if f == "table"
        ));
    }

    #[test]
    fn test_classify_raw_success() {
        let result = ContextResult::from_output(&invocation(OutputFormat::Raw), ok("  ok \n"));
        assert_eq!(result.output, Some(Value::String("ok".to_string())));
        assert!(result.is_success());
    }

    #[test]
    fn test_classify_json_decodes_and_falls_back() {
        let inv = invocation(OutputFormat::Json);
        let decoded = ContextResult::from_output(&inv, ok(r#"{"kind": "NamespaceList"}"#));
        assert_eq!(decoded.output, Some(json!({"kind": "NamespaceList"})));

        let fallback = ContextResult::from_output(&inv, ok("not json"));
        assert_eq!(fallback.output, Some(Value::String("not json".to_string())));
    }

    #[test]
    fn test_classify_yaml() {
        let inv = invocation(OutputFormat::Yaml);
        let decoded = ContextResult::from_output(&inv, ok("kind: List\nitems: []\n"));
        assert_eq!(decoded.output, Some(json!({"kind": "List", "items": []})));
    }

    #[test]
    fn test_classify_failure_keeps_output() {
        let inv = invocation(OutputFormat::Json);
        let result = ContextResult::from_output(
            &inv,
            Ok(CommandOutput {
                success: false,
                exit: Some(1),
                output: "error: Unauthorized\n".to_string(),
            }),
        );
        assert_eq!(result.error.as_deref(), Some("command exited with status 1"));
        assert_eq!(
            result.output,
            Some(Value::String("error: Unauthorized".to_string()))
        );

        let spawn = ContextResult::from_output(&inv, Err(anyhow::anyhow!("kubectl not found")));
        assert_eq!(spawn.error.as_deref(), Some("kubectl not found"));
        assert_eq!(spawn.output, None);
        assert_eq!(spawn.invocation, "kubectl --context prod get ns -o json");
    }

    #[test]
    fn test_render_raw_plain() {
        let results = vec![
            ContextResult {
                context: "a".to_string(),
                invocation: String::new(),
                output: Some(Value::String("line 1\nline 2".to_string())),
                error: None,
            },
            ContextResult {
                context: "b".to_string(),
                invocation: String::new(),
                output: None,
                error: Some("timeout".to_string()),
            },
        ];
        assert_eq!(
            render_raw(&results, false),
            "a:\n  line 1\n  line 2\nb:\n  error: timeout\n"
        );
    }

    #[test]
    fn test_render_structured_envelope() {
        let results = vec![ContextResult {
            context: "a".to_string(),
            invocation: "kubectl --context a version".to_string(),
            output: Some(json!({"major": "1"})),
            error: None,
        }];

        let encoded = render_structured(&results, OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            parsed,
            json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": [{
                    "context": "a",
                    "invocation": "kubectl --context a version",
                    "output": {"major": "1"}
                }]
            })
        );

        let yaml = render_structured(&results, OutputFormat::Yaml).unwrap();
        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["items"][0]["context"], "a");
    }
}
