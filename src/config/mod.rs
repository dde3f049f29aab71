//! Configuration system for kubepick
//!
//! A single YAML file with built-in defaults and environment overrides,
//! plus dot-notation get/set helpers for the `config` subcommand.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, FanoutConfig, SelectorConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "kubectl" => Ok(config.kubectl.clone()),
        "defaultNamespace" => Ok(config.default_namespace.clone()),
        "selector.command" => Ok(config.selector.command.clone()),
        "selector.exact" => Ok(config.selector.exact.to_string()),
        "selector.sort" => Ok(config.selector.sort.to_string()),
        "selector.height" => Ok(config.selector.height.clone().unwrap_or_default()),
        "selector.preview" => Ok(config.selector.preview.clone().unwrap_or_default()),
        "fanout.maxConcurrency" => Ok(config.fanout.max_concurrency.to_string()),
        "fanout.format" => Ok(config.fanout.format.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "kubectl" => {
            config.kubectl = value.to_string();
        }
        "defaultNamespace" => {
            config.default_namespace = value.to_string();
        }
        "selector.command" => {
            config.selector.command = value.to_string();
        }
        "selector.exact" => {
            config.selector.exact = value
                .parse()
                .context("selector.exact must be 'true' or 'false'")?;
        }
        "selector.sort" => {
            config.selector.sort = value
                .parse()
                .context("selector.sort must be 'true' or 'false'")?;
        }
        "selector.height" => {
            config.selector.height = optional(value);
        }
        "selector.preview" => {
            config.selector.preview = optional(value);
        }
        "fanout.maxConcurrency" => {
            let max: usize = value
                .parse()
                .context("fanout.maxConcurrency must be a number")?;
            if max == 0 {
                return Err(anyhow::anyhow!("fanout.maxConcurrency must be at least 1"));
            }
            config.fanout.max_concurrency = max;
        }
        "fanout.format" => {
            value
                .parse::<crate::fanout::OutputFormat>()
                .context("fanout.format must be one of raw, json, yaml")?;
            config.fanout.format = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
