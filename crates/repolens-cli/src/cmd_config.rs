use crate::context::{runtime, Context};
use anyhow::{bail, Result};
use clap::Subcommand;
use repolens_store::settings::{read_config_map, write_config_map};
use repolens_store::Settings;
use serde_json::Value;
use std::path::Path;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. api_base_url, poll_interval_secs)
        key: String,
        /// Config value (true/false/number/string)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Check that the analysis service is reachable
    Check,
}

/// Keys read by the client. Other keys are kept but ignored.
const KNOWN_KEYS: &[&str] = &[
    "api_base_url",
    "poll_interval_secs",
    "max_attempts",
    "phase_interval_secs",
    "request_timeout_secs",
];

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, api: Option<&str>) -> Result<()> {
    let path = repolens_store::config_path();
    match cmd {
        ConfigCmd::Set { key, value } => set(&path, &key, &value),
        ConfigCmd::Get { key } => get(&path, &key),
        ConfigCmd::List => list(&path),
        ConfigCmd::Check => check(api),
    }
}

// ── Command Implementations ──

/// Parse a string value into an appropriate JSON value (bool/number/string).
fn parse_value(s: &str) -> Value {
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                Value::Number(n.into())
            } else if let Ok(f) = s.parse::<f64>() {
                serde_json::json!(f)
            } else {
                Value::String(s.to_string())
            }
        }
    }
}

/// `repolens config set <key> <value>`
fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let parsed = parse_value(value);
    if KNOWN_KEYS.contains(&key) {
        let mut candidate = serde_json::Map::new();
        candidate.insert(key.to_string(), parsed.clone());
        if let Err(e) = serde_json::from_value::<Settings>(Value::Object(candidate)) {
            bail!("invalid value for {key}: {e}");
        }
    } else {
        eprintln!("note: {key} is not a setting repolens reads");
    }
    let mut config = read_config_map(path)?;
    config.insert(key.to_string(), parsed);
    write_config_map(path, &config)?;
    println!("{key} = {value}");
    Ok(())
}

/// `repolens config get <key>`
fn get(path: &Path, key: &str) -> Result<()> {
    let config = read_config_map(path)?;
    match config.get(key) {
        Some(val) => println!("{val}"),
        None => println!("(not set)"),
    }
    Ok(())
}

/// `repolens config list`
fn list(path: &Path) -> Result<()> {
    let config = read_config_map(path)?;
    if config.is_empty() {
        println!("(no config set; using defaults)");
    } else {
        for (k, v) in &config {
            println!("{k} = {v}");
        }
    }
    println!("config file: {}", path.display());
    Ok(())
}

/// `repolens config check`
fn check(api: Option<&str>) -> Result<()> {
    let ctx = Context::load(api);
    let service = ctx.service();
    let rt = runtime()?;
    match rt.block_on(service.health()) {
        Ok(health) => {
            println!(
                "{}: {}{}",
                ctx.settings.api_base_url,
                health.status,
                health
                    .version
                    .map(|v| format!(" (version {v})"))
                    .unwrap_or_default()
            );
            if let Some(msg) = health.message {
                println!("  {msg}");
            }
            Ok(())
        }
        Err(e) => bail!("{} is not reachable: {e}", ctx.settings.api_base_url),
    }
}
