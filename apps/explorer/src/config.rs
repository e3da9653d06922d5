use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use ::config::{Config, Environment, File};
use explorer_core::{
    gemini::{DEFAULT_API_BASE_URL, DEFAULT_MODEL},
    prompts::DEFAULT_TEMPERATURE,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "explorer.toml";
const ENV_PREFIX: &str = "APP";
const BARE_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub temperature: f32,
    pub export_dir: PathBuf,
    pub log_filter: String,
    pub planner_by_default: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            temperature: DEFAULT_TEMPERATURE,
            export_dir: PathBuf::from("."),
            log_filter: "info".into(),
            planner_by_default: false,
        }
    }
}

pub fn load_settings(file: Option<&Path>) -> anyhow::Result<Settings> {
    let env: HashMap<String, String> = std::env::vars().collect();
    match file {
        Some(path) => settings_from(path, true, env),
        None => settings_from(Path::new(DEFAULT_CONFIG_FILE), false, env),
    }
}

/// Defaults, then the file, then `APP__*` variables, then the bare key
/// variables when no key was configured.
fn settings_from(
    file: &Path,
    required: bool,
    env: HashMap<String, String>,
) -> anyhow::Result<Settings> {
    let bare_key = BARE_KEY_VARS
        .iter()
        .find_map(|name| env.get(*name).filter(|value| !value.trim().is_empty()))
        .cloned();

    let mut settings: Settings = Config::builder()
        .add_source(File::from(file).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .source(Some(env)),
        )
        .build()
        .with_context(|| format!("failed to read settings from '{}'", file.display()))?
        .try_deserialize()
        .context("invalid explorer settings")?;

    settings.api_key = settings
        .api_key
        .filter(|key| !key.trim().is_empty())
        .or(bare_key);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
