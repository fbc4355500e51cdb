use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::view::DEFAULT_RECEIPT_MAX_WIDTH;
use serde::Deserialize;
use storage::DEFAULT_FILE_BASE_URL;

pub const DEFAULT_CONFIG_FILE: &str = "billed.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub file_base_url: String,
    pub receipt_max_width: u32,
    pub session_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/billed.db".into(),
            file_base_url: DEFAULT_FILE_BASE_URL.into(),
            receipt_max_width: DEFAULT_RECEIPT_MAX_WIDTH,
            session_file: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    file_base_url: Option<String>,
    receipt_max_width: Option<u32>,
    session_file: Option<PathBuf>,
}

/// Defaults, overlaid by the TOML file (when present) then by the environment.
pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if config_path.exists() {
        let raw = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config '{}'", config_path.display()))?;
        let file_cfg = toml::from_str::<FileSettings>(&raw)
            .with_context(|| format!("invalid config '{}'", config_path.display()))?;
        apply_file_settings(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.file_base_url {
        settings.file_base_url = v;
    }
    if let Some(v) = file_cfg.receipt_max_width {
        settings.receipt_max_width = v;
    }
    if file_cfg.session_file.is_some() {
        settings.session_file = file_cfg.session_file;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("BILLED_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__FILE_BASE_URL") {
        settings.file_base_url = v;
    }

    if let Some(v) = var("APP__RECEIPT_MAX_WIDTH") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.receipt_max_width = parsed,
            Err(_) => tracing::warn!("config: ignoring APP__RECEIPT_MAX_WIDTH={v}"),
        }
    }

    if let Some(v) = var("APP__SESSION_FILE") {
        settings.session_file = Some(PathBuf::from(v));
    }
}

pub fn prepare_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.replace('\\', "/");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
