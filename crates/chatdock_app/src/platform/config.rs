use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chatdock_core::WidgetConfig;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "chatdock.ron";
const ENV_BACKEND_URL: &str = "CHATDOCK_BACKEND_URL";
const ENV_API_KEY: &str = "CHATDOCK_API_KEY";

/// Everything the terminal host reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub widget: WidgetConfig,
    /// Location reported to the backend as the page being viewed.
    pub page_url: String,
    /// HTML standing in for the host page document.
    pub page_file: Option<PathBuf>,
    pub log: LogDestination,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            widget: WidgetConfig::default(),
            page_url: "http://localhost/".to_string(),
            page_file: None,
            log: LogDestination::File,
            verbose: false,
        }
    }
}

/// Reads `path`, falling back to defaults when it does not exist.
/// A file that exists but does not parse is an error.
pub(crate) fn load(path: &Path) -> anyhow::Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };
    ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Applies `CHATDOCK_*` overrides.
pub(crate) fn apply_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
        config.widget.backend_url = url.trim().to_string();
    }
    if let Some(key) = lookup(ENV_API_KEY) {
        config.widget.api_key = key;
    }
}
