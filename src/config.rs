//! Configuration handling for the TUI

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the backend snapshot location
pub const DATA_FILE_ENV: &str = "FORMS_TUI_DATA_FILE";

const DEFAULT_LATENCY_MS: u64 = 400;
const DEFAULT_LOG_FILTER: &str = "forms_tui=info";

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// Where the local backend keeps accounts and records
    pub data_file: Option<String>,
    /// Write the backend snapshot to disk
    pub persist: Option<bool>,
    /// Artificial delay applied to every backend call
    pub simulated_latency_ms: Option<u64>,
    /// Last email that signed in successfully
    pub remember_email: Option<String>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: Option<String>,
}

impl TuiConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("io", "formstui", "forms-tui")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for the backend snapshot and log file
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: TuiConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Snapshot path: environment, then config, then the data directory.
    /// `None` when persistence is off or no location can be determined.
    pub fn resolved_data_file(&self) -> Option<PathBuf> {
        if !self.persist.unwrap_or(true) {
            return None;
        }
        std::env::var(DATA_FILE_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.data_file.clone())
            .map(PathBuf::from)
            .or_else(|| Self::data_dir().map(|dir| dir.join("backend.json")))
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms.unwrap_or(DEFAULT_LATENCY_MS))
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
