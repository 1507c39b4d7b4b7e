//! Layered configuration
//!
//! Sources, later ones winning:
//! 1. Built-in defaults
//! 2. User config (`~/.config/fleetcare/config.yaml` or platform equivalent)
//! 3. Project config (`.fleet/config.yaml`)
//! 4. `FLEETCARE_AUTHOR` environment variable

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::project::Project;

pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name recorded on new assets and cases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    pub scanner: ScannerConfig,

    /// Calendar interval applied to newly registered assets without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_maintenance_days: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// How far ahead a scheduled maintenance date counts as due
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookahead_days: Option<u32>,
}

impl Config {
    /// Merge user config, `project`'s config and the environment over defaults
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        if let Some(dirs) = ProjectDirs::from("", "", "fleetcare") {
            if let Some(user) = Self::read_file(&dirs.config_dir().join("config.yaml")) {
                config.merge(user);
            }
        }

        if let Some(project) = project {
            if let Some(local) = Self::read_file(&project.config_path()) {
                config.merge(local);
            }
        }

        if let Ok(author) = std::env::var("FLEETCARE_AUTHOR") {
            if !author.trim().is_empty() {
                config.author = Some(author);
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        let content = fs::read_to_string(path).ok()?;
        match serde_yml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.default_maintenance_days.is_some() {
            self.default_maintenance_days = other.default_maintenance_days;
        }
        if other.scanner.lookahead_days.is_some() {
            self.scanner.lookahead_days = other.scanner.lookahead_days;
        }
    }

    pub fn lookahead_days(&self) -> u32 {
        self.scanner.lookahead_days.unwrap_or(DEFAULT_LOOKAHEAD_DAYS)
    }

    /// Author name, falling back to the login user
    pub fn author(&self) -> String {
        self.author
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
