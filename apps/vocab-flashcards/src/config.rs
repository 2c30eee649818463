//! Configuration for vocab flashcards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    pub fn load() -> Self {
        Self::config_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Read a config file, falling back to defaults when it is missing or
    /// malformed.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write the default config on first run so there is a file to edit.
    pub fn init_default() -> anyhow::Result<()> {
        match Self::config_path() {
            Some(path) if !path.exists() => Self::default().save(),
            _ => Ok(()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.data.source.trim().is_empty(), "no vocabulary source configured");
        anyhow::ensure!(self.data.timeout_secs > 0, "data.timeout_secs must be positive");
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vocab-flashcards")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Apply command line overrides: the first positional argument is the
    /// data source.
    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(source) = args.into_iter().find(|a| !a.starts_with('-')) {
            self.data.source = source;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// File path or http(s) URL of the vocabulary JSON.
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_source() -> String { "vocab-data.json".to_string() }
fn default_timeout() -> u64 { 10 }

impl DataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_ads: bool,
    #[serde(default = "default_true")]
    pub show_synonyms: bool,
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_true() -> bool { true }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_ads: true,
            show_synonyms: true,
            show_progress: true,
        }
    }
}
