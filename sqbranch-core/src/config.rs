//! # Configuration Management
//!
//! Handles the global configuration directories and user settings for the
//! sqbranch tool, following the XDG base directory layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::branch::DEFAULT_MAX_HEAD_COMMITS;

/// Represents the configuration directories for the sqbranch application
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Create a new ConfigDirs instance
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("io", "", "sqbranch").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Directories rooted at an explicit location instead of the user's home.
  pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
    Self {
      config_dir: root.as_ref().join("config"),
    }
  }

  /// Get the config directory
  pub fn config_dir(&self) -> &PathBuf {
    &self.config_dir
  }

  /// Get the path to the global settings file
  pub fn settings_path(&self) -> PathBuf {
    self.config_dir.join("config.toml")
  }

  /// Load settings from file or return defaults
  ///
  /// Keys missing from `config.toml` take their default value.
  ///
  /// # Errors
  ///
  /// Returns an error if the file exists but cannot be read or is not valid
  /// TOML.
  pub fn load_settings(&self) -> Result<Settings> {
    let config_path = self.settings_path();

    if !config_path.exists() {
      return Ok(Settings::default());
    }

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read settings from {}", config_path.display()))?;
    let settings: Settings =
      toml::from_str(&content).with_context(|| format!("Failed to parse settings from {}", config_path.display()))?;

    Ok(settings)
  }

  /// Save settings to file
  ///
  /// # Arguments
  ///
  /// * `settings` - Settings to write, replacing the whole file
  ///
  /// # Errors
  ///
  /// Returns an error if the config directory cannot be created or the file
  /// cannot be written.
  pub fn save_settings(&self, settings: &Settings) -> Result<()> {
    let config_path = self.settings_path();

    if let Some(parent) = config_path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(settings).context("Failed to serialize settings to TOML")?;
    fs::write(&config_path, content)
      .with_context(|| format!("Failed to write settings to {}", config_path.display()))?;

    Ok(())
  }
}

/// User settings stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Number of HEAD commits compared against server branches.
  pub max_head_commits: usize,
  /// Server used by `bind` when no `--server` is given.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default_server_url: Option<String>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      max_head_commits: DEFAULT_MAX_HEAD_COMMITS,
      default_server_url: None,
    }
  }
}

/// Get the configuration directories
pub fn get_config_dirs() -> Result<ConfigDirs> {
  ConfigDirs::new()
}
