//! Environment variable management for testing
//!
//! Overrides `XDG_CONFIG_HOME` so tests never read or write the user's own
//! configuration.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use tempfile::TempDir;

/// A test environment that points the XDG config directory at a per-test
/// temporary directory
pub struct EnvTestGuard {
  /// The temporary directory backing the XDG config directory
  pub temp_dir: TempDir,
  original_config_home: Option<OsString>,
}

impl Default for EnvTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl EnvTestGuard {
  pub const XDG_CONFIG_HOME: &'static str = "XDG_CONFIG_HOME";

  /// Create a new test environment with an overridden XDG config directory
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    let original_config_home = env::var_os(Self::XDG_CONFIG_HOME);

    let temp_path = temp_dir.path().to_path_buf();
    std::fs::create_dir_all(temp_path.join("config")).expect("Failed to create config directory");

    unsafe {
      env::set_var(Self::XDG_CONFIG_HOME, temp_path.join("config"));
    }

    Self {
      temp_dir,
      original_config_home,
    }
  }

  /// Get the path to the XDG config directory
  pub fn config_dir(&self) -> PathBuf {
    self.temp_dir.path().join("config")
  }
}

impl Drop for EnvTestGuard {
  fn drop(&mut self) {
    match &self.original_config_home {
      Some(val) => unsafe {
        env::set_var(Self::XDG_CONFIG_HOME, val);
      },
      None => unsafe {
        env::remove_var(Self::XDG_CONFIG_HOME);
      },
    }
  }
}
