//! Repository-local persistence of the binding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::BindingConfiguration;

/// Directory holding sqbranch metadata inside a working copy.
pub const STATE_DIR: &str = ".sqbranch";

const BINDING_FILE: &str = "binding.json";

/// Path of the binding file for the repository rooted at `repo_root`.
pub fn binding_path<P: AsRef<Path>>(repo_root: P) -> PathBuf {
  repo_root.as_ref().join(STATE_DIR).join(BINDING_FILE)
}

/// Ensure the repository's `.sqbranch/` directory contains a `.gitignore`
/// that ignores every file within it, keeping the binding out of version
/// control without touching the repository's own `.gitignore`.
pub fn ensure_internal_gitignore<P: AsRef<Path>>(repo_root: P) -> Result<()> {
  let state_dir = repo_root.as_ref().join(STATE_DIR);
  if !state_dir.exists() {
    fs::create_dir_all(&state_dir).context("Failed to create .sqbranch directory")?;
  }

  let gitignore_path = state_dir.join(".gitignore");
  if gitignore_path.exists() {
    let content = fs::read_to_string(&gitignore_path).context("Failed to read .sqbranch/.gitignore")?;
    if content.lines().any(|line| line.trim() == "*") {
      return Ok(());
    }
  }

  fs::write(&gitignore_path, "*\n").context("Failed to update .sqbranch/.gitignore")?;

  Ok(())
}

/// Load the binding of the repository rooted at `repo_root`.
///
/// A repository without a binding file is standalone.
pub fn load_binding<P: AsRef<Path>>(repo_root: P) -> Result<BindingConfiguration> {
  let path = binding_path(repo_root);

  if !path.exists() {
    debug!("No binding file at {}, repository is standalone", path.display());
    return Ok(BindingConfiguration::Standalone);
  }

  let content = fs::read_to_string(&path).with_context(|| format!("Failed to read binding from {}", path.display()))?;
  let binding =
    serde_json::from_str(&content).with_context(|| format!("Failed to parse binding from {}", path.display()))?;

  Ok(binding)
}

/// Persist the binding of the repository rooted at `repo_root`.
pub fn save_binding<P: AsRef<Path>>(repo_root: P, binding: &BindingConfiguration) -> Result<()> {
  let repo_root = repo_root.as_ref();
  ensure_internal_gitignore(repo_root)?;

  let path = binding_path(repo_root);
  let content = serde_json::to_string_pretty(binding).context("Failed to serialize binding")?;
  fs::write(&path, content).with_context(|| format!("Failed to write binding to {}", path.display()))?;

  debug!("Saved binding to {}", path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;
  use crate::binding::BoundProject;

  #[test]
  fn missing_binding_is_standalone() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(load_binding(temp_dir.path()).unwrap(), BindingConfiguration::Standalone);
  }

  #[test]
  fn save_and_load_connected_binding() {
    let temp_dir = TempDir::new().unwrap();
    let project = BoundProject::new("https://sonar.example.com", "backend", None).unwrap();
    let binding = BindingConfiguration::Connected(project);

    save_binding(temp_dir.path(), &binding).unwrap();

    assert_eq!(load_binding(temp_dir.path()).unwrap(), binding);
    assert!(binding_path(temp_dir.path()).ends_with(".sqbranch/binding.json"));
  }

  #[test]
  fn save_creates_internal_gitignore() {
    let temp_dir = TempDir::new().unwrap();
    save_binding(temp_dir.path(), &BindingConfiguration::Standalone).unwrap();

    let gitignore = fs::read_to_string(temp_dir.path().join(".sqbranch/.gitignore")).unwrap();
    assert_eq!(gitignore, "*\n");
  }

  #[test]
  fn internal_gitignore_is_left_alone_when_complete() {
    let temp_dir = TempDir::new().unwrap();
    let state_dir = temp_dir.path().join(STATE_DIR);
    fs::create_dir_all(&state_dir).unwrap();
    fs::write(state_dir.join(".gitignore"), "# managed\n*\n").unwrap();

    ensure_internal_gitignore(temp_dir.path()).unwrap();

    let gitignore = fs::read_to_string(state_dir.join(".gitignore")).unwrap();
    assert_eq!(gitignore, "# managed\n*\n");
  }

  #[test]
  fn corrupt_binding_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = binding_path(temp_dir.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    let error = load_binding(temp_dir.path()).unwrap_err();
    assert!(format!("{error:#}").contains("Failed to parse binding"));
  }
}
