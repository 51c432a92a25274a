//! Repository discovery helpers.

use std::path::{Path, PathBuf};

use git2::Repository;

/// Detect if the given path or any parent directory is a Git repository.
///
/// Bare repositories have no working directory and are reported as `None`.
pub fn detect_repository_from_path<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
  match Repository::discover(path.as_ref()) {
    Ok(repo) => repo.workdir().map(|workdir| workdir.to_path_buf()),
    Err(_) => None,
  }
}

/// Resolve the primary repository workdir for storing shared metadata.
///
/// Git worktrees have their own working directories but share a common
/// repository. The binding lives next to the main workdir so every worktree
/// of a repository sees the same binding.
pub fn resolve_repository_root<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
  let repo = Repository::discover(path).ok()?;
  let common_dir = repo.commondir();

  let repo_for_state = if common_dir != repo.path() {
    Repository::open(common_dir).ok()?
  } else {
    repo
  };

  repo_for_state.workdir().map(|workdir| workdir.to_path_buf())
}
