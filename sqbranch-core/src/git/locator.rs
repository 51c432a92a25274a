//! Finding and opening the repository a provider works against.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::detection::detect_repository_from_path;
use super::reader::{Git2Reader, GitReader};

/// Resolves the git working copy for the current session and opens it.
pub trait RepositoryLocator: Send + Sync + 'static {
  /// Reader produced for an opened repository.
  type Reader: GitReader + Send + 'static;

  /// Root of the working copy, or `None` when the session is not under git.
  fn locate(&self) -> Option<PathBuf>;

  /// Open the repository rooted at `root`.
  fn open(&self, root: &Path) -> Result<Self::Reader>;
}

/// Locates the repository containing a fixed starting directory.
#[derive(Debug, Clone)]
pub struct WorkingDirLocator {
  start: PathBuf,
}

impl WorkingDirLocator {
  pub fn new<P: Into<PathBuf>>(start: P) -> Self {
    Self { start: start.into() }
  }
}

impl RepositoryLocator for WorkingDirLocator {
  type Reader = Git2Reader;

  fn locate(&self) -> Option<PathBuf> {
    detect_repository_from_path(&self.start)
  }

  fn open(&self, root: &Path) -> Result<Git2Reader> {
    Git2Reader::open(root)
  }
}
