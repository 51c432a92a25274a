//! Read-only repository access used by the branch matcher.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{BranchType, ErrorCode, Repository, Sort};
use tracing::trace;

use crate::branch::CommitId;

/// Lazily produced, newest-first commit history of a branch.
pub type CommitIter<'a> = Box<dyn Iterator<Item = Result<CommitId>> + 'a>;

/// The slice of a git repository the branch matcher needs.
///
/// Histories are produced lazily because a branch may carry an arbitrarily
/// long history while the matcher only ever consumes a bounded prefix.
pub trait GitReader {
  /// Name of the branch HEAD points at, or `None` when HEAD is detached or
  /// unborn.
  fn head_branch_name(&self) -> Result<Option<String>>;

  /// Newest-first history of the named local branch.
  fn commits_of(&self, branch: &str) -> Result<CommitIter<'_>>;

  /// Names of every local branch.
  fn local_branch_names(&self) -> Result<Vec<String>>;
}

/// [`GitReader`] backed by a `git2` repository handle.
pub struct Git2Reader {
  repo: Repository,
}

impl Git2Reader {
  /// Wrap an already opened repository.
  pub const fn new(repo: Repository) -> Self {
    Self { repo }
  }

  /// Open the repository rooted at `path`.
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let repo =
      Repository::open(path).with_context(|| format!("Failed to open Git repository at {}", path.display()))?;
    Ok(Self::new(repo))
  }
}

impl GitReader for Git2Reader {
  fn head_branch_name(&self) -> Result<Option<String>> {
    let head = match self.repo.head() {
      Ok(head) => head,
      Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
        trace!("HEAD is unborn, no branch checked out");
        return Ok(None);
      }
      Err(e) => return Err(e).context("Failed to get HEAD reference"),
    };

    if !head.is_branch() {
      return Ok(None);
    }

    Ok(head.shorthand().map(str::to_string))
  }

  fn commits_of(&self, branch: &str) -> Result<CommitIter<'_>> {
    let tip = self
      .repo
      .find_branch(branch, BranchType::Local)
      .with_context(|| format!("Branch '{branch}' not found"))?
      .get()
      .peel_to_commit()
      .with_context(|| format!("Failed to peel branch '{branch}' to commit"))?
      .id();

    let mut walk = self.repo.revwalk().context("Failed to create revision walker")?;
    walk
      .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
      .context("Failed to configure revision walker")?;
    walk
      .push(tip)
      .with_context(|| format!("Failed to start history walk for branch '{branch}'"))?;

    Ok(Box::new(walk.map(|oid| {
      oid.map(CommitId::from).context("Failed to walk branch history")
    })))
  }

  fn local_branch_names(&self) -> Result<Vec<String>> {
    let branches = self
      .repo
      .branches(Some(BranchType::Local))
      .context("Failed to list local branches")?;

    let mut names = Vec::new();
    for branch_result in branches {
      let (branch, _) = branch_result?;
      if let Some(name) = branch.name()? {
        names.push(name.to_string());
      }
    }

    Ok(names)
  }
}
