//! Git repository management for testing
//!
//! Temporary repositories plus helpers to build branch layouts commit by
//! commit.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use git2::{BranchType, Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

/// A test guard that creates a temporary git repository whose initial branch
/// is `main`. The repository is removed when the guard is dropped.
pub struct GitRepoTestGuard {
  /// The temporary directory containing the git repository
  pub temp_dir: TempDir,
  /// The git repository
  pub repo: Repository,
}

impl GitRepoTestGuard {
  /// Create a new test git repository
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");

    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    let repo = Repository::init_opts(temp_dir.path(), &options).expect("Failed to initialize git repository");

    {
      let mut config = repo.config().expect("Failed to get repository config");
      config
        .set_str("user.name", "Sqbranch Test User")
        .expect("Failed to set user.name");
      config
        .set_str("user.email", "sqbranch-test@example.com")
        .expect("Failed to set user.email");
    }

    Self { temp_dir, repo }
  }

  /// Get the path to the git repository
  pub fn path(&self) -> &Path {
    self.temp_dir.path()
  }
}

impl Default for GitRepoTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

/// Write `content` to `file_name` and commit it on the current HEAD.
pub fn create_commit(repo: &Repository, file_name: &str, content: &str, message: &str) -> Result<Oid> {
  let workdir = repo.workdir().context("Repository has no working directory")?;
  fs::write(workdir.join(file_name), content)?;

  let mut index = repo.index()?;
  index.add_path(Path::new(file_name))?;
  index.write()?;

  let tree_id = index.write_tree()?;
  let tree = repo.find_tree(tree_id)?;
  let signature = Signature::now("Test User", "test@example.com")?;

  let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
  let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

  let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
  Ok(oid)
}

/// Create `branch_name` at `start_point` (a local branch) or at HEAD.
pub fn create_branch(repo: &Repository, branch_name: &str, start_point: Option<&str>) -> Result<()> {
  let head = if let Some(start) = start_point {
    repo
      .find_branch(start, BranchType::Local)?
      .into_reference()
      .peel_to_commit()?
  } else {
    repo.head()?.peel_to_commit()?
  };

  repo.branch(branch_name, &head, false)?;
  Ok(())
}

/// Check out a local branch, updating the working tree.
pub fn checkout_branch(repo: &Repository, branch_name: &str) -> Result<()> {
  let obj = repo
    .revparse_single(&format!("refs/heads/{branch_name}"))?
    .peel_to_commit()?;

  repo.checkout_tree(&obj.into_object(), None)?;
  repo.set_head(&format!("refs/heads/{branch_name}"))?;

  Ok(())
}

/// Point HEAD directly at its current commit.
pub fn detach_head(repo: &Repository) -> Result<()> {
  let commit = repo.head()?.peel_to_commit()?;
  repo.set_head_detached(commit.id())?;
  Ok(())
}
