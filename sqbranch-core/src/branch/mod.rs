//! Server branch matching.
//!
//! The pieces build on each other leaf first:
//!
//! - [`distance`] computes how many commits separate HEAD from a candidate
//!   branch, with pruning against the best distance found so far.
//! - [`matcher`] picks the server branch closest to HEAD.
//! - [`provider`] gates the matcher on the binding and the presence of a git
//!   working copy.
//! - [`stateful`] memoises the provider per binding session.

pub mod distance;
pub mod error;
pub mod matcher;
pub mod provider;
pub mod stateful;
#[cfg(test)]
mod testing;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use distance::{Distance, compute_distance};
pub use error::BranchMatchError;
pub use matcher::{BranchMatcher, DEFAULT_MAX_HEAD_COMMITS, ProjectBranchSource};
pub use provider::{BindingSource, ServerBranchLookup, ServerBranchProvider};
pub use stateful::{ProviderLifecycle, RepositoryChanged, StatefulServerBranchProvider};

/// Opaque identifier of a commit. Only equality is meaningful.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CommitId(Arc<str>);

impl CommitId {
  pub fn new(id: impl Into<Arc<str>>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for CommitId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("CommitId").field(&self.as_str()).finish()
  }
}

impl fmt::Display for CommitId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&str> for CommitId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

impl From<git2::Oid> for CommitId {
  fn from(value: git2::Oid) -> Self {
    Self::new(value.to_string())
  }
}

/// Classification the server attaches to a branch.
///
/// Older SonarQube versions report `LONG`/`SHORT`, newer ones report `BRANCH`
/// for every non pull request branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchType {
  Branch,
  Long,
  Short,
  PullRequest,
  #[serde(other)]
  Unknown,
}

impl BranchType {
  /// Short lived branches and pull requests are never matched.
  pub const fn is_ephemeral(self) -> bool {
    matches!(self, Self::Short | Self::PullRequest)
  }
}

/// A branch known by the server for the bound project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
  pub name: String,
  pub is_main: bool,
  pub branch_type: BranchType,
}

impl RemoteBranch {
  pub fn new(name: impl Into<String>, is_main: bool, branch_type: BranchType) -> Self {
    Self {
      name: name.into(),
      is_main,
      branch_type,
    }
  }

  /// A long lived branch.
  pub fn branch(name: impl Into<String>, is_main: bool) -> Self {
    Self::new(name, is_main, BranchType::Branch)
  }

  /// Case-insensitive comparison against a local branch name.
  pub fn matches_name(&self, other: &str) -> bool {
    self.name.to_lowercase() == other.to_lowercase()
  }
}
