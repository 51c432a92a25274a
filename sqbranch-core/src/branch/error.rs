use anyhow::Error as AnyError;
use thiserror::Error;

/// Errors surfaced while resolving the server branch.
///
/// Situations where no branch applies (standalone binding, no repository,
/// detached HEAD) are not errors; they resolve to `None`.
#[derive(Debug, Error)]
pub enum BranchMatchError {
  /// The server did not flag any branch as main, so there is nothing to fall
  /// back to.
  #[error("the server did not report a main branch for the project")]
  NoMainBranch,
  /// The lookup was cancelled before it completed.
  #[error("server branch lookup was cancelled")]
  Cancelled,
  /// Collaborator faults (server client, repository reader, task join).
  #[error(transparent)]
  Other(#[from] AnyError),
}

impl BranchMatchError {
  pub const fn is_cancelled(&self) -> bool {
    matches!(self, Self::Cancelled)
  }
}
