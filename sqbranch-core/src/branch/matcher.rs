//! Selection of the server branch closest to the local HEAD.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

use super::distance::{Distance, compute_distance};
use super::error::BranchMatchError;
use super::{CommitId, RemoteBranch};
use crate::git::GitReader;

/// Upper bound on the number of HEAD commits materialised for matching.
pub const DEFAULT_MAX_HEAD_COMMITS: usize = 10_000;

/// Source of the branches the server knows for a project.
pub trait ProjectBranchSource: Send + Sync + 'static {
  /// Every branch of `project_key`, in the order the server reports them.
  fn project_branches(&self, project_key: &str) -> impl Future<Output = Result<Vec<RemoteBranch>>> + Send;
}

/// Finds the server branch that best matches the local HEAD.
pub struct BranchMatcher<S> {
  source: Arc<S>,
  max_head_commits: usize,
}

impl<S> Clone for BranchMatcher<S> {
  fn clone(&self) -> Self {
    Self {
      source: Arc::clone(&self.source),
      max_head_commits: self.max_head_commits,
    }
  }
}

impl<S: ProjectBranchSource> BranchMatcher<S> {
  pub fn new(source: Arc<S>) -> Self {
    Self {
      source,
      max_head_commits: DEFAULT_MAX_HEAD_COMMITS,
    }
  }

  /// Limit how much of HEAD's history is compared against candidates.
  pub fn with_max_head_commits(mut self, max_head_commits: usize) -> Self {
    self.max_head_commits = max_head_commits;
    self
  }

  /// Resolve the server branch matching the repository's HEAD.
  ///
  /// Returns `Ok(None)` when HEAD is detached; the server is not contacted in
  /// that case. Git reads run on the blocking pool.
  #[instrument(skip(self, reader, cancel), level = "debug")]
  pub async fn get_matching_branch<R>(
    &self,
    project_key: &str,
    reader: R,
    cancel: &CancellationToken,
  ) -> Result<Option<String>, BranchMatchError>
  where
    R: GitReader + Send + 'static,
  {
    let (reader, head) = tokio::task::spawn_blocking(move || {
      let head = reader.head_branch_name();
      (reader, head)
    })
    .await
    .context("Failed to read HEAD")?;

    let Some(head) = head? else {
      debug!("HEAD is detached, no server branch can match");
      return Ok(None);
    };

    let remote_branches = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(BranchMatchError::Cancelled),
      branches = self.source.project_branches(project_key) => branches?,
    };
    debug!("Server reported {} branches for {}", remote_branches.len(), project_key);

    let max_head_commits = self.max_head_commits;
    let cancel = cancel.clone();
    let selected = tokio::task::spawn_blocking(move || {
      select_branch_until_cancelled(&reader, &head, &remote_branches, max_head_commits, &cancel)
    })
    .await
    .context("Branch matching task failed")??;

    info!("Matched server branch '{}'", selected);
    Ok(Some(selected))
  }
}

/// Pick the server branch closest to `head`.
///
/// Ephemeral branches are ignored. An exact (case-insensitive) name match
/// wins without reading any history. Otherwise every server branch with a
/// local counterpart is scored with [`compute_distance`]; the first branch
/// reaching the smallest distance wins. With no scored branch the main branch
/// is returned.
pub fn select_branch<R>(
  reader: &R,
  head: &str,
  remote_branches: &[RemoteBranch],
  max_head_commits: usize,
) -> Result<String, BranchMatchError>
where
  R: GitReader + ?Sized,
{
  select_branch_until_cancelled(
    reader,
    head,
    remote_branches,
    max_head_commits,
    &CancellationToken::new(),
  )
}

fn select_branch_until_cancelled<R>(
  reader: &R,
  head: &str,
  remote_branches: &[RemoteBranch],
  max_head_commits: usize,
  cancel: &CancellationToken,
) -> Result<String, BranchMatchError>
where
  R: GitReader + ?Sized,
{
  let candidates: Vec<&RemoteBranch> = remote_branches
    .iter()
    .filter(|branch| !branch.branch_type.is_ephemeral())
    .collect();

  if let Some(exact) = candidates.iter().find(|branch| branch.matches_name(head)) {
    debug!("HEAD '{}' matches server branch '{}' by name", head, exact.name);
    return Ok(exact.name.clone());
  }

  let head_commits = reader
    .commits_of(head)?
    .take(max_head_commits)
    .collect::<Result<Vec<CommitId>>>()?;
  let local_branches = reader.local_branch_names()?;

  let mut best = Distance::NoMatch;
  let mut best_branch: Option<&RemoteBranch> = None;

  for remote in candidates {
    if cancel.is_cancelled() {
      return Err(BranchMatchError::Cancelled);
    }

    let Some(local) = local_branches.iter().find(|local| remote.matches_name(local)) else {
      trace!("No local branch for server branch '{}'", remote.name);
      continue;
    };

    let distance = compute_distance(&head_commits, reader.commits_of(local)?, best)?;
    trace!("Distance from '{}' to '{}': {}", head, remote.name, distance);

    if distance < best {
      best = distance;
      best_branch = Some(remote);
    }
  }

  if let Some(branch) = best_branch {
    debug!("Closest server branch is '{}' at distance {}", branch.name, best);
    return Ok(branch.name.clone());
  }

  let main = remote_branches
    .iter()
    .find(|branch| branch.is_main)
    .ok_or(BranchMatchError::NoMainBranch)?;
  debug!("No server branch shares history with HEAD, using main branch '{}'", main.name);
  Ok(main.name.clone())
}
