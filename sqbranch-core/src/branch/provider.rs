//! Binding-aware entry point to branch matching.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::error::BranchMatchError;
use super::matcher::{BranchMatcher, ProjectBranchSource};
use crate::binding::{BindingConfiguration, BindingTracker};
use crate::git::RepositoryLocator;

/// Read access to the active binding.
pub trait BindingSource: Send + Sync + 'static {
  fn current_binding(&self) -> BindingConfiguration;
}

impl BindingSource for BindingTracker {
  fn current_binding(&self) -> BindingConfiguration {
    self.current()
  }
}

impl BindingSource for BindingConfiguration {
  fn current_binding(&self) -> BindingConfiguration {
    self.clone()
  }
}

/// Resolves the server branch for the current session.
///
/// `Ok(None)` means no branch applies and the server should pick its default.
pub trait ServerBranchLookup: Send + Sync + 'static {
  fn get_server_branch_name(
    &self,
    cancel: &CancellationToken,
  ) -> impl Future<Output = Result<Option<String>, BranchMatchError>> + Send;
}

impl<T: ServerBranchLookup> ServerBranchLookup for Arc<T> {
  fn get_server_branch_name(
    &self,
    cancel: &CancellationToken,
  ) -> impl Future<Output = Result<Option<String>, BranchMatchError>> + Send {
    T::get_server_branch_name(self, cancel)
  }
}

/// Runs the [`BranchMatcher`] against the repository of the session, provided
/// the session is bound to a server project.
pub struct ServerBranchProvider<L, S, B> {
  binding: B,
  locator: Arc<L>,
  matcher: BranchMatcher<S>,
}

impl<L, S, B> ServerBranchProvider<L, S, B>
where
  L: RepositoryLocator,
  S: ProjectBranchSource,
  B: BindingSource,
{
  pub fn new(binding: B, locator: L, matcher: BranchMatcher<S>) -> Self {
    Self {
      binding,
      locator: Arc::new(locator),
      matcher,
    }
  }
}

impl<L, S, B> ServerBranchLookup for ServerBranchProvider<L, S, B>
where
  L: RepositoryLocator,
  S: ProjectBranchSource,
  B: BindingSource,
{
  #[instrument(skip_all, level = "debug")]
  async fn get_server_branch_name(&self, cancel: &CancellationToken) -> Result<Option<String>, BranchMatchError> {
    let binding = self.binding.current_binding();
    let Some(project) = binding.project() else {
      debug!("Standalone mode, no server branch applies");
      return Ok(None);
    };

    let locator = Arc::clone(&self.locator);
    let reader = tokio::task::spawn_blocking(move || -> Result<Option<L::Reader>> {
      let Some(root) = locator.locate() else {
        return Ok(None);
      };
      debug!("Opening repository at {}", root.display());
      locator.open(&root).map(Some)
    })
    .await
    .context("Repository lookup task failed")??;

    let Some(reader) = reader else {
      debug!("No git repository for this session");
      return Ok(None);
    };

    if cancel.is_cancelled() {
      return Err(BranchMatchError::Cancelled);
    }

    self
      .matcher
      .get_matching_branch(&project.project_key, reader, cancel)
      .await
  }
}

#[cfg(test)]
mod tests {
  use sqbranch_test_utils::git::{GitRepoTestGuard, create_branch, create_commit};

  use super::*;
  use crate::binding::BoundProject;
  use crate::branch::RemoteBranch;
  use crate::branch::testing::{FakeBranchSource, FakeLocator, FakeReader};
  use crate::git::WorkingDirLocator;

  fn connected(project_key: &str) -> BindingConfiguration {
    BindingConfiguration::Connected(BoundProject::new("https://sonar.example.com", project_key, None).unwrap())
  }

  fn main_only() -> Arc<FakeBranchSource> {
    Arc::new(FakeBranchSource::new(vec![RemoteBranch::branch("main", true)]))
  }

  #[tokio::test]
  async fn standalone_never_touches_git_or_server() {
    let source = main_only();
    let locator = FakeLocator::at("/repo", FakeReader::on("main").with_branch("main", &["c1"]));
    let provider = ServerBranchProvider::new(
      BindingConfiguration::Standalone,
      locator.clone(),
      BranchMatcher::new(Arc::clone(&source)),
    );

    let result = provider.get_server_branch_name(&CancellationToken::new()).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(locator.locates(), 0);
    assert_eq!(source.calls(), 0);
  }

  #[tokio::test]
  async fn missing_repository_resolves_to_none() {
    let source = main_only();
    let provider = ServerBranchProvider::new(
      connected("project"),
      FakeLocator::nowhere(),
      BranchMatcher::new(Arc::clone(&source)),
    );

    let result = provider.get_server_branch_name(&CancellationToken::new()).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(source.calls(), 0);
  }

  #[tokio::test]
  async fn bound_session_uses_project_key() {
    let source = Arc::new(FakeBranchSource::new(vec![
      RemoteBranch::branch("main", true),
      RemoteBranch::branch("develop", false),
    ]));
    let reader = FakeReader::on("develop").with_branch("develop", &["d1"]);
    let provider = ServerBranchProvider::new(
      connected("acme_backend"),
      FakeLocator::at("/repo", reader),
      BranchMatcher::new(Arc::clone(&source)),
    );

    let result = provider.get_server_branch_name(&CancellationToken::new()).await.unwrap();

    assert_eq!(result.as_deref(), Some("develop"));
    assert_eq!(source.last_project_key().as_deref(), Some("acme_backend"));
  }

  #[tokio::test]
  async fn binding_is_read_on_every_call() {
    let tracker = BindingTracker::default();
    let source = main_only();
    let reader = FakeReader::on("main").with_branch("main", &["c1"]);
    let provider = ServerBranchProvider::new(
      tracker.clone(),
      FakeLocator::at("/repo", reader),
      BranchMatcher::new(Arc::clone(&source)),
    );
    let cancel = CancellationToken::new();

    assert_eq!(provider.get_server_branch_name(&cancel).await.unwrap(), None);

    tracker.bind(connected("project"));
    assert_eq!(
      provider.get_server_branch_name(&cancel).await.unwrap().as_deref(),
      Some("main")
    );
  }

  #[tokio::test]
  async fn detached_head_is_propagated_as_none() {
    let source = main_only();
    let provider = ServerBranchProvider::new(
      connected("project"),
      FakeLocator::at("/repo", FakeReader::detached()),
      BranchMatcher::new(Arc::clone(&source)),
    );

    let result = provider.get_server_branch_name(&CancellationToken::new()).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(source.calls(), 0);
  }

  #[tokio::test]
  async fn server_fault_is_an_error() {
    let source = Arc::new(FakeBranchSource::failing("HTTP 500"));
    let reader = FakeReader::on("main").with_branch("main", &["c1"]);
    let provider = ServerBranchProvider::new(
      connected("project"),
      FakeLocator::at("/repo", reader),
      BranchMatcher::new(source),
    );

    let error = provider
      .get_server_branch_name(&CancellationToken::new())
      .await
      .unwrap_err();
    assert!(error.to_string().contains("HTTP 500"));
  }

  #[tokio::test]
  async fn cancellation_after_opening_skips_the_server() {
    let source = main_only();
    let cancel = CancellationToken::new();
    let reader = FakeReader::on("main").with_branch("main", &["c1"]);
    let reads = reader.counter();
    let provider = ServerBranchProvider::new(
      connected("project"),
      FakeLocator::at("/repo", reader).cancelling_on_open(&cancel),
      BranchMatcher::new(Arc::clone(&source)),
    );

    let error = provider.get_server_branch_name(&cancel).await.unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(source.calls(), 0);
    assert_eq!(reads.load(std::sync::atomic::Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn working_copy_is_matched_end_to_end() {
    let guard = GitRepoTestGuard::new();
    create_commit(&guard.repo, "base.txt", "base\n", "c1").unwrap();
    create_branch(&guard.repo, "release", Some("main")).unwrap();
    create_commit(&guard.repo, "base.txt", "next\n", "c2").unwrap();

    let source = Arc::new(FakeBranchSource::new(vec![
      RemoteBranch::branch("release", false),
      RemoteBranch::branch("Main", true),
    ]));
    let provider = ServerBranchProvider::new(
      connected("project"),
      WorkingDirLocator::new(guard.path()),
      BranchMatcher::new(source),
    );

    let result = provider.get_server_branch_name(&CancellationToken::new()).await.unwrap();
    assert_eq!(result.as_deref(), Some("Main"));
  }
}
