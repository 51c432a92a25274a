//! In-memory collaborators shared by the branch matching tests.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::matcher::ProjectBranchSource;
use super::{CommitId, RemoteBranch};
use crate::git::{CommitIter, GitReader, RepositoryLocator};

/// Repository made of named, linear histories.
#[derive(Clone, Default)]
pub(crate) struct FakeReader {
  head: Option<String>,
  branches: Vec<(String, Vec<CommitId>)>,
  history_reads: Arc<AtomicUsize>,
  cancel_on_history: Option<(String, CancellationToken)>,
}

impl FakeReader {
  pub(crate) fn on(head: &str) -> Self {
    Self {
      head: Some(head.to_string()),
      ..Self::default()
    }
  }

  pub(crate) fn detached() -> Self {
    Self::default()
  }

  pub(crate) fn with_branch(mut self, name: &str, commits: &[&str]) -> Self {
    let commits = commits.iter().map(|id| CommitId::from(*id)).collect();
    self.branches.push((name.to_string(), commits));
    self
  }

  /// Cancel `cancel` as soon as the history of `branch` is read.
  pub(crate) fn cancelling_on(mut self, branch: &str, cancel: &CancellationToken) -> Self {
    self.cancel_on_history = Some((branch.to_string(), cancel.clone()));
    self
  }

  pub(crate) fn history_reads(&self) -> usize {
    self.history_reads.load(Ordering::SeqCst)
  }

  pub(crate) fn counter(&self) -> Arc<AtomicUsize> {
    Arc::clone(&self.history_reads)
  }
}

impl GitReader for FakeReader {
  fn head_branch_name(&self) -> Result<Option<String>> {
    Ok(self.head.clone())
  }

  fn commits_of(&self, branch: &str) -> Result<CommitIter<'_>> {
    self.history_reads.fetch_add(1, Ordering::SeqCst);
    if let Some((trigger, cancel)) = &self.cancel_on_history
      && trigger == branch
    {
      cancel.cancel();
    }
    let commits = self
      .branches
      .iter()
      .find(|(name, _)| name == branch)
      .map(|(_, commits)| commits)
      .ok_or_else(|| anyhow::anyhow!("Branch '{branch}' not found"))?;
    Ok(Box::new(commits.iter().cloned().map(Ok)))
  }

  fn local_branch_names(&self) -> Result<Vec<String>> {
    Ok(self.branches.iter().map(|(name, _)| name.clone()).collect())
  }
}

enum Behaviour {
  Branches(Vec<RemoteBranch>),
  Fail(String),
  Pending,
}

/// Server stand-in that records how often it was queried.
pub(crate) struct FakeBranchSource {
  behaviour: Mutex<Behaviour>,
  calls: AtomicUsize,
  last_project_key: Mutex<Option<String>>,
}

impl FakeBranchSource {
  fn with(behaviour: Behaviour) -> Self {
    Self {
      behaviour: Mutex::new(behaviour),
      calls: AtomicUsize::new(0),
      last_project_key: Mutex::new(None),
    }
  }

  pub(crate) fn new(branches: Vec<RemoteBranch>) -> Self {
    Self::with(Behaviour::Branches(branches))
  }

  pub(crate) fn failing(message: &str) -> Self {
    Self::with(Behaviour::Fail(message.to_string()))
  }

  /// Never answers; used to exercise cancellation.
  pub(crate) fn pending() -> Self {
    Self::with(Behaviour::Pending)
  }

  pub(crate) fn set_branches(&self, branches: Vec<RemoteBranch>) {
    *self.behaviour.lock() = Behaviour::Branches(branches);
  }

  pub(crate) fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub(crate) fn last_project_key(&self) -> Option<String> {
    self.last_project_key.lock().clone()
  }
}

impl ProjectBranchSource for FakeBranchSource {
  fn project_branches(&self, project_key: &str) -> impl Future<Output = Result<Vec<RemoteBranch>>> + Send {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last_project_key.lock() = Some(project_key.to_string());

    let outcome = match &*self.behaviour.lock() {
      Behaviour::Branches(branches) => Some(Ok(branches.clone())),
      Behaviour::Fail(message) => Some(Err(anyhow::anyhow!(message.clone()))),
      Behaviour::Pending => None,
    };

    async move {
      match outcome {
        Some(result) => result,
        None => std::future::pending().await,
      }
    }
  }
}

/// Locator handing out clones of a [`FakeReader`].
#[derive(Clone)]
pub(crate) struct FakeLocator {
  root: Option<PathBuf>,
  reader: FakeReader,
  locates: Arc<AtomicUsize>,
  cancel_on_open: Option<CancellationToken>,
}

impl FakeLocator {
  pub(crate) fn at(root: &str, reader: FakeReader) -> Self {
    Self {
      root: Some(PathBuf::from(root)),
      reader,
      locates: Arc::new(AtomicUsize::new(0)),
      cancel_on_open: None,
    }
  }

  /// Session outside any git working copy.
  pub(crate) fn nowhere() -> Self {
    Self {
      root: None,
      reader: FakeReader::detached(),
      locates: Arc::new(AtomicUsize::new(0)),
      cancel_on_open: None,
    }
  }

  /// Cancel `cancel` while the repository is being opened.
  pub(crate) fn cancelling_on_open(mut self, cancel: &CancellationToken) -> Self {
    self.cancel_on_open = Some(cancel.clone());
    self
  }

  pub(crate) fn locates(&self) -> usize {
    self.locates.load(Ordering::SeqCst)
  }
}

impl RepositoryLocator for FakeLocator {
  type Reader = FakeReader;

  fn locate(&self) -> Option<PathBuf> {
    self.locates.fetch_add(1, Ordering::SeqCst);
    self.root.clone()
  }

  fn open(&self, _root: &Path) -> Result<FakeReader> {
    if let Some(cancel) = &self.cancel_on_open {
      cancel.cancel();
    }
    Ok(self.reader.clone())
  }
}
