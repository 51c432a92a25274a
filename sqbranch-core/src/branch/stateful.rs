//! Per-session memoisation of the matched server branch.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use super::error::BranchMatchError;
use super::provider::ServerBranchLookup;
use crate::binding::{BindingSubscription, BindingTracker};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Published after a fresh server branch has been resolved and cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryChanged {
  pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheState {
  Empty,
  Populated(Option<String>),
}

#[derive(Debug)]
struct Cache {
  state: CacheState,
  generation: u64,
}

impl Cache {
  fn invalidate(&mut self) {
    self.state = CacheState::Empty;
    self.generation = self.generation.wrapping_add(1);
  }
}

/// Caches the answer of a [`ServerBranchLookup`] until the binding changes.
///
/// `None` results are cached like any other answer. Faults and cancellations
/// are not cached, so the next call retries. Two callers hitting an empty
/// cache at the same time may both run the lookup; the last one to finish
/// wins.
pub struct StatefulServerBranchProvider<P> {
  provider: P,
  cache: Arc<Mutex<Cache>>,
  changes: broadcast::Sender<RepositoryChanged>,
}

impl<P: ServerBranchLookup> StatefulServerBranchProvider<P> {
  pub fn new(provider: P) -> Self {
    let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
    Self {
      provider,
      cache: Arc::new(Mutex::new(Cache {
        state: CacheState::Empty,
        generation: 0,
      })),
      changes,
    }
  }

  /// Cached server branch, resolving it first when the cache is empty.
  #[instrument(skip_all, level = "debug")]
  pub async fn get_server_branch_name(&self, cancel: &CancellationToken) -> Result<Option<String>, BranchMatchError> {
    let generation = {
      let cache = self.cache.lock();
      if let CacheState::Populated(branch) = &cache.state {
        trace!("Serving cached server branch {:?}", branch);
        return Ok(branch.clone());
      }
      cache.generation
    };

    let branch = self.provider.get_server_branch_name(cancel).await?;

    {
      let mut cache = self.cache.lock();
      if cache.generation != generation {
        debug!("Binding changed while resolving the server branch, result not cached");
        return Ok(branch);
      }
      cache.state = CacheState::Populated(branch.clone());
    }

    debug!("Cached server branch {:?}", branch);
    self.changes.send(RepositoryChanged { branch: branch.clone() }).ok();
    Ok(branch)
  }

  /// Drop the cached answer.
  pub fn invalidate(&self) {
    self.cache.lock().invalidate();
  }

  pub fn is_cached(&self) -> bool {
    matches!(self.cache.lock().state, CacheState::Populated(_))
  }

  /// Receive a [`RepositoryChanged`] every time a new answer is cached.
  pub fn subscribe_repository_changes(&self) -> broadcast::Receiver<RepositoryChanged> {
    self.changes.subscribe()
  }

  /// Invalidate the cache on every binding event of `tracker` until the
  /// returned guard is stopped or dropped.
  pub fn start(&self, tracker: &BindingTracker) -> ProviderLifecycle {
    let cache: Weak<Mutex<Cache>> = Arc::downgrade(&self.cache);
    let subscription = tracker.subscribe(move |event| {
      if let Some(cache) = cache.upgrade() {
        debug!("Binding {:?}, clearing cached server branch", event);
        cache.lock().invalidate();
      }
    });

    ProviderLifecycle { subscription }
  }
}

/// Keeps a [`StatefulServerBranchProvider`] subscribed to binding events.
#[must_use = "dropping the lifecycle guard stops cache invalidation"]
pub struct ProviderLifecycle {
  subscription: BindingSubscription,
}

impl ProviderLifecycle {
  pub fn stop(self) {
    self.subscription.unsubscribe();
  }
}
