//! In-memory binding state with change notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::BindingConfiguration;

/// Lifecycle notification emitted by [`BindingTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingEvent {
  /// The repository was bound to a different project, or switched between
  /// standalone and connected mode.
  Changed,
  /// The same binding was refreshed (metadata only).
  Updated,
}

type Listener = Arc<dyn Fn(BindingEvent) + Send + Sync>;

struct Inner {
  current: RwLock<BindingConfiguration>,
  listeners: Mutex<Vec<(u64, Listener)>>,
  next_id: AtomicU64,
}

/// Holds the active binding and notifies subscribers when it changes.
///
/// Listeners run synchronously on the thread that changed the binding, after
/// the new binding is visible through [`BindingTracker::current`].
#[derive(Clone)]
pub struct BindingTracker {
  inner: Arc<Inner>,
}

impl BindingTracker {
  pub fn new(initial: BindingConfiguration) -> Self {
    Self {
      inner: Arc::new(Inner {
        current: RwLock::new(initial),
        listeners: Mutex::new(Vec::new()),
        next_id: AtomicU64::new(0),
      }),
    }
  }

  /// Snapshot of the active binding.
  pub fn current(&self) -> BindingConfiguration {
    self.inner.current.read().clone()
  }

  /// Replace the binding and emit [`BindingEvent::Changed`].
  pub fn bind(&self, binding: BindingConfiguration) {
    *self.inner.current.write() = binding;
    self.notify(BindingEvent::Changed);
  }

  /// Refresh the binding.
  ///
  /// Emits [`BindingEvent::Updated`] when `binding` targets the same project
  /// as the active one, [`BindingEvent::Changed`] otherwise. Returns the
  /// emitted event.
  pub fn refresh(&self, binding: BindingConfiguration) -> BindingEvent {
    let event = {
      let mut current = self.inner.current.write();
      let same = match (&*current, &binding) {
        (BindingConfiguration::Standalone, BindingConfiguration::Standalone) => true,
        (BindingConfiguration::Connected(old), BindingConfiguration::Connected(new)) => old.is_same_project(new),
        _ => false,
      };
      *current = binding;
      if same { BindingEvent::Updated } else { BindingEvent::Changed }
    };

    self.notify(event);
    event
  }

  /// Register `listener` for binding events.
  ///
  /// The listener stays registered until the returned subscription is dropped
  /// or [`BindingSubscription::unsubscribe`] is called.
  pub fn subscribe<F>(&self, listener: F) -> BindingSubscription
  where
    F: Fn(BindingEvent) + Send + Sync + 'static,
  {
    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
    self.inner.listeners.lock().push((id, Arc::new(listener)));

    BindingSubscription {
      id,
      tracker: Arc::downgrade(&self.inner),
    }
  }

  /// Number of registered listeners.
  pub fn listener_count(&self) -> usize {
    self.inner.listeners.lock().len()
  }

  fn notify(&self, event: BindingEvent) {
    // Snapshot so listeners may subscribe or unsubscribe while being notified.
    let listeners: Vec<Listener> = self
      .inner
      .listeners
      .lock()
      .iter()
      .map(|(_, listener)| Arc::clone(listener))
      .collect();

    debug!("Binding {:?}, notifying {} listeners", event, listeners.len());
    for listener in listeners {
      listener(event);
    }
  }
}

impl Default for BindingTracker {
  fn default() -> Self {
    Self::new(BindingConfiguration::Standalone)
  }
}

/// Registration handle returned by [`BindingTracker::subscribe`].
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct BindingSubscription {
  id: u64,
  tracker: Weak<Inner>,
}

impl BindingSubscription {
  /// Stop receiving binding events.
  pub fn unsubscribe(self) {
    drop(self);
  }
}

impl Drop for BindingSubscription {
  fn drop(&mut self) {
    if let Some(inner) = self.tracker.upgrade() {
      inner.listeners.lock().retain(|(id, _)| *id != self.id);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::binding::BoundProject;

  fn connected(project_key: &str) -> BindingConfiguration {
    BindingConfiguration::Connected(BoundProject::new("https://sonarcloud.io", project_key, None).unwrap())
  }

  fn recorder(tracker: &BindingTracker) -> (Arc<Mutex<Vec<BindingEvent>>>, BindingSubscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = tracker.subscribe(move |event| sink.lock().push(event));
    (events, subscription)
  }

  #[test]
  fn bind_updates_current_and_notifies() {
    let tracker = BindingTracker::default();
    let (events, _subscription) = recorder(&tracker);

    tracker.bind(connected("key"));

    let current = tracker.current();
    assert_eq!(current.project().map(|project| project.project_key.as_str()), Some("key"));
    assert_eq!(*events.lock(), vec![BindingEvent::Changed]);
  }

  #[test]
  fn refresh_of_same_project_is_an_update() {
    let tracker = BindingTracker::new(connected("key"));
    let (events, _subscription) = recorder(&tracker);

    assert_eq!(tracker.refresh(connected("key")), BindingEvent::Updated);
    assert_eq!(tracker.refresh(connected("other")), BindingEvent::Changed);
    assert_eq!(tracker.refresh(BindingConfiguration::Standalone), BindingEvent::Changed);
    assert_eq!(tracker.refresh(BindingConfiguration::Standalone), BindingEvent::Updated);

    assert_eq!(
      *events.lock(),
      vec![
        BindingEvent::Updated,
        BindingEvent::Changed,
        BindingEvent::Changed,
        BindingEvent::Updated
      ]
    );
  }

  #[test]
  fn listener_sees_new_binding() {
    let tracker = BindingTracker::default();
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    let inner_tracker = tracker.clone();
    let _subscription = tracker.subscribe(move |_| {
      *sink.lock() = Some(inner_tracker.current().is_standalone());
    });

    tracker.bind(connected("key"));

    assert_eq!(*observed.lock(), Some(false));
  }

  #[test]
  fn dropping_subscription_unsubscribes() {
    let tracker = BindingTracker::default();
    let (events, subscription) = recorder(&tracker);
    assert_eq!(tracker.listener_count(), 1);

    subscription.unsubscribe();
    tracker.bind(connected("key"));

    assert_eq!(tracker.listener_count(), 0);
    assert!(events.lock().is_empty());
  }

  #[test]
  fn subscription_outliving_tracker_is_harmless() {
    let tracker = BindingTracker::default();
    let (_events, subscription) = recorder(&tracker);
    drop(tracker);
    drop(subscription);
  }
}
