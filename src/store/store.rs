use super::{Keyed, State};
use crate::config::{CompletedUpdatePolicy, StoreConfig, UnknownKeyPolicy};
use crate::error::{Result, StoreError};
use crate::operators::{scan_into, Selection};
use crate::subject::{BehaviorSubject, Feed, Subject};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The two live channels behind an initialized store.
struct Channels<S: State> {
    snapshots: BehaviorSubject<S>,
    updates: Subject<S::Patch>,
    // State after every accepted update, queued or not; kept only when keys are checked
    head: Option<Arc<Mutex<S>>>,
}

impl<S: State> Clone for Channels<S> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
            updates: self.updates.clone(),
            head: self.head.clone(),
        }
    }
}

/// Point-in-time view of a store's channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStatus {
    pub initialized: bool,
    pub snapshots_stopped: bool,
    pub updates_stopped: bool,
    pub snapshot_observers: usize,
    pub update_observers: usize,
}

/// A reactive state container.
///
/// The store publishes snapshots of its state through a replaying broadcast
/// channel. Partial updates go into an intake channel and are folded into
/// the previous snapshot, so each update produces exactly one new snapshot.
/// Consumers watch individual keys with [`select_state`] or arbitrary
/// projections with [`select`]; either way they are only re-notified when
/// the value they watch changes.
///
/// Lifecycle: [`setup`] once, then any number of updates and selections,
/// then [`complete_state`], after which the store is inert. Calls made
/// before `setup` fail with [`StoreError::NotInitialized`].
///
/// Clones share the same state.
///
/// # Examples
///
/// ```
/// use statecast::{Observable, ObservableStore, Snapshot};
/// use serde_json::{json, Value};
/// use std::sync::{Arc, Mutex};
///
/// let store = ObservableStore::new();
/// store.setup(Snapshot::new().with("user", "Noran").with("isAuthenticated", false))?;
///
/// let users = Arc::new(Mutex::new(Vec::new()));
/// let sub = store.select_state("user")?.subscribe({
///     let users = users.clone();
///     move |user: &Option<Value>| users.lock().unwrap().push(user.clone())
/// });
///
/// store.update_state(Snapshot::new().with("user", "Diaconu"))?;
/// store.update_state(Snapshot::new().with("isAuthenticated", true))?;
///
/// assert_eq!(
///     *users.lock().unwrap(),
///     vec![Some(json!("Noran")), Some(json!("Diaconu"))]
/// );
///
/// store.complete_state()?;
/// assert!(sub.is_closed());
/// # Ok::<(), statecast::StoreError>(())
/// ```
///
/// [`setup`]: ObservableStore::setup
/// [`select_state`]: ObservableStore::select_state
/// [`select`]: ObservableStore::select
/// [`complete_state`]: ObservableStore::complete_state
pub struct ObservableStore<S: State> {
    channels: Arc<RwLock<Option<Channels<S>>>>,
    config: StoreConfig,
}

impl<S: State> ObservableStore<S> {
    /// Create an uninitialized store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            channels: Arc::new(RwLock::new(None)),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn channels(&self) -> Result<Channels<S>> {
        self.channels
            .read()
            .clone()
            .ok_or(StoreError::NotInitialized)
    }

    /// Establish the initial snapshot and wire the merge pipeline.
    ///
    /// Every later update is shallow-merged into the previous snapshot and
    /// the result published as the new snapshot. A store can only be set up
    /// once.
    pub fn setup(&self, initial: S) -> Result<()> {
        let mut slot = self.channels.write();
        if slot.is_some() {
            warn!("setup called on an initialized store");
            return Err(StoreError::AlreadyInitialized);
        }

        let head = match self.config.unknown_keys {
            UnknownKeyPolicy::Accept => None,
            UnknownKeyPolicy::Warn | UnknownKeyPolicy::Reject => {
                Some(Arc::new(Mutex::new(initial.clone())))
            }
        };
        let snapshots = BehaviorSubject::new(initial.clone());
        let updates: Subject<S::Patch> = Subject::new();
        scan_into(
            &updates,
            initial,
            |state: &S, patch: &S::Patch| state.merge(patch),
            snapshots.clone(),
        );

        *slot = Some(Channels {
            snapshots,
            updates,
            head,
        });
        debug!("store initialized");
        Ok(())
    }

    /// Merge `patch` into the current snapshot and publish the result.
    ///
    /// Every snapshot subscriber is notified before this returns. After
    /// [`complete_state`](ObservableStore::complete_state) the update is
    /// dropped: under [`CompletedUpdatePolicy::Reject`] (the default) the
    /// call fails with [`StoreError::Completed`], under
    /// [`CompletedUpdatePolicy::Ignore`] it returns `Ok`. Both log a warning.
    pub fn update_state(&self, patch: S::Patch) -> Result<()> {
        let channels = self.channels()?;

        if channels.updates.is_stopped() {
            return match self.config.completed_updates {
                CompletedUpdatePolicy::Reject => {
                    warn!("update rejected: store completed");
                    Err(StoreError::Completed)
                }
                CompletedUpdatePolicy::Ignore => {
                    warn!("update ignored: store completed");
                    Ok(())
                }
            };
        }

        if let Some(head) = &channels.head {
            let mut head = head.lock();
            let unknown = head.unknown_keys(&patch);
            if !unknown.is_empty() {
                match self.config.unknown_keys {
                    UnknownKeyPolicy::Accept => {}
                    UnknownKeyPolicy::Warn => {
                        warn!(keys = ?unknown, "update introduces keys absent from the snapshot");
                    }
                    UnknownKeyPolicy::Reject => {
                        warn!(keys = ?unknown, "update rejected: unknown keys");
                        return Err(StoreError::UnknownKeys(unknown));
                    }
                }
            }
            let merged = head.merge(&patch);
            *head = merged;
        }

        trace!("applying state update");
        channels.updates.next(patch);
        Ok(())
    }

    /// Watch a projection of the state.
    ///
    /// Each subscription immediately receives the projection of the current
    /// snapshot, then a new value only when the projection differs from the
    /// one it last received.
    pub fn select<U, F>(&self, projection: F) -> Result<Selection<S, U>>
    where
        U: PartialEq + Clone + Send + Sync + 'static,
        F: Fn(&S) -> U + Send + Sync + 'static,
    {
        let channels = self.channels()?;
        Ok(Selection::new(channels.snapshots.as_feed(), projection))
    }

    /// Terminate the store.
    ///
    /// Completes the update intake; the snapshot channel completes as soon
    /// as every update accepted before this call has been merged and
    /// published (subscribers then get their completion callback and are
    /// released). Nothing else is emitted. Updates made after this call are
    /// handled by [`CompletedUpdatePolicy`]. Completing twice is a logged
    /// no-op.
    pub fn complete_state(&self) -> Result<()> {
        let channels = self.channels()?;
        if channels.updates.is_stopped() {
            warn!("complete_state called on a completed store");
            // Flushes a completion left queued by a panicking observer
            channels.updates.complete();
            return Ok(());
        }

        channels.updates.complete();
        debug!("store completed");
        Ok(())
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Result<S> {
        Ok(self.channels()?.snapshots.value())
    }

    /// Every published snapshot, starting with the current one.
    ///
    /// Unlike a selection this is not filtered: an empty update still
    /// produces a (structurally equal) snapshot here.
    pub fn snapshots(&self) -> Result<Feed<S>> {
        Ok(self.channels()?.snapshots.as_feed())
    }

    /// Whether [`complete_state`](ObservableStore::complete_state) has been
    /// called.
    pub fn is_completed(&self) -> bool {
        self.channels()
            .map(|channels| channels.updates.is_stopped())
            .unwrap_or(false)
    }

    pub fn status(&self) -> StoreStatus {
        match self.channels() {
            Ok(channels) => StoreStatus {
                initialized: true,
                snapshots_stopped: channels.snapshots.is_stopped(),
                updates_stopped: channels.updates.is_stopped(),
                snapshot_observers: channels.snapshots.observer_count(),
                update_observers: channels.updates.observer_count(),
            },
            Err(_) => StoreStatus::default(),
        }
    }
}

impl<S: State + Keyed> ObservableStore<S> {
    /// Watch the value stored under `key`.
    ///
    /// Keys the state doesn't have yield `None` until an update introduces
    /// them.
    pub fn select_state(&self, key: impl Into<String>) -> Result<Selection<S, Option<Value>>> {
        let key = key.into();
        self.select(move |state: &S| state.field(&key))
    }
}

impl<S: State> Default for ObservableStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Clone for ObservableStore<S> {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            config: self.config,
        }
    }
}
