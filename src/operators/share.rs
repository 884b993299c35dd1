use crate::error::StreamError;
use crate::runtime::{Event, Observer, ObserverRegistry, Subscription};
use crate::subject::Observable;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

struct Connection<T> {
    generation: u64,
    registry: Arc<ObserverRegistry<T>>,
    upstream: Option<Subscription>,
    subscribers: usize,
    // The source completed; the replay buffer stays for late subscribers
    retained: bool,
}

struct ShareState<T> {
    generation: u64,
    connection: Option<Connection<T>>,
}

struct SharedInner<T, O> {
    source: O,
    replay: Option<usize>,
    state: Mutex<ShareState<T>>,
}

/// A source shared between every subscriber through one upstream
/// subscription.
///
/// The first subscriber connects to the source; later subscribers join the
/// same connection. When the last subscriber unsubscribes the connection is
/// dropped, and the next subscriber connects afresh. Built with [`share`]
/// or [`share_replay`].
pub struct Shared<T, O> {
    inner: Arc<SharedInner<T, O>>,
}

/// Multicast `source`: subscribers share one upstream subscription and see
/// only the values emitted while they are subscribed.
///
/// Completion or an error from the source resets the connection, so a later
/// subscriber subscribes to the source again.
///
/// # Examples
///
/// ```
/// use statecast::operators::share;
/// use statecast::{Observable, Subject};
///
/// let ticks: Subject<u32> = Subject::new();
/// let shared = share(ticks.as_feed());
///
/// let one = shared.subscribe(|n: &u32| println!("one {n}"));
/// let two = shared.subscribe(|n: &u32| println!("two {n}"));
/// assert_eq!(ticks.observer_count(), 1);
///
/// ticks.next(1);
/// one.unsubscribe();
/// two.unsubscribe();
/// assert_eq!(ticks.observer_count(), 0);
/// ```
pub fn share<T, O>(source: O) -> Shared<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: Observable<T> + Send + Sync + 'static,
{
    Shared::build(source, None)
}

/// Like [`share`], but new subscribers first receive up to `capacity` of
/// the most recent values.
///
/// Once the source completes the buffer is kept: later subscribers receive
/// it followed by the completion, without reconnecting. An error still
/// resets the connection.
pub fn share_replay<T, O>(source: O, capacity: usize) -> Shared<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: Observable<T> + Send + Sync + 'static,
{
    Shared::build(source, Some(capacity))
}

impl<T, O> Shared<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: Observable<T> + Send + Sync + 'static,
{
    fn build(source: O, replay: Option<usize>) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                source,
                replay,
                state: Mutex::new(ShareState {
                    generation: 0,
                    connection: None,
                }),
            }),
        }
    }

    /// Whether an upstream subscription is currently open.
    pub fn is_connected(&self) -> bool {
        self.inner
            .state
            .lock()
            .connection
            .as_ref()
            .is_some_and(|c| c.upstream.is_some() && !c.retained)
    }

    /// Number of subscribers on the current connection.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .connection
            .as_ref()
            .map_or(0, |c| c.registry.observer_count())
    }
}

impl<T, O> SharedInner<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: Observable<T> + Send + Sync + 'static,
{
    fn connect(self: &Arc<Self>, generation: u64, registry: &Arc<ObserverRegistry<T>>) {
        debug!(generation, "connecting shared source");
        let forward = Arc::clone(registry);
        let (on_complete, completed) = (Arc::downgrade(self), Arc::clone(registry));
        let (on_error, failed) = (Arc::downgrade(self), Arc::clone(registry));

        let upstream = self.source.subscribe_observer(
            Observer::new(move |value: &T| {
                forward.emit(Event::Next(Arc::new(value.clone())));
            })
            .on_complete(move || terminate(&on_complete, generation, &completed, Event::Complete))
            .on_error(move |err: &StreamError| {
                terminate(&on_error, generation, &failed, Event::Error(err.clone()))
            }),
        );

        // The source may have ended, or every subscriber left, while subscribing
        let stale = {
            let mut state = self.state.lock();
            match state.connection.as_mut() {
                Some(c) if c.generation == generation && !c.retained => {
                    c.upstream = Some(upstream);
                    None
                }
                _ => Some(upstream),
            }
        };
        if let Some(upstream) = stale {
            upstream.unsubscribe();
        }
    }

    fn release(&self, generation: u64) {
        let upstream = {
            let mut state = self.state.lock();
            let Some(connection) = state.connection.as_mut() else {
                return;
            };
            if connection.generation != generation || connection.retained {
                return;
            }
            connection.subscribers = connection.subscribers.saturating_sub(1);
            if connection.subscribers > 0 {
                return;
            }
            state.connection.take().and_then(|c| c.upstream)
        };
        if let Some(upstream) = upstream {
            debug!(generation, "last subscriber left; disconnecting shared source");
            upstream.unsubscribe();
        }
    }
}

fn terminate<T, O>(
    inner: &Weak<SharedInner<T, O>>,
    generation: u64,
    registry: &ObserverRegistry<T>,
    event: Event<T>,
) where
    T: Send + Sync + 'static,
{
    if let Some(inner) = inner.upgrade() {
        let mut state = inner.state.lock();
        let current = state
            .connection
            .as_ref()
            .is_some_and(|c| c.generation == generation);
        let keep = inner.replay.is_some() && matches!(event, Event::Complete);
        if current && keep {
            if let Some(c) = state.connection.as_mut() {
                c.retained = true;
                c.upstream = None;
            }
        } else if current {
            state.connection = None;
        }
    }
    registry.emit(event);
}

impl<T, O> Clone for Shared<T, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, O> Observable<T> for Shared<T, O>
where
    T: Clone + Send + Sync + 'static,
    O: Observable<T> + Send + Sync + 'static,
{
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        let (generation, registry, connect) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            match state.connection.as_mut() {
                Some(c) => {
                    c.subscribers += 1;
                    (c.generation, Arc::clone(&c.registry), false)
                }
                None => {
                    state.generation += 1;
                    let registry = match self.inner.replay {
                        Some(capacity) => ObserverRegistry::new(capacity, true),
                        None => ObserverRegistry::new(0, false),
                    };
                    state.connection = Some(Connection {
                        generation: state.generation,
                        registry: Arc::clone(&registry),
                        upstream: None,
                        subscribers: 1,
                        retained: false,
                    });
                    (state.generation, registry, true)
                }
            }
        };

        let subscription = registry.register(observer);
        if connect {
            self.inner.connect(generation, &registry);
        } else {
            trace!(generation, "joined shared connection");
        }

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(subscription.closed_flag(), move || {
            subscription.unsubscribe();
            if let Some(inner) = inner.upgrade() {
                inner.release(generation);
            }
        })
    }
}
