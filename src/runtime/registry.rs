use super::{Observer, Subscription};
use crate::error::StreamError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{trace, warn};

type SubscriptionId = u64;

/// A notification travelling through a registry.
pub(crate) enum Event<T> {
    Next(Arc<T>),
    Complete,
    Error(StreamError),
}

impl<T> Event<T> {
    fn is_terminal(&self) -> bool {
        !matches!(self, Event::Next(_))
    }
}

struct Registered<T> {
    observer: Arc<Observer<T>>,
    closed: Arc<AtomicBool>,
}

struct RegistryState<T> {
    next_id: SubscriptionId,
    // Ordered by id, so delivery follows subscription order
    observers: BTreeMap<SubscriptionId, Registered<T>>,
    replay: VecDeque<Arc<T>>,
    replay_capacity: usize,
    replay_after_complete: bool,
    // Completion or error accepted: no further events are queued
    stopped: bool,
    // Terminal event delivered: observers have been released
    finished: bool,
    failure: Option<StreamError>,
    dispatching: bool,
    pending: VecDeque<Event<T>>,
}

impl<T> RegistryState<T> {
    fn remember(&mut self, value: &Arc<T>) {
        if self.replay_capacity == 0 {
            return;
        }
        if self.replay.len() == self.replay_capacity {
            self.replay.pop_front();
        }
        self.replay.push_back(Arc::clone(value));
    }
}

/// Observer bookkeeping shared by every subject.
///
/// Holds the registered observers, the replay buffer, and the terminal state.
/// Events are delivered one at a time: an event emitted while another is
/// being delivered (for instance from inside an observer callback) is queued
/// and delivered once the current round has reached every observer. No lock
/// is held while observer callbacks run.
///
/// If an observer panics, queued values are discarded but a queued
/// completion or error is kept, and delivered the next time the registry is
/// emitted to or subscribed to.
pub(crate) struct ObserverRegistry<T> {
    state: Mutex<RegistryState<T>>,
}

impl<T: Send + Sync + 'static> ObserverRegistry<T> {
    /// Create a registry that replays up to `replay_capacity` of the most
    /// recently delivered values to new observers.
    pub(crate) fn new(replay_capacity: usize, replay_after_complete: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RegistryState {
                next_id: 0,
                observers: BTreeMap::new(),
                replay: VecDeque::new(),
                replay_capacity,
                replay_after_complete,
                stopped: false,
                finished: false,
                failure: None,
                dispatching: false,
                pending: VecDeque::new(),
            }),
        })
    }

    /// Create a single-slot replaying registry holding `initial`.
    pub(crate) fn seeded(initial: Arc<T>) -> Arc<Self> {
        let registry = Self::new(1, false);
        registry.state.lock().replay.push_back(initial);
        registry
    }

    /// Queue an event for delivery. Returns `false` if the registry has
    /// already accepted a terminal event and this one was dropped.
    pub(crate) fn emit(&self, event: Event<T>) -> bool {
        let accepted = {
            let mut state = self.state.lock();
            if state.stopped {
                false
            } else {
                if event.is_terminal() {
                    state.stopped = true;
                }
                state.pending.push_back(event);
                if state.dispatching {
                    trace!(queued = state.pending.len(), "event queued behind active delivery");
                }
                true
            }
        };
        self.flush();
        accepted
    }

    /// Deliver queued events unless a delivery round is already running.
    fn flush(&self) {
        {
            let mut state = self.state.lock();
            if state.dispatching || state.pending.is_empty() {
                return;
            }
            state.dispatching = true;
        }

        let _reset = DispatchReset { registry: self };
        loop {
            let event = {
                let mut state = self.state.lock();
                match state.pending.pop_front() {
                    Some(event) => event,
                    None => {
                        state.dispatching = false;
                        break;
                    }
                }
            };
            self.deliver(event);
        }
    }

    fn deliver(&self, event: Event<T>) {
        if let Event::Next(value) = event {
            let targets: Vec<_> = {
                let mut state = self.state.lock();
                state.remember(&value);
                state
                    .observers
                    .values()
                    .map(|r| (Arc::clone(&r.observer), Arc::clone(&r.closed)))
                    .collect()
            };
            for (observer, closed) in targets {
                // Unsubscribed earlier in this round
                if closed.load(Ordering::Acquire) {
                    continue;
                }
                observer.next(&value);
            }
            return;
        }

        let targets = {
            let mut state = self.state.lock();
            state.finished = true;
            if let Event::Error(err) = &event {
                state.failure = Some(err.clone());
            }
            std::mem::take(&mut state.observers)
        };
        for registered in targets.into_values() {
            if registered.closed.swap(true, Ordering::AcqRel) {
                continue;
            }
            match &event {
                Event::Error(err) => registered.observer.error(err),
                _ => registered.observer.complete(),
            }
        }
    }

    /// Register an observer, replaying buffered values to it immediately.
    ///
    /// Registering with a finished registry replays (when configured to) and
    /// then completes or fails the observer at once, returning a closed
    /// subscription.
    pub(crate) fn register(self: &Arc<Self>, observer: Observer<T>) -> Subscription {
        let observer = Arc::new(observer);
        let closed = Arc::new(AtomicBool::new(false));

        let (id, replay, failure) = {
            let mut state = self.state.lock();
            if state.finished {
                let replay = if state.replay_after_complete {
                    state.replay.iter().cloned().collect()
                } else {
                    Vec::new()
                };
                (None, replay, state.failure.clone())
            } else {
                let replay: Vec<Arc<T>> = state.replay.iter().cloned().collect();
                let id = state.next_id;
                state.next_id += 1;
                state.observers.insert(
                    id,
                    Registered {
                        observer: Arc::clone(&observer),
                        closed: Arc::clone(&closed),
                    },
                );
                (Some(id), replay, None)
            }
        };

        for value in &replay {
            if closed.load(Ordering::Acquire) {
                break;
            }
            observer.next(value);
        }

        match id {
            Some(id) => {
                let registry = Arc::downgrade(self);
                let subscription = Subscription::new(closed, move || {
                    if let Some(registry) = registry.upgrade() {
                        registry.remove(id);
                    }
                });
                self.flush();
                subscription
            }
            None => {
                match failure {
                    Some(err) => observer.error(&err),
                    None => observer.complete(),
                }
                Subscription::closed()
            }
        }
    }

    fn remove(&self, id: SubscriptionId) {
        let removed = self.state.lock().observers.remove(&id);
        if let Some(registered) = removed {
            registered.closed.store(true, Ordering::Release);
        }
    }

    /// The most recently delivered value still held for replay.
    pub(crate) fn latest(&self) -> Option<Arc<T>> {
        self.state.lock().replay.back().cloned()
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }
}

/// Clears the dispatching flag if an observer panics mid-delivery, so the
/// registry stays usable. A queued terminal event survives for the next
/// flush.
struct DispatchReset<'a, T> {
    registry: &'a ObserverRegistry<T>,
}

impl<T> Drop for DispatchReset<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut state = self.registry.state.lock();
            state.dispatching = false;
            let dropped = state.pending.len();
            state.pending.retain(Event::is_terminal);
            warn!(
                dropped = dropped - state.pending.len(),
                "observer panicked; queued values discarded"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::AtomicUsize;

    fn recorder(registry: &Arc<ObserverRegistry<i32>>) -> (Arc<Mutex<Vec<i32>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sub = registry.register(Observer::new(move |v: &i32| seen_clone.lock().push(*v)));
        (seen, sub)
    }

    #[test]
    fn delivers_in_subscription_order() {
        let registry = ObserverRegistry::new(0, false);
        let order = Arc::new(Mutex::new(Vec::new()));
        let _subs: Vec<_> = (0..3)
            .map(|n| {
                let order = order.clone();
                registry.register(Observer::new(move |_: &i32| order.lock().push(n)))
            })
            .collect();

        registry.emit(Event::Next(Arc::new(1)));
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn replay_is_bounded() {
        let registry = ObserverRegistry::new(2, false);
        for v in 1..=3 {
            registry.emit(Event::Next(Arc::new(v)));
        }
        let (seen, _sub) = recorder(&registry);
        assert_eq!(*seen.lock(), vec![2, 3]);
    }

    #[test]
    fn removal_stops_delivery() {
        let registry = ObserverRegistry::new(0, false);
        let (seen, sub) = recorder(&registry);
        registry.emit(Event::Next(Arc::new(1)));
        sub.unsubscribe();
        registry.emit(Event::Next(Arc::new(2)));

        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(registry.observer_count(), 0);
    }

    #[test]
    fn nothing_delivered_after_complete() {
        let registry = ObserverRegistry::new(0, false);
        let (seen, sub) = recorder(&registry);
        assert!(registry.emit(Event::Complete));
        assert!(!registry.emit(Event::Next(Arc::new(1))));

        assert!(seen.lock().is_empty());
        assert!(sub.is_closed());
        assert!(registry.is_stopped());
        assert_eq!(registry.observer_count(), 0);
    }

    #[test]
    fn reentrant_emit_is_queued() {
        let registry: Arc<ObserverRegistry<i32>> = ObserverRegistry::new(0, false);
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner = registry.clone();
        let log_a = log.clone();
        let _a = registry.register(Observer::new(move |v: &i32| {
            log_a.lock().push(("a", *v));
            if *v == 1 {
                inner.emit(Event::Next(Arc::new(2)));
            }
        }));
        let log_b = log.clone();
        let _b = registry.register(Observer::new(move |v: &i32| log_b.lock().push(("b", *v))));

        registry.emit(Event::Next(Arc::new(1)));

        assert_eq!(
            *log.lock(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]
        );
    }

    fn on_error(errors: &Arc<Mutex<Vec<String>>>) -> impl Fn(&StreamError) + Send + Sync + 'static {
        let errors = errors.clone();
        move |e: &StreamError| errors.lock().push(e.to_string())
    }

    #[test]
    fn error_is_terminal_and_remembered() {
        let registry: Arc<ObserverRegistry<i32>> = ObserverRegistry::new(1, true);
        let errors = Arc::new(Mutex::new(Vec::new()));

        let sub = registry.register(Observer::new(|_: &i32| {}).on_error(on_error(&errors)));
        registry.emit(Event::Next(Arc::new(1)));
        assert!(registry.emit(Event::Error(StreamError::new("Hello"))));
        assert!(!registry.emit(Event::Complete));

        assert!(sub.is_closed());
        assert_eq!(registry.observer_count(), 0);
        assert_eq!(registry.state.lock().failure, Some(StreamError::new("Hello")));

        let late_values = Arc::new(Mutex::new(Vec::new()));
        let late = registry.register(
            Observer::new({
                let late_values = late_values.clone();
                move |v: &i32| late_values.lock().push(*v)
            })
            .on_error(on_error(&errors)),
        );
        assert!(late.is_closed());
        assert_eq!(*late_values.lock(), vec![1]);
        assert_eq!(*errors.lock(), vec!["Hello", "Hello"]);
    }

    #[test]
    fn queued_completion_survives_a_panicking_observer() {
        let registry: Arc<ObserverRegistry<i32>> = ObserverRegistry::new(0, false);
        let completions = Arc::new(AtomicUsize::new(0));

        let inner = registry.clone();
        let sub = registry.register(
            Observer::new(move |v: &i32| {
                inner.emit(Event::Next(Arc::new(v + 1)));
                inner.emit(Event::Complete);
                panic!("observer failed");
            })
            .on_complete({
                let completions = completions.clone();
                move || {
                    completions.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            registry.emit(Event::Next(Arc::new(1)));
        }));
        assert!(outcome.is_err());
        assert!(registry.is_stopped());
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        // The next touch delivers the stranded completion
        assert!(!registry.emit(Event::Next(Arc::new(9))));
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(sub.is_closed());
        assert_eq!(registry.observer_count(), 0);
    }

    #[test]
    fn seeded_registry_replays_initial() {
        let registry = ObserverRegistry::seeded(Arc::new(7));
        let (seen, _sub) = recorder(&registry);
        assert_eq!(*seen.lock(), vec![7]);
        assert_eq!(registry.latest().map(|v| *v), Some(7));
    }
}
