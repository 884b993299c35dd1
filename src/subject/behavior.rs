use super::{Feed, Observable, Sink};
use crate::error::StreamError;
use crate::runtime::{Event, Observer, ObserverRegistry, Subscription};
use std::sync::Arc;
use tracing::debug;

/// A subject that always holds a current value.
///
/// Every new subscriber immediately receives the current value, then every
/// value pushed afterwards. Once completed, new subscribers receive only the
/// completion.
///
/// # Examples
///
/// ```
/// use statecast::{BehaviorSubject, Observable};
/// use std::sync::{Arc, Mutex};
///
/// let subject = BehaviorSubject::new(String::from("Hello"));
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let _sub = subject.subscribe({
///     let seen = seen.clone();
///     move |v: &String| seen.lock().unwrap().push(v.clone())
/// });
/// subject.next(String::from("World"));
///
/// assert_eq!(*seen.lock().unwrap(), vec!["Hello", "World"]);
/// assert_eq!(subject.value(), "World");
/// ```
pub struct BehaviorSubject<T> {
    registry: Arc<ObserverRegistry<T>>,
    initial: Arc<T>,
}

impl<T: Send + Sync + 'static> BehaviorSubject<T> {
    pub fn new(initial: T) -> Self {
        let initial = Arc::new(initial);
        Self {
            registry: ObserverRegistry::seeded(Arc::clone(&initial)),
            initial,
        }
    }

    /// Make `value` current and push it to every observer. Ignored after
    /// completion.
    pub fn next(&self, value: T) {
        self.registry.emit(Event::Next(Arc::new(value)));
    }

    pub fn complete(&self) {
        if self.registry.emit(Event::Complete) {
            debug!("behavior subject completed");
        }
    }

    /// Fail the subject. Later subscribers receive only the error.
    pub fn error(&self, err: impl Into<StreamError>) {
        let err = err.into();
        if self.registry.emit(Event::Error(err.clone())) {
            debug!(error = %err, "behavior subject errored");
        }
    }

    /// Shared handle to the current value.
    ///
    /// A value pushed from inside an observer callback becomes current once
    /// the delivery round in progress finishes.
    pub fn current(&self) -> Arc<T> {
        self.registry
            .latest()
            .unwrap_or_else(|| Arc::clone(&self.initial))
    }

    pub fn is_stopped(&self) -> bool {
        self.registry.is_stopped()
    }

    pub fn observer_count(&self) -> usize {
        self.registry.observer_count()
    }

    pub fn as_feed(&self) -> Feed<T> {
        Feed::new(Arc::clone(&self.registry))
    }
}

impl<T: Clone + Send + Sync + 'static> BehaviorSubject<T> {
    /// A clone of the current value.
    pub fn value(&self) -> T {
        T::clone(&self.current())
    }
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            initial: Arc::clone(&self.initial),
        }
    }
}

impl<T: Send + Sync + 'static> Observable<T> for BehaviorSubject<T> {
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        self.registry.register(observer)
    }
}

impl<T: Send + Sync + 'static> Sink<T> for BehaviorSubject<T> {
    fn next(&self, value: T) {
        BehaviorSubject::next(self, value);
    }

    fn complete(&self) {
        BehaviorSubject::complete(self);
    }

    fn error(&self, err: StreamError) {
        BehaviorSubject::error(self, err);
    }
}
