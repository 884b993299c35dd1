use crate::error::StreamError;
use crate::runtime::{Observer, ObserverRegistry, Subscription};
use std::sync::Arc;

/// A source of values that observers can subscribe to.
pub trait Observable<T> {
    /// Register an observer and return its subscription handle.
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription;

    /// Subscribe with a `next` callback only.
    fn subscribe<F>(&self, next: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_observer(Observer::new(next))
    }
}

/// A destination values can be pushed into. Every subject is one.
pub trait Sink<T> {
    fn next(&self, value: T);

    fn complete(&self);

    fn error(&self, err: StreamError);

    /// Turn this sink into an observer of another source, so every value,
    /// completion and error of that source is pushed into it.
    ///
    /// ```
    /// use statecast::{BehaviorSubject, Observable, ReplaySubject, Sink};
    ///
    /// let ticks = ReplaySubject::unbounded();
    /// let latest = BehaviorSubject::new(0);
    /// let _link = ticks.subscribe_observer(latest.clone().into_observer());
    ///
    /// ticks.next(1);
    /// ticks.next(2);
    /// assert_eq!(latest.value(), 2);
    /// ```
    fn into_observer(self) -> Observer<T>
    where
        Self: Clone + Send + Sync + Sized + 'static,
        T: Clone + 'static,
    {
        let on_complete = self.clone();
        let on_error = self.clone();
        Observer::new(move |value: &T| self.next(value.clone()))
            .on_complete(move || on_complete.complete())
            .on_error(move |err: &StreamError| on_error.error(err.clone()))
    }
}

/// Subscribe-only view of a subject.
///
/// Hand a `Feed` to consumers that should observe a subject without being
/// able to push values into it or complete it.
pub struct Feed<T> {
    registry: Arc<ObserverRegistry<T>>,
}

impl<T> Feed<T> {
    pub(crate) fn new(registry: Arc<ObserverRegistry<T>>) -> Self {
        Self { registry }
    }
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Send + Sync + 'static> Observable<T> for Feed<T> {
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        self.registry.register(observer)
    }
}
