use super::{Feed, Observable, Sink};
use crate::error::StreamError;
use crate::runtime::{Event, Observer, ObserverRegistry, Subscription};
use std::sync::Arc;
use tracing::debug;

/// A subject that replays a bounded buffer of recent values.
///
/// New subscribers first receive up to `capacity` of the most recent values,
/// oldest first. Unlike [`BehaviorSubject`](super::BehaviorSubject), the
/// buffer is still replayed after completion, followed by the completion.
pub struct ReplaySubject<T> {
    registry: Arc<ObserverRegistry<T>>,
}

impl<T: Send + Sync + 'static> ReplaySubject<T> {
    /// Replay up to `capacity` values.
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: ObserverRegistry::new(capacity, true),
        }
    }

    /// Replay every value ever pushed.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn next(&self, value: T) {
        self.registry.emit(Event::Next(Arc::new(value)));
    }

    pub fn complete(&self) {
        if self.registry.emit(Event::Complete) {
            debug!("replay subject completed");
        }
    }

    /// Fail the subject. Later subscribers receive the buffer, then the
    /// error.
    pub fn error(&self, err: impl Into<StreamError>) {
        let err = err.into();
        if self.registry.emit(Event::Error(err.clone())) {
            debug!(error = %err, "replay subject errored");
        }
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

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Send + Sync + 'static> Observable<T> for ReplaySubject<T> {
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        self.registry.register(observer)
    }
}

impl<T: Send + Sync + 'static> Sink<T> for ReplaySubject<T> {
    fn next(&self, value: T) {
        ReplaySubject::next(self, value);
    }

    fn complete(&self) {
        ReplaySubject::complete(self);
    }

    fn error(&self, err: StreamError) {
        ReplaySubject::error(self, err);
    }
}
