use super::{Feed, Observable, Sink};
use crate::error::StreamError;
use crate::runtime::{Event, Observer, ObserverRegistry, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// A subject that only emits the last value it received, and only once it
/// completes.
///
/// Subscribers registered before completion receive the last value and the
/// completion together; subscribers registered afterwards receive the same
/// pair immediately. Completing without any value emits only the completion.
pub struct AsyncSubject<T> {
    registry: Arc<ObserverRegistry<T>>,
    last: Arc<Mutex<Option<T>>>,
}

impl<T: Send + Sync + 'static> AsyncSubject<T> {
    pub fn new() -> Self {
        Self {
            registry: ObserverRegistry::new(1, true),
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// Remember `value` as the candidate final value.
    pub fn next(&self, value: T) {
        if self.registry.is_stopped() {
            return;
        }
        *self.last.lock() = Some(value);
    }

    pub fn complete(&self) {
        if self.registry.is_stopped() {
            return;
        }
        let last = self.last.lock().take();
        if let Some(value) = last {
            self.registry.emit(Event::Next(Arc::new(value)));
        }
        if self.registry.emit(Event::Complete) {
            debug!("async subject completed");
        }
    }

    /// Fail the subject. The remembered value is discarded and never
    /// emitted.
    pub fn error(&self, err: impl Into<StreamError>) {
        if self.registry.is_stopped() {
            return;
        }
        self.last.lock().take();
        let err = err.into();
        if self.registry.emit(Event::Error(err.clone())) {
            debug!(error = %err, "async subject errored");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.registry.is_stopped()
    }

    pub fn as_feed(&self) -> Feed<T> {
        Feed::new(Arc::clone(&self.registry))
    }
}

impl<T: Send + Sync + 'static> Default for AsyncSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AsyncSubject<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            last: Arc::clone(&self.last),
        }
    }
}

impl<T: Send + Sync + 'static> Observable<T> for AsyncSubject<T> {
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        self.registry.register(observer)
    }
}

impl<T: Send + Sync + 'static> Sink<T> for AsyncSubject<T> {
    fn next(&self, value: T) {
        AsyncSubject::next(self, value);
    }

    fn complete(&self) {
        AsyncSubject::complete(self);
    }

    fn error(&self, err: StreamError) {
        AsyncSubject::error(self, err);
    }
}
