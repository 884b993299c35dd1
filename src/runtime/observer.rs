use crate::error::StreamError;
use tracing::warn;

pub(crate) type NextFn<T> = Box<dyn Fn(&T) + Send + Sync>;
pub(crate) type CompleteFn = Box<dyn Fn() + Send + Sync>;
pub(crate) type ErrorFn = Box<dyn Fn(&StreamError) + Send + Sync>;

/// The terminal half of an observer, carried over unchanged when an
/// operator wraps the `next` callback.
pub(crate) struct Terminal {
    complete: Option<CompleteFn>,
    error: Option<ErrorFn>,
}

/// Callbacks attached to a subject by a subscription.
///
/// `next` receives every delivered value. A source ends with exactly one of
/// `complete` or `error`, after which no further values arrive.
///
/// # Examples
///
/// ```
/// use statecast::{Observable, Observer, Subject};
/// use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
///
/// let done = Arc::new(AtomicBool::new(false));
/// let subject = Subject::new();
///
/// let _sub = subject.subscribe_observer(
///     Observer::new(|value: &i32| println!("next {value}")).on_complete({
///         let done = done.clone();
///         move || done.store(true, Ordering::SeqCst)
///     }),
/// );
///
/// subject.next(1);
/// subject.complete();
/// assert!(done.load(Ordering::SeqCst));
/// ```
pub struct Observer<T> {
    next: NextFn<T>,
    terminal: Terminal,
}

impl<T> Observer<T> {
    /// Create an observer from a `next` callback.
    pub fn new<F>(next: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            next: Box::new(next),
            terminal: Terminal {
                complete: None,
                error: None,
            },
        }
    }

    /// Attach a completion callback.
    pub fn on_complete<F>(mut self, complete: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.terminal.complete = Some(Box::new(complete));
        self
    }

    /// Attach an error callback.
    ///
    /// An error reaching an observer without one is logged and otherwise
    /// dropped.
    pub fn on_error<F>(mut self, error: F) -> Self
    where
        F: Fn(&StreamError) + Send + Sync + 'static,
    {
        self.terminal.error = Some(Box::new(error));
        self
    }

    pub(crate) fn from_parts(next: NextFn<T>, terminal: Terminal) -> Self {
        Self { next, terminal }
    }

    pub(crate) fn into_parts(self) -> (NextFn<T>, Terminal) {
        (self.next, self.terminal)
    }

    pub(crate) fn next(&self, value: &T) {
        (self.next)(value);
    }

    pub(crate) fn complete(&self) {
        if let Some(complete) = &self.terminal.complete {
            complete();
        }
    }

    pub(crate) fn error(&self, err: &StreamError) {
        match &self.terminal.error {
            Some(error) => error(err),
            None => warn!(error = %err, "unhandled error reached an observer"),
        }
    }
}
