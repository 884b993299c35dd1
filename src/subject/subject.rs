use super::{Feed, Observable, Sink};
use crate::error::StreamError;
use crate::runtime::{Event, Observer, ObserverRegistry, Subscription};
use std::sync::Arc;
use tracing::debug;

/// A multicast channel with no memory.
///
/// Values pushed with [`next`](Subject::next) reach the observers subscribed
/// at that moment; later subscribers only see later values.
///
/// # Examples
///
/// ```
/// use statecast::{Observable, Subject};
/// use std::sync::{Arc, Mutex};
///
/// let subject = Subject::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// subject.next(1);
/// let _sub = subject.subscribe({
///     let seen = seen.clone();
///     move |v: &i32| seen.lock().unwrap().push(*v)
/// });
/// subject.next(2);
///
/// assert_eq!(*seen.lock().unwrap(), vec![2]);
/// ```
pub struct Subject<T> {
    registry: Arc<ObserverRegistry<T>>,
}

impl<T: Send + Sync + 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            registry: ObserverRegistry::new(0, false),
        }
    }

    /// Push a value to every current observer. Ignored after completion.
    pub fn next(&self, value: T) {
        self.registry.emit(Event::Next(Arc::new(value)));
    }

    /// Complete the subject: observers get their completion callback and
    /// are released, and further values are ignored.
    pub fn complete(&self) {
        if self.registry.emit(Event::Complete) {
            debug!("subject completed");
        }
    }

    /// Fail the subject: observers get their error callback and are
    /// released, and later subscribers receive the same error.
    pub fn error(&self, err: impl Into<StreamError>) {
        let err = err.into();
        if self.registry.emit(Event::Error(err.clone())) {
            debug!(error = %err, "subject errored");
        }
    }

    /// Whether the subject has completed or failed.
    pub fn is_stopped(&self) -> bool {
        self.registry.is_stopped()
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.registry.observer_count()
    }

    pub fn as_feed(&self) -> Feed<T> {
        Feed::new(Arc::clone(&self.registry))
    }
}

impl<T: Send + Sync + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Send + Sync + 'static> Observable<T> for Subject<T> {
    fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        self.registry.register(observer)
    }
}

impl<T: Send + Sync + 'static> Sink<T> for Subject<T> {
    fn next(&self, value: T) {
        Subject::next(self, value);
    }

    fn complete(&self) {
        Subject::complete(self);
    }

    fn error(&self, err: StreamError) {
        Subject::error(self, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplaySubject;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn multicasts_to_every_subscriber() {
        let subject = Subject::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = subject.subscribe({
            let seen = seen.clone();
            move |v: &String| seen.lock().push(format!("one:{v}"))
        });
        subject.next("Hello".to_string());
        let second = subject.subscribe({
            let seen = seen.clone();
            move |v: &String| seen.lock().push(format!("two:{v}"))
        });
        subject.next("World".to_string());

        assert_eq!(*seen.lock(), vec!["one:Hello", "one:World", "two:World"]);
        first.unsubscribe();
        second.unsubscribe();
        assert!(first.is_closed() && second.is_closed());
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn complete_notifies_and_stops() {
        let subject = Subject::new();
        let completions = Arc::new(AtomicUsize::new(0));
        let values = Arc::new(AtomicUsize::new(0));

        let sub = subject.subscribe_observer(
            Observer::new({
                let values = values.clone();
                move |_: &i32| {
                    values.fetch_add(1, Ordering::SeqCst);
                }
            })
            .on_complete({
                let completions = completions.clone();
                move || {
                    completions.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        subject.complete();
        subject.complete();
        subject.next(1);

        assert!(subject.is_stopped());
        assert!(sub.is_closed());
        assert_eq!(values.load(Ordering::SeqCst), 0);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn late_subscriber_to_completed_subject_completes_immediately() {
        let subject: Subject<i32> = Subject::new();
        subject.complete();

        let completed = Arc::new(AtomicUsize::new(0));
        let sub = subject.subscribe_observer(Observer::new(|_: &i32| {}).on_complete({
            let completed = completed.clone();
            move || {
                completed.fetch_add(1, Ordering::SeqCst);
            }
        }));

        assert!(sub.is_closed());
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_inside_callback_leaves_others_alone() {
        let subject = Subject::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let first_seen = Arc::new(Mutex::new(Vec::new()));
        let second_seen = Arc::new(Mutex::new(Vec::new()));

        let first = subject.subscribe({
            let slot = slot.clone();
            let first_seen = first_seen.clone();
            move |v: &i32| {
                first_seen.lock().push(*v);
                if let Some(sub) = slot.lock().as_ref() {
                    sub.unsubscribe();
                }
            }
        });
        *slot.lock() = Some(first);
        let _second = subject.subscribe({
            let second_seen = second_seen.clone();
            move |v: &i32| second_seen.lock().push(*v)
        });

        subject.next(1);
        subject.next(2);

        assert_eq!(*first_seen.lock(), vec![1]);
        assert_eq!(*second_seen.lock(), vec![1, 2]);
    }

    #[test]
    fn error_reaches_observers_and_late_subscribers() {
        let subject: Subject<String> = Subject::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let observer = |log: &Arc<Mutex<Vec<String>>>| {
            let values = log.clone();
            let errors = log.clone();
            Observer::new(move |v: &String| values.lock().push(format!("next:{v}")))
                .on_error(move |e: &StreamError| errors.lock().push(format!("error:{e}")))
        };

        let sub = subject.subscribe_observer(observer(&log));
        subject.error("Hello");
        subject.next("ignored".to_string());
        subject.complete();
        let late = subject.subscribe_observer(observer(&log));

        assert!(subject.is_stopped());
        assert!(sub.is_closed() && late.is_closed());
        assert_eq!(*log.lock(), vec!["error:Hello", "error:Hello"]);
    }

    #[test]
    fn subject_observes_another_source() {
        let source = ReplaySubject::unbounded();
        for v in 0..3 {
            source.next(v);
        }
        let relay = Subject::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let done = Arc::new(AtomicUsize::new(0));
        let _a = relay.subscribe_observer(
            Observer::new({
                let seen = seen.clone();
                move |v: &i32| seen.lock().push(*v)
            })
            .on_complete({
                let done = done.clone();
                move || {
                    done.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        let link = source.subscribe_observer(relay.clone().into_observer());
        source.next(3);
        source.complete();

        assert_eq!(*seen.lock(), vec![0, 1, 2, 3]);
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(relay.is_stopped());
        assert!(link.is_closed());
    }

    #[test]
    fn feed_observes_without_owning() {
        let subject = Subject::new();
        let feed = subject.as_feed();
        let count = Arc::new(AtomicUsize::new(0));

        let _sub = feed.subscribe({
            let count = count.clone();
            move |_: &u8| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        subject.next(1);
        subject.next(2);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
