use crate::runtime::{Observer, Subscription};
use crate::subject::{Feed, Observable};
use parking_lot::Mutex;
use std::sync::Arc;

/// A projection of a feed that only re-emits when the projected value changes.
///
/// Each subscription keeps its own "last seen" value, starting from the
/// moment it subscribes: the first value it receives is always delivered,
/// and afterwards a value is delivered only if it differs from the previous
/// one delivered to that same subscription. Subscribing again starts over.
///
/// # Examples
///
/// ```
/// use statecast::operators::Selection;
/// use statecast::{BehaviorSubject, Observable};
/// use std::sync::{Arc, Mutex};
///
/// let point = BehaviorSubject::new((0, 0));
/// let xs = Selection::new(point.as_feed(), |p: &(i32, i32)| p.0);
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let _sub = xs.subscribe({
///     let seen = seen.clone();
///     move |x: &i32| seen.lock().unwrap().push(*x)
/// });
/// point.next((0, 5));
/// point.next((1, 5));
///
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
/// ```
pub struct Selection<S, U> {
    source: Feed<S>,
    projection: Arc<dyn Fn(&S) -> U + Send + Sync>,
}

impl<S, U> Selection<S, U>
where
    S: Send + Sync + 'static,
    U: PartialEq + Clone + Send + Sync + 'static,
{
    pub fn new<F>(source: Feed<S>, projection: F) -> Self
    where
        F: Fn(&S) -> U + Send + Sync + 'static,
    {
        Self {
            source,
            projection: Arc::new(projection),
        }
    }
}

impl<S, U> Clone for Selection<S, U> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            projection: Arc::clone(&self.projection),
        }
    }
}

impl<S, U> Observable<U> for Selection<S, U>
where
    S: Send + Sync + 'static,
    U: PartialEq + Clone + Send + Sync + 'static,
{
    fn subscribe_observer(&self, observer: Observer<U>) -> Subscription {
        let (next, terminal) = observer.into_parts();
        let projection = Arc::clone(&self.projection);
        let last: Mutex<Option<U>> = Mutex::new(None);

        let forward = move |state: &S| {
            let value = projection(state);
            {
                let mut last = last.lock();
                if last.as_ref() == Some(&value) {
                    return;
                }
                *last = Some(value.clone());
            }
            next(&value);
        };
        self.source
            .subscribe_observer(Observer::from_parts(Box::new(forward), terminal))
    }
}

/// A view of `source` that skips values equal to the previous one.
pub fn distinct_until_changed<T>(source: Feed<T>) -> Selection<T, T>
where
    T: PartialEq + Clone + Send + Sync + 'static,
{
    Selection::new(source, T::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BehaviorSubject, Subject};

    #[test]
    fn skips_repeats() {
        let terms = Subject::new();
        let distinct = distinct_until_changed(terms.as_feed());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = distinct.subscribe({
            let seen = seen.clone();
            move |t: &String| seen.lock().push(t.clone())
        });

        for term in ["ru", "rus", "rus", "rust", "rust"] {
            terms.next(term.to_string());
        }

        assert_eq!(*seen.lock(), vec!["ru", "rus", "rust"]);
    }

    #[test]
    fn baselines_are_per_subscriber() {
        let source = BehaviorSubject::new(1);
        let selection = distinct_until_changed(source.as_feed());

        let first = Arc::new(Mutex::new(Vec::new()));
        let _a = selection.subscribe({
            let first = first.clone();
            move |v: &i32| first.lock().push(*v)
        });
        source.next(2);

        let second = Arc::new(Mutex::new(Vec::new()));
        let _b = selection.subscribe({
            let second = second.clone();
            move |v: &i32| second.lock().push(*v)
        });
        source.next(2);
        source.next(3);

        assert_eq!(*first.lock(), vec![1, 2, 3]);
        assert_eq!(*second.lock(), vec![2, 3]);
    }

    #[test]
    fn completion_passes_through() {
        let source = BehaviorSubject::new(0);
        let selection = Selection::new(source.as_feed(), |v: &i32| *v > 0);
        let completed = Arc::new(Mutex::new(false));
        let sub = selection.subscribe_observer(Observer::new(|_: &bool| {}).on_complete({
            let completed = completed.clone();
            move || *completed.lock() = true
        }));

        source.complete();
        assert!(*completed.lock());
        assert!(sub.is_closed());
    }
}
