use crate::error::StreamError;
use crate::runtime::{Observer, Subscription};
use crate::subject::{BehaviorSubject, Observable};
use parking_lot::Mutex;

/// Fold each value of `source` into an accumulator seeded with `seed`, and
/// publish every new accumulator through `target`.
///
/// Completing `source` completes `target`, after every value queued ahead
/// of the completion has been folded. An error from `source` fails `target`.
///
/// # Examples
///
/// ```
/// use statecast::operators::scan_into;
/// use statecast::{BehaviorSubject, Subject};
///
/// let deltas = Subject::new();
/// let total = BehaviorSubject::new(0);
/// let _pipeline = scan_into(&deltas, 0, |acc: &i32, d: &i32| acc + d, total.clone());
///
/// deltas.next(2);
/// deltas.next(3);
/// assert_eq!(total.value(), 5);
/// ```
pub fn scan_into<P, S, O, F>(source: &O, seed: S, fold: F, target: BehaviorSubject<S>) -> Subscription
where
    P: 'static,
    S: Clone + Send + Sync + 'static,
    O: Observable<P>,
    F: Fn(&S, &P) -> S + Send + Sync + 'static,
{
    let acc = Mutex::new(seed);
    let on_complete = target.clone();
    let on_error = target.clone();
    source.subscribe_observer(
        Observer::new(move |item: &P| {
            let next = {
                let mut acc = acc.lock();
                let next = fold(&acc, item);
                *acc = next.clone();
                next
            };
            target.next(next);
        })
        .on_complete(move || on_complete.complete())
        .on_error(move |err: &StreamError| on_error.error(err.clone())),
    )
}
