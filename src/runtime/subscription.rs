use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Teardown = Box<dyn FnOnce() + Send>;

/// Handle to a live subscription.
///
/// Dropping a `Subscription` does not unsubscribe; call [`unsubscribe`]
/// explicitly, or convert it with [`into_guard`] to tie the subscription to
/// a scope.
///
/// [`unsubscribe`]: Subscription::unsubscribe
/// [`into_guard`]: Subscription::into_guard
pub struct Subscription {
    closed: Arc<AtomicBool>,
    teardown: Mutex<Option<Teardown>>,
}

impl Subscription {
    pub(crate) fn new<F>(closed: Arc<AtomicBool>, teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            closed,
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    /// A subscription that is already closed, returned when subscribing to a
    /// source that has completed.
    pub(crate) fn closed() -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(true)),
            teardown: Mutex::new(None),
        }
    }

    /// The flag this subscription reports through [`is_closed`], for
    /// handles that wrap it.
    ///
    /// [`is_closed`]: Subscription::is_closed
    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    /// Stop receiving values. Idempotent, and safe to call from inside the
    /// subscription's own callback.
    pub fn unsubscribe(&self) {
        self.closed.store(true, Ordering::Release);
        let teardown = self.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Whether this subscription will receive no further values, either
    /// because it was unsubscribed or because its source completed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Wrap this subscription in a guard that unsubscribes on drop.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { subscription: self }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// RAII guard for subscriptions.
pub struct SubscriptionGuard {
    subscription: Subscription,
}

impl SubscriptionGuard {
    pub fn is_closed(&self) -> bool {
        self.subscription.is_closed()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn teardown_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let sub = Subscription::new(Arc::new(AtomicBool::new(false)), move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!sub.is_closed());
        sub.unsubscribe();
        sub.unsubscribe();

        assert!(sub.is_closed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_unsubscribes_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let guard = Subscription::new(Arc::new(AtomicBool::new(false)), move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })
        .into_guard();

        assert!(!guard.is_closed());
        drop(guard);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closed_subscription() {
        let sub = Subscription::closed();
        assert!(sub.is_closed());
        sub.unsubscribe();
    }
}
