use crate::subject::{BehaviorSubject, Feed, Subject};
use tracing::trace;

/// A loading flag with no memory.
///
/// Readers only learn about toggles that happen after they subscribe.
#[derive(Clone, Default)]
pub struct LoadingService {
    loading: Subject<bool>,
}

impl LoadingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_loading(&self) {
        trace!("show loading");
        self.loading.next(true);
    }

    pub fn hide_loading(&self) {
        trace!("hide loading");
        self.loading.next(false);
    }

    /// Subscribe-only view of the flag.
    pub fn status(&self) -> Feed<bool> {
        self.loading.as_feed()
    }
}

/// A loading flag that remembers its state.
///
/// Starts out loading. Every new reader immediately receives the current
/// state.
///
/// # Examples
///
/// ```
/// use statecast::{LoadingBehaviorService, Observable};
/// use std::sync::{Arc, Mutex};
///
/// let loading = LoadingBehaviorService::new();
/// let overlay_open = Arc::new(Mutex::new(false));
/// let _sub = loading.status().subscribe({
///     let overlay_open = overlay_open.clone();
///     move |on: &bool| *overlay_open.lock().unwrap() = *on
/// });
/// assert!(*overlay_open.lock().unwrap());
///
/// loading.hide_loading();
/// assert!(!*overlay_open.lock().unwrap());
/// ```
#[derive(Clone)]
pub struct LoadingBehaviorService {
    loading: BehaviorSubject<bool>,
}

impl LoadingBehaviorService {
    pub fn new() -> Self {
        Self {
            loading: BehaviorSubject::new(true),
        }
    }

    pub fn show_loading(&self) {
        trace!("show loading");
        self.loading.next(true);
    }

    pub fn hide_loading(&self) {
        trace!("hide loading");
        self.loading.next(false);
    }

    pub fn is_loading(&self) -> bool {
        self.loading.value()
    }

    pub fn status(&self) -> Feed<bool> {
        self.loading.as_feed()
    }
}

impl Default for LoadingBehaviorService {
    fn default() -> Self {
        Self::new()
    }
}
