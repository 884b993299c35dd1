//! # Statecast
//!
//! An observable key-value state store, and the small set of multicast
//! primitives it is built from.
//!
//! ## Store (High-level state management)
//!
//! - `ObservableStore<S>` - Holds a snapshot of named state, merges partial
//!   updates into it and publishes every new snapshot
//! - `select_state(key)` - Watch one key; re-notified only when its value changes
//! - `Snapshot` - Dynamically shaped state (string keys to JSON values)
//! - `State` - Implement for your own structs to get typed partial updates
//!
//! ## Subjects (Low-level primitives)
//!
//! - `Subject<T>` - Multicast channel with no memory
//! - `BehaviorSubject<T>` - Replays its current value to new subscribers
//! - `ReplaySubject<T>` - Replays a bounded buffer of recent values
//! - `AsyncSubject<T>` - Emits only its last value, on completion
//! - `Selection<S, U>` - Per-subscriber distinct-by-projection view
//! - `share` / `share_replay` - One upstream subscription shared by many
//!   subscribers
//! - `Sink` - Any subject can observe another source and relay it
//!
//! ## Loading indicators
//!
//! - `LoadingService` / `LoadingBehaviorService` - Shared loading flags,
//!   constructed explicitly and passed by handle

pub mod config;
pub mod error;
pub mod loading;
pub mod operators;
pub mod runtime;
pub mod store;
pub mod subject;

// Re-export main types for convenience
pub use config::StoreConfig;
pub use error::{Result, StoreError, StreamError};
pub use loading::{LoadingBehaviorService, LoadingService};
pub use operators::{Selection, Shared};
pub use runtime::{Observer, Subscription, SubscriptionGuard};
pub use store::{Keyed, ObservableStore, Snapshot, State, StoreStatus};
pub use subject::{
    AsyncSubject, BehaviorSubject, Feed, Observable, ReplaySubject, Sink, Subject,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = ObservableStore::new();
        store.setup(Snapshot::new().with("count", 0)).unwrap();
        store.update_state(Snapshot::new().with("count", 42)).unwrap();
        assert_eq!(store.snapshot().unwrap().get("count"), Some(&serde_json::json!(42)));
    }
}
