//! The observable state store.
//!
//! A store holds one snapshot of named state, merges partial updates into
//! it, and lets consumers watch single keys or projections for changes.

mod state;
mod store;

pub use state::{Keyed, Snapshot, State};
pub use store::{ObservableStore, StoreStatus};
