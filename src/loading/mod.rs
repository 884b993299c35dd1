//! Shared loading indicators.
//!
//! A loading indicator is a two-state flag broadcast to any number of
//! independent readers. Construct one explicitly and hand clones of it to
//! whatever needs to toggle or observe it; clones share the same channel.

mod loading;

pub use loading::{LoadingBehaviorService, LoadingService};
