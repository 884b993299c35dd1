//! Operators connecting subjects.
//!
//! - `scan_into`: fold every value of a source into a running accumulator
//!   published through a `BehaviorSubject`
//! - `Selection`: per-subscriber distinct-by-projection view of a feed
//! - `share` / `share_replay`: multicast one upstream subscription to many
//!   subscribers, connecting on the first and disconnecting after the last

mod distinct;
mod scan;
mod share;

pub use distinct::{distinct_until_changed, Selection};
pub use scan::scan_into;
pub use share::{share, share_replay, Shared};
