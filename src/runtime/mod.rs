//! Runtime support for subjects.
//!
//! This module provides the observer registry every subject is built on,
//! along with the observer callbacks and the subscription handles returned
//! to callers.

mod observer;
mod registry;
mod subscription;

pub use observer::Observer;
pub(crate) use registry::{Event, ObserverRegistry};
pub use subscription::{Subscription, SubscriptionGuard};
