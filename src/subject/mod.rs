//! Multicast subjects.
//!
//! This module provides the broadcast channels the store is built from:
//! - `Subject`: plain multicast, nothing replayed
//! - `BehaviorSubject`: replays its current value to every new subscriber
//! - `ReplaySubject`: replays a bounded buffer of recent values
//! - `AsyncSubject`: emits only its final value, on completion
//!
//! Every subject hands out a subscribe-only [`Feed`] through `as_feed`, and
//! every subject is a [`Sink`], so it can observe another source directly.

mod async_subject;
mod behavior;
mod feed;
mod replay;
mod subject;

pub use async_subject::AsyncSubject;
pub use behavior::BehaviorSubject;
pub use feed::{Feed, Observable, Sink};
pub use replay::ReplaySubject;
pub use subject::Subject;
