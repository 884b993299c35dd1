//! Error types for statecast

use thiserror::Error;

/// Errors raised by [`ObservableStore`](crate::ObservableStore) and configuration loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store not initialized: call setup() before any other operation")]
    NotInitialized,

    #[error("store already initialized")]
    AlreadyInitialized,

    #[error("store completed: update rejected")]
    Completed,

    #[error("update introduces keys absent from the snapshot: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Config(err.to_string())
    }
}

/// A terminal failure pushed through a subject with `error`.
///
/// Observers receive it through their [`on_error`](crate::Observer::on_error)
/// callback; the subject delivers nothing after it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StreamError {
    message: String,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for StreamError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for StreamError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<StoreError> for StreamError {
    fn from(err: StoreError) -> Self {
        Self::new(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
