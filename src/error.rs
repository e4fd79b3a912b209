//! Error types for vring.

use thiserror::Error;

/// Crate-wide result alias for fallible setup operations.
pub type Result<T> = std::result::Result<T, DisruptorError>;

/// Errors a queue can report during setup.
///
/// Steady-state operations (`claim`, `publish`, `next`) never return this type: their only
/// non-OK outcomes are the sentinel [`crate::ConsumerStatus::Eof`] / [`crate::ConsumerStatus::Flush`]
/// values, which are not errors.
#[derive(Error, Debug)]
pub enum DisruptorError {
    /// Invalid arguments supplied at setup (bad batch size, duplicate dependency, etc).
    #[error("invalid arguments: {message}")]
    Arguments { message: String },
}

impl DisruptorError {
    pub fn arguments(message: impl Into<String>) -> Self {
        Self::Arguments { message: message.into() }
    }
}
