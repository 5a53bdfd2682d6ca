//! Error types for the memory reducer.

use thiserror::Error;

/// Errors surfaced by the reducer's configuration layer.
///
/// The controller itself cannot fail: its transition table is total, so every
/// event-state pair has a defined result. The only fallible surface is
/// validating a [`ReducerConfig`](crate::ReducerConfig) before a driver is
/// built around it.
///
/// # Examples
///
/// ```
/// use memreduce::{ReducerConfig, ReducerError};
///
/// let config = ReducerConfig {
///     max_number_of_gcs: 1,
///     ..ReducerConfig::default()
/// };
///
/// assert_eq!(config.validate(), Err(ReducerError::GcCapTooSmall(1)));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReducerError {
    /// The per-episode GC cap must allow at least two collections.
    #[error("max_number_of_gcs must be at least 2 (got {0})")]
    GcCapTooSmall(u32),
    /// A delay constant is zero, negative, or not finite.
    #[error("{name} must be positive and finite (got {value})")]
    InvalidDelay { name: &'static str, value: f64 },
}

/// Result type for reducer configuration operations.
pub type ReducerResult<T> = Result<T, ReducerError>;
