//! Error types for the model layer.

use thiserror::Error;

/// An index was outside the valid range of a model.
///
/// This is the hard-failure channel of the model contract: accessing or
/// editing an index outside `[0, size)` (or `[0, size]` for inserts) aborts
/// the call with this error. Edits a model cannot express are reported
/// through the soft channel instead, as
/// [`ValidationState::Invalid`](crate::ValidationState::Invalid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} is out of range for size {size}")]
pub struct OutOfRange {
    /// The offending index.
    pub index: usize,
    /// The size of the range the index was checked against.
    pub size: usize,
}
