//! Validation results for model edits.

use std::fmt;

/// The outcome of an edit a model was asked to apply.
///
/// This is the soft-failure channel of the model contract: an edit a model
/// cannot express against its source (for example inserting into a
/// [`TranslatedListModel`](crate::TranslatedListModel)) reports `Invalid`
/// instead of failing hard, so an in-place editor can revert gracefully.
///
/// Models themselves only produce [`Invalid`](Self::Invalid) and
/// [`Acceptable`](Self::Acceptable). [`Intermediate`](Self::Intermediate)
/// exists for the edit widgets consuming this layer, which validate partial
/// input before committing it through [`set`](crate::ListModel::set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// The edit is not supported and was not applied.
    Invalid,
    /// The edit is incomplete but could become valid.
    Intermediate,
    /// The edit was applied.
    Acceptable,
}

impl ValidationState {
    /// Returns `true` iff the edit was applied.
    pub fn is_acceptable(self) -> bool {
        self == ValidationState::Acceptable
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationState::Invalid => write!(f, "Invalid"),
            ValidationState::Intermediate => write!(f, "Intermediate"),
            ValidationState::Acceptable => write!(f, "Acceptable"),
        }
    }
}
