//! Core trait for observable list models.

use horizon_prism_core::Signal;

use crate::error::OutOfRange;
use crate::operation::Operation;
use crate::validation::ValidationState;

/// A 0-based sequence of values that broadcasts every mutation as an
/// [`Operation`].
///
/// The trait is object-safe; sources are typically shared as
/// `Arc<dyn ListModel<T>>` so several independent views can observe the same
/// model concurrently.
///
/// # Error channels
///
/// Accessors and edits report failures on two channels:
///
/// - indices outside the valid range fail hard with [`OutOfRange`];
/// - structural edits a model cannot express (for example
///   [`insert`](Self::insert) on a
///   [`TranslatedListModel`](crate::TranslatedListModel)) report
///   [`ValidationState::Invalid`] and leave the model untouched, so callers
///   such as in-place editors can reject the edit gracefully.
///
/// # Derived views
///
/// A view over another model implements this trait itself, delegating edits
/// to its source and re-emitting the source's operations translated to its
/// own index space. Views hold their source as `Arc<dyn ListModel<T>>` and
/// subscribe with a scoped connection released when the view is dropped.
pub trait ListModel<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Returns the number of values in the model.
    fn get_size(&self) -> usize;

    /// Returns `true` if the model contains no values.
    fn is_empty(&self) -> bool {
        self.get_size() == 0
    }

    /// Returns the value at `index`.
    fn get(&self, index: usize) -> Result<T, OutOfRange>;

    /// Sets the value at `index`.
    fn set(&self, index: usize, value: T) -> Result<ValidationState, OutOfRange>;

    /// Inserts a value at `index`, shifting everything at or after it up by
    /// one. `index` may equal the size, appending the value.
    fn insert(&self, value: T, index: usize) -> Result<ValidationState, OutOfRange>;

    /// Appends a value.
    fn push(&self, value: T) -> Result<ValidationState, OutOfRange> {
        self.insert(value, self.get_size())
    }

    /// Moves the value at `source` to `destination`, shifting the values in
    /// between by one to close the gap.
    fn move_item(&self, source: usize, destination: usize)
    -> Result<ValidationState, OutOfRange>;

    /// Removes the value at `index`.
    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange>;

    /// Runs `body`, batching every operation it produces into one
    /// transaction.
    ///
    /// Observers receive the batch bracketed by
    /// [`Operation::StartTransaction`] / [`Operation::EndTransaction`],
    /// unless the body produced exactly one operation, which is delivered
    /// unwrapped. Nested calls coalesce into the outermost transaction.
    fn transact(&self, body: &mut dyn FnMut());

    /// Returns the signal this model's operations are dispatched through.
    ///
    /// Connect with [`Signal::connect`] or [`Signal::connect_scoped`]; the
    /// scoped form releases the subscription when the guard drops.
    fn operation_signal(&self) -> &Signal<Operation<T>>;
}

/// Removes every value from a model, back to front, in one transaction.
pub fn clear<T, M>(model: &M)
where
    T: Clone + Send + Sync + 'static,
    M: ListModel<T> + ?Sized,
{
    model.transact(&mut || {
        while model.get_size() > 0 {
            let _ = model.remove(model.get_size() - 1);
        }
    });
}
