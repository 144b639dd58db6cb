//! Core trait and operations for observable table models.

use horizon_prism_core::Signal;

use crate::error::OutOfRange;
use crate::transaction_log::TransactionalOperation;
use crate::validation::ValidationState;

/// A single change applied to a [`TableModel`].
///
/// Rows are the structural unit: adds, moves and removes operate on whole
/// rows and follow the same protocol as the list operations, including the
/// `PreRemove`/`Remove` pairing. Only `Update` is cell-grained.
#[derive(Clone, Debug, PartialEq)]
pub enum TableOperation<T> {
    /// Marks the beginning of a transaction.
    StartTransaction,
    /// Marks the end of a transaction.
    EndTransaction,
    /// A row was inserted at `index`.
    Add {
        /// The index where the row was inserted.
        index: usize,
    },
    /// The row at `source` was moved to `destination`.
    Move {
        /// The index of the row that was moved.
        source: usize,
        /// The index the row was moved to.
        destination: usize,
    },
    /// The row at `index` is about to be removed and can still be read.
    PreRemove {
        /// The index of the row about to be removed.
        index: usize,
    },
    /// The row at `index` was removed.
    Remove {
        /// The index the row was removed from.
        index: usize,
    },
    /// The cell at `row`/`column` was replaced.
    Update {
        /// The row of the updated cell.
        row: usize,
        /// The column of the updated cell.
        column: usize,
        /// The previous value.
        previous: T,
        /// The updated value.
        value: T,
    },
}

impl<T: Clone + Send + 'static> TransactionalOperation for TableOperation<T> {
    fn start_transaction() -> Self {
        Self::StartTransaction
    }

    fn end_transaction() -> Self {
        Self::EndTransaction
    }
}

/// A 2-D grid of values that broadcasts every mutation as a
/// [`TableOperation`].
///
/// The contract mirrors [`ListModel`](crate::ListModel) with rows as the
/// structural unit: the same two error channels, the same transaction
/// protocol, the same signal-accessor idiom.
pub trait TableModel<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Returns the number of rows in the table.
    fn get_row_size(&self) -> usize;

    /// Returns the number of columns in the table.
    fn get_column_size(&self) -> usize;

    /// Returns the value at `row`/`column`.
    fn get(&self, row: usize, column: usize) -> Result<T, OutOfRange>;

    /// Sets the value at `row`/`column`.
    fn set(&self, row: usize, column: usize, value: T) -> Result<ValidationState, OutOfRange>;

    /// Inserts a row at `index`. `index` may equal the row count, appending
    /// the row.
    fn insert(&self, row: Vec<T>, index: usize) -> Result<ValidationState, OutOfRange>;

    /// Appends a row.
    fn push(&self, row: Vec<T>) -> Result<ValidationState, OutOfRange> {
        self.insert(row, self.get_row_size())
    }

    /// Moves the row at `source` to `destination`.
    fn move_row(&self, source: usize, destination: usize)
    -> Result<ValidationState, OutOfRange>;

    /// Removes the row at `index`.
    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange>;

    /// Runs `body`, batching every operation it produces into one
    /// transaction.
    fn transact(&self, body: &mut dyn FnMut());

    /// Returns the signal this table's operations are dispatched through.
    fn operation_signal(&self) -> &Signal<TableOperation<T>>;
}
