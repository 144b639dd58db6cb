//! Adapts a table model to a flat list of row handles.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_prism_core::{ConnectionGuard, Signal};

use crate::error::OutOfRange;
use crate::list_model::ListModel;
use crate::operation::Operation;
use crate::table_model::{TableModel, TableOperation};
use crate::transaction_log::ListModelTransactionLog;
use crate::validation::ValidationState;

/// A thin, non-owning handle to one row of a table.
///
/// The handle carries only the table and a row index; it does not snapshot
/// the row's values. Reading through a stale handle (after rows were
/// inserted, moved or removed before its index) reads whichever row
/// currently occupies that index.
pub struct RowView<T> {
    table: Arc<dyn TableModel<T>>,
    row: usize,
}

impl<T: Clone + Send + Sync + 'static> RowView<T> {
    /// The row index this handle points at.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the value in `column` of this row.
    pub fn get(&self, column: usize) -> Result<T, OutOfRange> {
        self.table.get(self.row, column)
    }

    /// Sets the value in `column` of this row.
    pub fn set(&self, column: usize, value: T) -> Result<ValidationState, OutOfRange> {
        self.table.set(self.row, column, value)
    }
}

impl<T> Clone for RowView<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            row: self.row,
        }
    }
}

impl<T> PartialEq for RowView<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.table, &other.table) && self.row == other.row
    }
}

impl<T> fmt::Debug for RowView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowView").field("row", &self.row).finish_non_exhaustive()
    }
}

/// The cell-level detail behind the most recent list `Update` emitted by a
/// [`TableToListModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct TableUpdate<T> {
    /// The row of the updated cell.
    pub row: usize,
    /// The column of the updated cell.
    pub column: usize,
    /// The previous value.
    pub previous: T,
    /// The updated value.
    pub value: T,
}

/// A [`ListModel`] exposing a table's rows as [`RowView`] handles.
///
/// Row-structural table operations map 1:1 onto list operations. A
/// cell-level table update maps to a list `Update` at the row — but since a
/// [`RowView`] carries no value snapshot, the update's column and values are
/// exposed through the [`get_update`](Self::get_update) side channel
/// instead.
///
/// List-side [`set`](ListModel::set), [`insert`](ListModel::insert) and
/// [`move_item`](ListModel::move_item) are rejected as
/// [`ValidationState::Invalid`]: rows are edited through their handles or
/// the table itself. [`remove`](ListModel::remove) delegates to the table.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_prism::{ArrayTableModel, ListModel, TableModel, TableToListModel};
///
/// let table = Arc::new(ArrayTableModel::from(vec![vec![1, 2], vec![3, 4]]));
/// let list = TableToListModel::new(table.clone());
/// assert_eq!(list.get_size(), 2);
/// assert_eq!(list.get(1).unwrap().get(0).unwrap(), 3);
/// ```
pub struct TableToListModel<T> {
    inner: Arc<Inner<T>>,
    _table_connection: ConnectionGuard<TableOperation<T>>,
}

struct Inner<T> {
    table: Arc<dyn TableModel<T>>,
    /// The detail behind the most recently dispatched `Update`.
    update: RwLock<Option<TableUpdate<T>>>,
    log: ListModelTransactionLog<RowView<T>>,
}

impl<T: Clone + Send + Sync + 'static> TableToListModel<T> {
    /// Constructs a list view over `table`'s rows.
    pub fn new(table: Arc<dyn TableModel<T>>) -> Self {
        let inner = Arc::new(Inner {
            table,
            update: RwLock::new(None),
            log: ListModelTransactionLog::new(),
        });
        let weak = Arc::downgrade(&inner);
        let connection = inner
            .table
            .operation_signal()
            .connect_scoped(move |operation| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_operation(operation);
                }
            });
        Self {
            inner,
            _table_connection: connection,
        }
    }

    /// Returns the table this view adapts.
    pub fn get_table(&self) -> &Arc<dyn TableModel<T>> {
        &self.inner.table
    }

    /// The cell-level detail behind the most recent `Update` operation.
    ///
    /// Only meaningful while that update is being dispatched: the value is
    /// overwritten by the next table update, and during a transaction every
    /// buffered update is dispatched after the last one has already
    /// overwritten it. Callers needing durable values must copy them out of
    /// the update during dispatch.
    pub fn get_update(&self) -> Option<TableUpdate<T>> {
        self.inner.update.read().clone()
    }
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn row_view(&self, row: usize) -> RowView<T> {
        RowView {
            table: self.table.clone(),
            row,
        }
    }

    fn on_operation(&self, operation: &TableOperation<T>) {
        match operation {
            TableOperation::StartTransaction => self.log.start(),
            TableOperation::EndTransaction => self.log.end(),
            TableOperation::Add { index } => {
                self.log.push(Operation::Add { index: *index });
            }
            TableOperation::Move {
                source,
                destination,
            } => {
                self.log.push(Operation::Move {
                    source: *source,
                    destination: *destination,
                });
            }
            TableOperation::PreRemove { index } => {
                self.log.push(Operation::PreRemove { index: *index });
            }
            TableOperation::Remove { index } => {
                self.log.push(Operation::Remove { index: *index });
            }
            TableOperation::Update {
                row,
                column,
                previous,
                value,
            } => {
                *self.update.write() = Some(TableUpdate {
                    row: *row,
                    column: *column,
                    previous: previous.clone(),
                    value: value.clone(),
                });
                self.log.push(Operation::Update {
                    index: *row,
                    previous: self.row_view(*row),
                    value: self.row_view(*row),
                });
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ListModel<RowView<T>> for TableToListModel<T> {
    fn get_size(&self) -> usize {
        self.inner.table.get_row_size()
    }

    fn get(&self, index: usize) -> Result<RowView<T>, OutOfRange> {
        let size = self.inner.table.get_row_size();
        if index >= size {
            return Err(OutOfRange { index, size });
        }
        Ok(self.inner.row_view(index))
    }

    fn set(&self, _index: usize, _value: RowView<T>) -> Result<ValidationState, OutOfRange> {
        // A row handle is not a value; cells are edited through the handle.
        Ok(ValidationState::Invalid)
    }

    fn insert(&self, _value: RowView<T>, _index: usize) -> Result<ValidationState, OutOfRange> {
        Ok(ValidationState::Invalid)
    }

    fn move_item(
        &self,
        _source: usize,
        _destination: usize,
    ) -> Result<ValidationState, OutOfRange> {
        Ok(ValidationState::Invalid)
    }

    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange> {
        self.inner.table.remove(index)
    }

    fn transact(&self, body: &mut dyn FnMut()) {
        self.inner.log.transact(|| body());
    }

    fn operation_signal(&self) -> &Signal<Operation<RowView<T>>> {
        self.inner.log.operation_signal()
    }
}
