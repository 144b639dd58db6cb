//! Growable in-memory table model.

use parking_lot::RwLock;

use horizon_prism_core::Signal;

use crate::error::OutOfRange;
use crate::table_model::{TableModel, TableOperation};
use crate::transaction_log::TableModelTransactionLog;
use crate::validation::ValidationState;

/// A [`TableModel`] backed by a `Vec` of rows, supporting every edit.
///
/// The column count is fixed by the first row; inserting a row of a
/// different width is rejected as
/// [`ValidationState::Invalid`].
///
/// # Example
///
/// ```
/// use horizon_prism::{ArrayTableModel, TableModel};
///
/// let table = ArrayTableModel::new();
/// table.push(vec![1, 2, 3]).unwrap();
/// table.set(0, 2, 30).unwrap();
/// assert_eq!(table.get(0, 2).unwrap(), 30);
/// ```
pub struct ArrayTableModel<T> {
    rows: RwLock<Vec<Vec<T>>>,
    log: TableModelTransactionLog<T>,
}

impl<T: Clone + Send + Sync + 'static> ArrayTableModel<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            log: TableModelTransactionLog::new(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ArrayTableModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<Vec<T>>> for ArrayTableModel<T> {
    fn from(rows: Vec<Vec<T>>) -> Self {
        Self {
            rows: RwLock::new(rows),
            log: TableModelTransactionLog::new(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> TableModel<T> for ArrayTableModel<T> {
    fn get_row_size(&self) -> usize {
        self.rows.read().len()
    }

    fn get_column_size(&self) -> usize {
        self.rows.read().first().map_or(0, Vec::len)
    }

    fn get(&self, row: usize, column: usize) -> Result<T, OutOfRange> {
        let rows = self.rows.read();
        let values = rows.get(row).ok_or(OutOfRange {
            index: row,
            size: rows.len(),
        })?;
        values.get(column).cloned().ok_or(OutOfRange {
            index: column,
            size: values.len(),
        })
    }

    fn set(&self, row: usize, column: usize, value: T) -> Result<ValidationState, OutOfRange> {
        let previous = {
            let mut rows = self.rows.write();
            let size = rows.len();
            let values = rows.get_mut(row).ok_or(OutOfRange { index: row, size })?;
            let width = values.len();
            let slot = values.get_mut(column).ok_or(OutOfRange {
                index: column,
                size: width,
            })?;
            std::mem::replace(slot, value.clone())
        };
        self.log.push(TableOperation::Update {
            row,
            column,
            previous,
            value,
        });
        Ok(ValidationState::Acceptable)
    }

    fn insert(&self, row: Vec<T>, index: usize) -> Result<ValidationState, OutOfRange> {
        {
            let mut rows = self.rows.write();
            if index > rows.len() {
                return Err(OutOfRange {
                    index,
                    size: rows.len(),
                });
            }
            if let Some(first) = rows.first() {
                if row.len() != first.len() {
                    return Ok(ValidationState::Invalid);
                }
            }
            rows.insert(index, row);
        }
        self.log.push(TableOperation::Add { index });
        Ok(ValidationState::Acceptable)
    }

    fn move_row(
        &self,
        source: usize,
        destination: usize,
    ) -> Result<ValidationState, OutOfRange> {
        {
            let mut rows = self.rows.write();
            let size = rows.len();
            if source >= size {
                return Err(OutOfRange {
                    index: source,
                    size,
                });
            }
            if destination >= size {
                return Err(OutOfRange {
                    index: destination,
                    size,
                });
            }
            if source == destination {
                return Ok(ValidationState::Acceptable);
            }
            if source < destination {
                rows[source..=destination].rotate_left(1);
            } else {
                rows[destination..=source].rotate_right(1);
            }
        }
        self.log.push(TableOperation::Move {
            source,
            destination,
        });
        Ok(ValidationState::Acceptable)
    }

    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange> {
        {
            let rows = self.rows.read();
            if index >= rows.len() {
                return Err(OutOfRange {
                    index,
                    size: rows.len(),
                });
            }
        }
        self.log.push(TableOperation::PreRemove { index });
        self.rows.write().remove(index);
        self.log.push(TableOperation::Remove { index });
        Ok(ValidationState::Acceptable)
    }

    fn transact(&self, body: &mut dyn FnMut()) {
        self.log.transact(|| body());
    }

    fn operation_signal(&self) -> &Signal<TableOperation<T>> {
        self.log.operation_signal()
    }
}
