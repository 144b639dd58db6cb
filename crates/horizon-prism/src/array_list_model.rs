//! Growable in-memory list model.

use parking_lot::RwLock;

use horizon_prism_core::Signal;

use crate::error::OutOfRange;
use crate::list_model::ListModel;
use crate::operation::Operation;
use crate::transaction_log::ListModelTransactionLog;
use crate::validation::ValidationState;

/// A [`ListModel`] backed by a `Vec`, supporting every edit.
///
/// This is the concrete source model the transform views are layered over.
/// All mutation goes through `&self`; state is guarded internally so the
/// model can be shared as `Arc<ArrayListModel<T>>` between an owner that
/// edits it and views that observe it.
///
/// # Example
///
/// ```
/// use horizon_prism::{ArrayListModel, ListModel};
///
/// let model = ArrayListModel::new();
/// model.push(4).unwrap();
/// model.push(2).unwrap();
/// model.move_item(0, 1).unwrap();
/// assert_eq!(model.get(0).unwrap(), 2);
/// ```
pub struct ArrayListModel<T> {
    items: RwLock<Vec<T>>,
    log: ListModelTransactionLog<T>,
}

impl<T: Clone + Send + Sync + 'static> ArrayListModel<T> {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            log: ListModelTransactionLog::new(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ArrayListModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for ArrayListModel<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            log: ListModelTransactionLog::new(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ListModel<T> for ArrayListModel<T> {
    fn get_size(&self) -> usize {
        self.items.read().len()
    }

    fn get(&self, index: usize) -> Result<T, OutOfRange> {
        let items = self.items.read();
        items.get(index).cloned().ok_or(OutOfRange {
            index,
            size: items.len(),
        })
    }

    fn set(&self, index: usize, value: T) -> Result<ValidationState, OutOfRange> {
        let previous = {
            let mut items = self.items.write();
            let size = items.len();
            let slot = items.get_mut(index).ok_or(OutOfRange { index, size })?;
            std::mem::replace(slot, value.clone())
        };
        self.log.push(Operation::Update {
            index,
            previous,
            value,
        });
        Ok(ValidationState::Acceptable)
    }

    fn insert(&self, value: T, index: usize) -> Result<ValidationState, OutOfRange> {
        {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(OutOfRange {
                    index,
                    size: items.len(),
                });
            }
            items.insert(index, value);
        }
        self.log.push(Operation::Add { index });
        Ok(ValidationState::Acceptable)
    }

    fn move_item(
        &self,
        source: usize,
        destination: usize,
    ) -> Result<ValidationState, OutOfRange> {
        {
            let mut items = self.items.write();
            let size = items.len();
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
                items[source..=destination].rotate_left(1);
            } else {
                items[destination..=source].rotate_right(1);
            }
        }
        self.log.push(Operation::Move {
            source,
            destination,
        });
        Ok(ValidationState::Acceptable)
    }

    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange> {
        {
            let items = self.items.read();
            if index >= items.len() {
                return Err(OutOfRange {
                    index,
                    size: items.len(),
                });
            }
        }
        self.log.push(Operation::PreRemove { index });
        self.items.write().remove(index);
        self.log.push(Operation::Remove { index });
        Ok(ValidationState::Acceptable)
    }

    fn transact(&self, body: &mut dyn FnMut()) {
        self.log.transact(|| body());
    }

    fn operation_signal(&self) -> &Signal<Operation<T>> {
        self.log.operation_signal()
    }
}
