//! A view over a source list in reverse order.

use std::sync::Arc;

use parking_lot::Mutex;

use horizon_prism_core::{ConnectionGuard, Signal};

use crate::error::OutOfRange;
use crate::list_model::ListModel;
use crate::operation::Operation;
use crate::transaction_log::ListModelTransactionLog;
use crate::validation::ValidationState;

/// A [`ListModel`] exposing its source in reverse order.
///
/// Index `i` of the view is index `size - i - 1` of the source; the mapping
/// is its own inverse. Every edit is supported and delegates to the source
/// through the mapping: appending to the view prepends to the source, and so
/// on. Source operations are re-emitted with their indices negated.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_prism::{ArrayListModel, ListModel, ReversedListModel};
///
/// let source = Arc::new(ArrayListModel::from(vec![1, 2, 3]));
/// let reversed = ReversedListModel::new(source.clone());
/// assert_eq!(reversed.get(0).unwrap(), 3);
/// reversed.push(0).unwrap();
/// assert_eq!(source.get(0).unwrap(), 0);
/// ```
pub struct ReversedListModel<T> {
    inner: Arc<Inner<T>>,
    _source_connection: ConnectionGuard<Operation<T>>,
}

struct Inner<T> {
    source: Arc<dyn ListModel<T>>,
    /// Element count as of the last operation applied. Kept separately from
    /// the source's size: operations buffered by a source transaction are
    /// dispatched after the source has fully mutated, and each must be
    /// translated against the size the source had when it was applied.
    size: Mutex<usize>,
    log: ListModelTransactionLog<T>,
}

impl<T: Clone + Send + Sync + 'static> ReversedListModel<T> {
    /// Constructs a view reversing `source`.
    pub fn new(source: Arc<dyn ListModel<T>>) -> Self {
        let inner = Arc::new(Inner {
            size: Mutex::new(source.get_size()),
            source,
            log: ListModelTransactionLog::new(),
        });
        let weak = Arc::downgrade(&inner);
        let connection = inner
            .source
            .operation_signal()
            .connect_scoped(move |operation| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_operation(operation);
                }
            });
        Self {
            inner,
            _source_connection: connection,
        }
    }

    fn index_to_source(&self, index: usize) -> Result<usize, OutOfRange> {
        let size = self.inner.source.get_size();
        if index >= size {
            return Err(OutOfRange { index, size });
        }
        Ok(size - index - 1)
    }
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn on_operation(&self, operation: &Operation<T>) {
        match operation {
            Operation::StartTransaction => self.log.start(),
            Operation::EndTransaction => self.log.end(),
            Operation::Add { index } => {
                let translated = {
                    let mut size = self.size.lock();
                    *size += 1;
                    *size - index - 1
                };
                self.log.push(Operation::Add { index: translated });
            }
            Operation::Move {
                source,
                destination,
            } => {
                let size = *self.size.lock();
                self.log.push(Operation::Move {
                    source: size - source - 1,
                    destination: size - destination - 1,
                });
            }
            Operation::PreRemove { index } => {
                let size = *self.size.lock();
                self.log.push(Operation::PreRemove {
                    index: size - index - 1,
                });
            }
            Operation::Remove { index } => {
                let translated = {
                    let mut size = self.size.lock();
                    let translated = *size - index - 1;
                    *size -= 1;
                    translated
                };
                self.log.push(Operation::Remove { index: translated });
            }
            Operation::Update {
                index,
                previous,
                value,
            } => {
                let size = *self.size.lock();
                self.log.push(Operation::Update {
                    index: size - index - 1,
                    previous: previous.clone(),
                    value: value.clone(),
                });
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ListModel<T> for ReversedListModel<T> {
    fn get_size(&self) -> usize {
        self.inner.source.get_size()
    }

    fn get(&self, index: usize) -> Result<T, OutOfRange> {
        let source_index = self.index_to_source(index)?;
        self.inner.source.get(source_index)
    }

    fn set(&self, index: usize, value: T) -> Result<ValidationState, OutOfRange> {
        let source_index = self.index_to_source(index)?;
        self.inner.source.set(source_index, value)
    }

    fn insert(&self, value: T, index: usize) -> Result<ValidationState, OutOfRange> {
        let size = self.inner.source.get_size();
        if index > size {
            return Err(OutOfRange { index, size });
        }
        // Inserting before view index i is inserting after the mapped source
        // position, which is index_to_source(i) + 1 == size - i.
        self.inner.source.insert(value, size - index)
    }

    fn move_item(
        &self,
        source: usize,
        destination: usize,
    ) -> Result<ValidationState, OutOfRange> {
        let source_index = self.index_to_source(source)?;
        let destination_index = self.index_to_source(destination)?;
        self.inner.source.move_item(source_index, destination_index)
    }

    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange> {
        let source_index = self.index_to_source(index)?;
        self.inner.source.remove(source_index)
    }

    fn transact(&self, body: &mut dyn FnMut()) {
        self.inner.log.transact(|| body());
    }

    fn operation_signal(&self) -> &Signal<Operation<T>> {
        self.inner.log.operation_signal()
    }
}
