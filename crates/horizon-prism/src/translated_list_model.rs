//! A view exposing an arbitrary permutation of a source list.

use std::sync::Arc;

use parking_lot::RwLock;

use horizon_prism_core::{ConnectionGuard, Signal};

use crate::error::OutOfRange;
use crate::list_model::ListModel;
use crate::operation::Operation;
use crate::transaction_log::ListModelTransactionLog;
use crate::validation::ValidationState;

/// A [`ListModel`] exposing a permutation of its source.
///
/// The permutation starts as the identity and is built incrementally through
/// [`move_item`](ListModel::move_item) on the view — there is no "set order"
/// API. Reordering the view never touches the source; conversely, reordering
/// the source never reorders the view (only the index mapping is rewritten),
/// so the view's order is fully independent of the source's.
///
/// Structural changes flow from the source: the view re-emits source adds,
/// removes and updates at their translated positions. [`insert`] on the view
/// is rejected with [`ValidationState::Invalid`] — only the source may grow
/// the set. [`set`](ListModel::set) and [`remove`](ListModel::remove)
/// delegate through the mapping.
///
/// [`insert`]: ListModel::insert
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_prism::{ArrayListModel, ListModel, TranslatedListModel};
///
/// let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
/// let translation = TranslatedListModel::new(source.clone());
/// translation.move_item(3, 0).unwrap();
/// assert_eq!(translation.get(0).unwrap(), 1);
/// assert_eq!(source.get(3).unwrap(), 1);
/// ```
pub struct TranslatedListModel<T> {
    inner: Arc<Inner<T>>,
    _source_connection: ConnectionGuard<Operation<T>>,
}

/// The two halves of the index mapping, kept as mutual inverses at all
/// times: `translation[view] == source` iff `reverse_translation[source] ==
/// view`.
struct IndexMaps {
    translation: Vec<usize>,
    reverse_translation: Vec<usize>,
}

struct Inner<T> {
    source: Arc<dyn ListModel<T>>,
    maps: RwLock<IndexMaps>,
    log: ListModelTransactionLog<T>,
}

impl<T: Clone + Send + Sync + 'static> TranslatedListModel<T> {
    /// Constructs an identity view over `source`.
    pub fn new(source: Arc<dyn ListModel<T>>) -> Self {
        let identity: Vec<usize> = (0..source.get_size()).collect();
        let inner = Arc::new(Inner {
            source,
            maps: RwLock::new(IndexMaps {
                translation: identity.clone(),
                reverse_translation: identity,
            }),
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

    /// Given an index into the source, returns the index in this view.
    pub fn to_view_index(&self, source_index: usize) -> Result<usize, OutOfRange> {
        let maps = self.inner.maps.read();
        maps.reverse_translation
            .get(source_index)
            .copied()
            .ok_or(OutOfRange {
                index: source_index,
                size: maps.reverse_translation.len(),
            })
    }

    /// Given an index into this view, returns the index in the source.
    pub fn to_source_index(&self, view_index: usize) -> Result<usize, OutOfRange> {
        let maps = self.inner.maps.read();
        maps.translation.get(view_index).copied().ok_or(OutOfRange {
            index: view_index,
            size: maps.translation.len(),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn on_operation(&self, operation: &Operation<T>) {
        match operation {
            Operation::StartTransaction => self.log.start(),
            Operation::EndTransaction => self.log.end(),
            Operation::Add { index } => {
                let index = *index;
                let translated = {
                    let mut maps = self.maps.write();
                    if index >= maps.translation.len() {
                        // Appended past the end: keep it at the end of the
                        // view as well.
                        maps.translation.push(index);
                        maps.reverse_translation.push(index);
                        index
                    } else {
                        // Spliced in: every source index at or above the
                        // insertion point shifts up, and the new element
                        // takes the view position of the element it
                        // displaced.
                        let view_index = maps.reverse_translation[index];
                        for entry in &mut maps.translation {
                            if *entry >= index {
                                *entry += 1;
                            }
                        }
                        for entry in &mut maps.reverse_translation {
                            if *entry >= view_index {
                                *entry += 1;
                            }
                        }
                        maps.translation.insert(view_index, index);
                        maps.reverse_translation.insert(index, view_index);
                        view_index
                    }
                };
                self.log.push(Operation::Add { index: translated });
            }
            Operation::Move {
                source,
                destination,
            } => {
                // A source reorder does not reorder the view; only the
                // mapping is rewritten, so nothing is emitted.
                let (s, d) = (*source, *destination);
                let mut maps = self.maps.write();
                let IndexMaps {
                    translation,
                    reverse_translation,
                } = &mut *maps;
                for entry in translation.iter_mut() {
                    if *entry == s {
                        *entry = d;
                    } else if s < d && *entry > s && *entry <= d {
                        *entry -= 1;
                    } else if d < s && *entry >= d && *entry < s {
                        *entry += 1;
                    }
                }
                for (view_index, &source_index) in translation.iter().enumerate() {
                    reverse_translation[source_index] = view_index;
                }
            }
            Operation::PreRemove { index } => {
                let translated = self.maps.read().reverse_translation[*index];
                self.log.push(Operation::PreRemove { index: translated });
            }
            Operation::Remove { index } => {
                let index = *index;
                let translated = {
                    let mut maps = self.maps.write();
                    let view_index = maps.reverse_translation[index];
                    maps.translation.remove(view_index);
                    maps.reverse_translation.remove(index);
                    for entry in &mut maps.translation {
                        if *entry > index {
                            *entry -= 1;
                        }
                    }
                    for entry in &mut maps.reverse_translation {
                        if *entry > view_index {
                            *entry -= 1;
                        }
                    }
                    view_index
                };
                self.log.push(Operation::Remove { index: translated });
            }
            Operation::Update {
                index,
                previous,
                value,
            } => {
                let translated = self.maps.read().reverse_translation[*index];
                self.log.push(Operation::Update {
                    index: translated,
                    previous: previous.clone(),
                    value: value.clone(),
                });
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ListModel<T> for TranslatedListModel<T> {
    fn get_size(&self) -> usize {
        self.inner.maps.read().translation.len()
    }

    fn get(&self, index: usize) -> Result<T, OutOfRange> {
        let source_index = self.to_source_index(index)?;
        self.inner.source.get(source_index)
    }

    fn set(&self, index: usize, value: T) -> Result<ValidationState, OutOfRange> {
        let source_index = self.to_source_index(index)?;
        self.inner.source.set(source_index, value)
    }

    fn insert(&self, _value: T, _index: usize) -> Result<ValidationState, OutOfRange> {
        // Only the source may grow the set: there is no meaningful source
        // position for a view-side insert.
        Ok(ValidationState::Invalid)
    }

    fn move_item(
        &self,
        source: usize,
        destination: usize,
    ) -> Result<ValidationState, OutOfRange> {
        {
            let mut maps = self.inner.maps.write();
            let size = maps.translation.len();
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
            // Single-pass shift of the range between source and destination;
            // the reverse map is patched entry by entry as view positions
            // change.
            let moved = maps.translation[source];
            if source < destination {
                for index in source..destination {
                    maps.translation[index] = maps.translation[index + 1];
                    let entry = maps.translation[index];
                    maps.reverse_translation[entry] -= 1;
                }
            } else {
                for index in (destination..source).rev() {
                    maps.translation[index + 1] = maps.translation[index];
                    let entry = maps.translation[index + 1];
                    maps.reverse_translation[entry] += 1;
                }
            }
            maps.translation[destination] = moved;
            maps.reverse_translation[moved] = destination;
        }
        self.inner.log.push(Operation::Move {
            source,
            destination,
        });
        Ok(ValidationState::Acceptable)
    }

    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange> {
        let source_index = self.to_source_index(index)?;
        self.inner.source.remove(source_index)
    }

    fn transact(&self, body: &mut dyn FnMut()) {
        self.inner.log.transact(|| body());
    }

    fn operation_signal(&self) -> &Signal<Operation<T>> {
        self.inner.log.operation_signal()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::ArrayListModel;

    fn capture<T: Clone + Send + Sync + 'static>(
        model: &TranslatedListModel<T>,
    ) -> Arc<Mutex<Vec<Operation<T>>>> {
        let operations = Arc::new(Mutex::new(Vec::new()));
        let captured = operations.clone();
        model.operation_signal().connect(move |operation| {
            captured.lock().push(operation.clone());
        });
        operations
    }

    fn require_inverse_maps<T: Clone + Send + Sync + 'static>(model: &TranslatedListModel<T>) {
        for view_index in 0..model.get_size() {
            let source_index = model.to_source_index(view_index).unwrap();
            assert_eq!(model.to_view_index(source_index).unwrap(), view_index);
        }
    }

    #[test]
    fn test_translate() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let translation = TranslatedListModel::new(source.clone());
        let operations = capture(&translation);
        translation.move_item(3, 0).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![Operation::Move {
                source: 3,
                destination: 0,
            }]
        );
        operations.lock().clear();
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 4);
        assert_eq!(translation.get(2).unwrap(), 2);
        assert_eq!(translation.get(3).unwrap(), 9);
        require_inverse_maps(&translation);
        assert!(translation.move_item(6, 2).is_err());
        assert!(operations.lock().is_empty());
        translation.move_item(1, 2).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![Operation::Move {
                source: 1,
                destination: 2,
            }]
        );
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 9);
        require_inverse_maps(&translation);
    }

    #[test]
    fn test_transaction() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 10, 9, 1, 6]));
        let translation = TranslatedListModel::new(source.clone());
        let operations = capture(&translation);
        translation.transact(&mut || {
            translation.move_item(4, 0).unwrap();
            translation.transact(&mut || {
                translation.move_item(1, 2).unwrap();
                translation.transact(&mut || {
                    translation.move_item(3, 5).unwrap();
                });
                translation.move_item(4, 3).unwrap();
            });
        });
        assert_eq!(
            *operations.lock(),
            vec![
                Operation::StartTransaction,
                Operation::Move {
                    source: 4,
                    destination: 0,
                },
                Operation::Move {
                    source: 1,
                    destination: 2,
                },
                Operation::Move {
                    source: 3,
                    destination: 5,
                },
                Operation::Move {
                    source: 4,
                    destination: 3,
                },
                Operation::EndTransaction,
            ]
        );
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 6);
        assert_eq!(translation.get(4).unwrap(), 9);
        assert_eq!(translation.get(5).unwrap(), 10);
        require_inverse_maps(&translation);
    }

    #[test]
    fn test_transaction_with_one_operation() {
        let source = Arc::new(ArrayListModel::from(vec![4, 1, 6]));
        let translation = TranslatedListModel::new(source.clone());
        let operations = capture(&translation);
        translation.transact(&mut || {
            translation.move_item(0, 2).unwrap();
            translation.transact(&mut || {});
        });
        assert_eq!(
            *operations.lock(),
            vec![Operation::Move {
                source: 0,
                destination: 2,
            }]
        );
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 6);
        assert_eq!(translation.get(2).unwrap(), 4);
    }

    #[test]
    fn test_push_from_source() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let translation = TranslatedListModel::new(source.clone());
        translation.move_item(3, 0).unwrap();
        translation.move_item(1, 2).unwrap();
        let operations = capture(&translation);
        source.push(6).unwrap();
        assert_eq!(*operations.lock(), vec![Operation::Add { index: 4 }]);
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 9);
        assert_eq!(translation.get(4).unwrap(), 6);
        assert_eq!(translation.get_size(), 5);
        require_inverse_maps(&translation);
    }

    #[test]
    fn test_insert_from_source() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let translation = TranslatedListModel::new(source.clone());
        translation.move_item(3, 0).unwrap();
        translation.move_item(1, 2).unwrap();
        let operations = capture(&translation);
        source.insert(6, 2).unwrap();
        assert_eq!(*operations.lock(), vec![Operation::Add { index: 3 }]);
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 6);
        assert_eq!(translation.get(4).unwrap(), 9);
        assert_eq!(translation.get_size(), 5);
        require_inverse_maps(&translation);
    }

    #[test]
    fn test_move_from_source() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let translation = TranslatedListModel::new(source.clone());
        translation.move_item(3, 0).unwrap();
        translation.move_item(1, 2).unwrap();
        let operations = capture(&translation);
        source.move_item(1, 3).unwrap();
        assert!(operations.lock().is_empty());
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 9);
        require_inverse_maps(&translation);
        source.move_item(2, 0).unwrap();
        assert!(operations.lock().is_empty());
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 9);
        require_inverse_maps(&translation);
    }

    #[test]
    fn test_trivial_move() {
        let source = Arc::new(ArrayListModel::from(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
        ]));
        let translation = TranslatedListModel::new(source.clone());
        let operations = capture(&translation);
        source.move_item(0, 2).unwrap();
        assert!(operations.lock().is_empty());
        source.set(2, "D".to_string()).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![Operation::Update {
                index: 0,
                previous: "A".to_string(),
                value: "D".to_string(),
            }]
        );
        assert_eq!(translation.get(0).unwrap(), "D");
        assert_eq!(translation.get(1).unwrap(), "B");
        assert_eq!(translation.get(2).unwrap(), "C");
        require_inverse_maps(&translation);
    }

    #[test]
    fn test_remove_from_source() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let translation = TranslatedListModel::new(source.clone());
        translation.move_item(3, 0).unwrap();
        translation.move_item(1, 2).unwrap();
        let operations = capture(&translation);
        source.remove(0).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![
                Operation::PreRemove { index: 2 },
                Operation::Remove { index: 2 },
            ]
        );
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 9);
        assert_eq!(translation.get_size(), 3);
        assert!(translation.get(3).is_err());
        require_inverse_maps(&translation);
        operations.lock().clear();
        source.remove(2).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![
                Operation::PreRemove { index: 0 },
                Operation::Remove { index: 0 },
            ]
        );
        assert_eq!(translation.get(0).unwrap(), 2);
        assert_eq!(translation.get(1).unwrap(), 9);
        assert_eq!(translation.get_size(), 2);
        assert!(translation.get(2).is_err());
        require_inverse_maps(&translation);
    }

    #[test]
    fn test_update_from_source() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let translation = TranslatedListModel::new(source.clone());
        translation.move_item(3, 0).unwrap();
        translation.move_item(2, 1).unwrap();
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 9);
        let operations = capture(&translation);
        source.set(3, 10).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![Operation::Update {
                index: 0,
                previous: 1,
                value: 10,
            }]
        );
        assert_eq!(translation.get(0).unwrap(), 10);
        operations.lock().clear();
        source.set(0, 0).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![Operation::Update {
                index: 2,
                previous: 4,
                value: 0,
            }]
        );
        assert_eq!(translation.get(2).unwrap(), 0);
    }

    #[test]
    fn test_set_through_view() {
        let source = Arc::new(ArrayListModel::from(vec![2, 1]));
        let translation = TranslatedListModel::new(source.clone());
        translation.move_item(1, 0).unwrap();
        translation.set(0, 10).unwrap();
        assert_eq!(source.get(0).unwrap(), 2);
        assert_eq!(source.get(1).unwrap(), 10);
    }

    #[test]
    fn test_insert_through_view_is_invalid() {
        let source = Arc::new(ArrayListModel::from(vec![2, 1]));
        let translation = TranslatedListModel::new(source.clone());
        assert_eq!(translation.insert(5, 0).unwrap(), ValidationState::Invalid);
        assert_eq!(translation.get_size(), 2);
    }

    #[test]
    fn test_transaction_from_source() {
        let source = Arc::new(ArrayListModel::from(vec![2, 1]));
        let translation = TranslatedListModel::new(source.clone());
        translation.move_item(1, 0).unwrap();
        assert_eq!(translation.get(0).unwrap(), 1);
        assert_eq!(translation.get(1).unwrap(), 2);
        let operations = capture(&translation);
        source.transact(&mut || {
            source.push(4).unwrap();
            source.transact(&mut || {
                source.set(0, 10).unwrap();
                source.transact(&mut || {
                    source.insert(6, 1).unwrap();
                    source.remove(2).unwrap();
                });
                source.push(0).unwrap();
            });
            source.move_item(3, 0).unwrap();
        });
        assert_eq!(
            *operations.lock(),
            vec![
                Operation::StartTransaction,
                Operation::Add { index: 2 },
                Operation::Update {
                    index: 1,
                    previous: 2,
                    value: 10,
                },
                Operation::Add { index: 0 },
                Operation::PreRemove { index: 1 },
                Operation::Remove { index: 1 },
                Operation::Add { index: 3 },
                Operation::EndTransaction,
            ]
        );
        assert_eq!(translation.get(0).unwrap(), 6);
        assert_eq!(translation.get(1).unwrap(), 10);
        assert_eq!(translation.get(2).unwrap(), 4);
        assert_eq!(translation.get(3).unwrap(), 0);
        assert_eq!(translation.get_size(), 4);
        require_inverse_maps(&translation);
    }
}
