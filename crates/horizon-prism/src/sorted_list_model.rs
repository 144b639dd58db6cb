//! A view over a source list ordered by a comparator.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_prism_core::{ConnectionGuard, Signal};

use crate::error::OutOfRange;
use crate::list_model::ListModel;
use crate::operation::Operation;
use crate::transaction_log::ListModelTransactionLog;
use crate::translated_list_model::TranslatedListModel;
use crate::validation::ValidationState;

/// Comparison callback ranking two elements, given each element's current
/// index in the sorted view.
pub type Comparator<T> = Arc<dyn Fn(&T, usize, &T, usize) -> Ordering + Send + Sync>;

/// A [`ListModel`] keeping its source's elements in comparator order.
///
/// The ordering is maintained over an internal [`TranslatedListModel`], so
/// reordering never touches the source and element identity is preserved
/// across relocations: a source add surfaces as one `Add` at the sorted
/// position, and a source update that changes an element's rank surfaces as
/// a `Move` followed by the `Update` — never as a remove/re-add pair.
///
/// The comparator can be swapped at runtime with
/// [`set_comparator`](Self::set_comparator), which re-sorts incrementally,
/// emitting only the `Move` operations needed.
///
/// The view does not accept order edits of its own
/// ([`move_item`](ListModel::move_item) is `Invalid` except as a no-op) and
/// does not grow on its own ([`insert`](ListModel::insert) is `Invalid`;
/// grow through the source).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_prism::{ArrayListModel, ListModel, SortedListModel};
///
/// let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
/// let sorted = SortedListModel::new(source.clone());
/// assert_eq!(sorted.get(0).unwrap(), 1);
/// assert_eq!(sorted.get(3).unwrap(), 9);
/// source.push(3).unwrap(); // surfaces at sorted index 2
/// assert_eq!(sorted.get(2).unwrap(), 3);
/// ```
pub struct SortedListModel<T> {
    inner: Arc<Inner<T>>,
    _translation_connection: ConnectionGuard<Operation<T>>,
}

struct Inner<T> {
    translation: TranslatedListModel<T>,
    comparator: RwLock<Comparator<T>>,
    log: ListModelTransactionLog<T>,
}

impl<T: Clone + Send + Sync + 'static> SortedListModel<T> {
    /// Constructs a view sorting `source` by the natural order of its
    /// elements.
    pub fn new(source: Arc<dyn ListModel<T>>) -> Self
    where
        T: Ord,
    {
        Self::with_comparator(source, |left: &T, right: &T| left.cmp(right))
    }

    /// Constructs a view sorting `source` by a value comparator.
    pub fn with_comparator<F>(source: Arc<dyn ListModel<T>>, comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::with_indexed_comparator(source, move |left, _, right, _| comparator(left, right))
    }

    /// Constructs a view sorting `source` by a comparator that also receives
    /// each element's current sorted index.
    pub fn with_indexed_comparator<F>(source: Arc<dyn ListModel<T>>, comparator: F) -> Self
    where
        F: Fn(&T, usize, &T, usize) -> Ordering + Send + Sync + 'static,
    {
        let inner = Arc::new(Inner {
            translation: TranslatedListModel::new(source),
            comparator: RwLock::new(Arc::new(comparator) as Comparator<T>),
            log: ListModelTransactionLog::new(),
        });
        inner.sort();
        // Connected after the initial sort: its moves are not observable.
        let weak = Arc::downgrade(&inner);
        let connection = inner
            .translation
            .operation_signal()
            .connect_scoped(move |operation| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_operation(operation);
                }
            });
        Self {
            inner,
            _translation_connection: connection,
        }
    }

    /// Replaces the comparator, re-sorting the view incrementally.
    ///
    /// Observers receive only the `Move` operations needed to reach the new
    /// order, batched into one transaction.
    pub fn set_comparator<F>(&self, comparator: F)
    where
        F: Fn(&T, usize, &T, usize) -> Ordering + Send + Sync + 'static,
    {
        *self.inner.comparator.write() = Arc::new(comparator);
        self.inner.sort();
    }
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn compare(&self, left: usize, right: usize) -> Ordering {
        let comparator = self.comparator.read().clone();
        let left_value = self
            .translation
            .get(left)
            .expect("sorted comparison index out of range");
        let right_value = self
            .translation
            .get(right)
            .expect("sorted comparison index out of range");
        comparator(&left_value, left, &right_value, right)
    }

    /// First index in `[low, high)` whose element does not sort before the
    /// element at `index`.
    fn lower_bound(&self, mut low: usize, mut high: usize, index: usize) -> usize {
        while low < high {
            let middle = low + (high - low) / 2;
            if self.compare(middle, index) == Ordering::Less {
                low = middle + 1;
            } else {
                high = middle;
            }
        }
        low
    }

    /// Returns where the element at `index` belongs among the first `size`
    /// elements, assuming everything but `index` is already in order.
    fn find_sorted_index(&self, index: usize, size: usize) -> usize {
        if index != 0 && self.compare(index, index - 1) == Ordering::Less {
            self.lower_bound(0, index, index)
        } else if index + 1 < size && self.compare(index + 1, index) == Ordering::Less {
            // Moving right: the slots between shift down by one first.
            self.lower_bound(index + 1, size, index) - 1
        } else {
            index
        }
    }

    /// Insertion sort over the translation, emitting one `Move` per element
    /// out of place.
    fn sort(&self) {
        tracing::trace!(
            target: "horizon_prism::sorted_list_model",
            size = self.translation.get_size(),
            "sorting"
        );
        self.log.transact(|| {
            self.translation.transact(&mut || {
                for index in 1..self.translation.get_size() {
                    let sorted = self.find_sorted_index(index, index + 1);
                    if sorted != index {
                        let _ = self.translation.move_item(index, sorted);
                        self.log.push(Operation::Move {
                            source: index,
                            destination: sorted,
                        });
                    }
                }
            });
        });
    }

    fn on_operation(&self, operation: &Operation<T>) {
        match operation {
            Operation::StartTransaction => self.log.start(),
            Operation::EndTransaction => self.log.end(),
            Operation::Add { index } => {
                let sorted = self.find_sorted_index(*index, self.translation.get_size());
                let _ = self.translation.move_item(*index, sorted);
                self.log.push(Operation::Add { index: sorted });
            }
            // The translation only emits Move for reorders this model itself
            // initiated; they are already accounted for.
            Operation::Move { .. } => {}
            Operation::PreRemove { index } => {
                self.log.push(Operation::PreRemove { index: *index });
            }
            Operation::Remove { index } => {
                self.log.push(Operation::Remove { index: *index });
            }
            Operation::Update {
                index,
                previous,
                value,
            } => {
                let sorted = self.find_sorted_index(*index, self.translation.get_size());
                let update = Operation::Update {
                    index: sorted,
                    previous: previous.clone(),
                    value: value.clone(),
                };
                if sorted == *index {
                    self.log.push(update);
                } else {
                    let _ = self.translation.move_item(*index, sorted);
                    self.log.transact(|| {
                        self.log.push(Operation::Move {
                            source: *index,
                            destination: sorted,
                        });
                        self.log.push(update);
                    });
                }
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ListModel<T> for SortedListModel<T> {
    fn get_size(&self) -> usize {
        self.inner.translation.get_size()
    }

    fn get(&self, index: usize) -> Result<T, OutOfRange> {
        self.inner.translation.get(index)
    }

    fn set(&self, index: usize, value: T) -> Result<ValidationState, OutOfRange> {
        self.inner.translation.set(index, value)
    }

    fn insert(&self, value: T, index: usize) -> Result<ValidationState, OutOfRange> {
        self.inner.translation.insert(value, index)
    }

    fn move_item(
        &self,
        source: usize,
        destination: usize,
    ) -> Result<ValidationState, OutOfRange> {
        // The comparator owns the order; only the degenerate no-op move is
        // accepted.
        if source == destination {
            return Ok(ValidationState::Acceptable);
        }
        Ok(ValidationState::Invalid)
    }

    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange> {
        self.inner.translation.remove(index)
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
        model: &SortedListModel<T>,
    ) -> Arc<Mutex<Vec<Operation<T>>>> {
        let operations = Arc::new(Mutex::new(Vec::new()));
        let captured = operations.clone();
        model.operation_signal().connect(move |operation| {
            captured.lock().push(operation.clone());
        });
        operations
    }

    fn require_sorted(model: &SortedListModel<i32>, expected: &[i32]) {
        assert_eq!(model.get_size(), expected.len());
        for (index, value) in expected.iter().enumerate() {
            assert_eq!(model.get(index).unwrap(), *value);
        }
    }

    #[test]
    fn test_initial_sort() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        require_sorted(&sorted, &[1, 2, 4, 9]);
        // The source is left untouched.
        assert_eq!(source.get(0).unwrap(), 4);
        assert_eq!(source.get(3).unwrap(), 1);
    }

    #[test]
    fn test_push_relocates() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        let operations = capture(&sorted);
        source.push(3).unwrap();
        assert_eq!(*operations.lock(), vec![Operation::Add { index: 2 }]);
        require_sorted(&sorted, &[1, 2, 3, 4, 9]);
        operations.lock().clear();
        source.push(10).unwrap();
        assert_eq!(*operations.lock(), vec![Operation::Add { index: 5 }]);
        require_sorted(&sorted, &[1, 2, 3, 4, 9, 10]);
        operations.lock().clear();
        source.push(0).unwrap();
        assert_eq!(*operations.lock(), vec![Operation::Add { index: 0 }]);
        require_sorted(&sorted, &[0, 1, 2, 3, 4, 9, 10]);
    }

    #[test]
    fn test_update_in_place() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        let operations = capture(&sorted);
        // 2 -> 3 keeps its rank: a bare Update at the sorted index.
        source.set(1, 3).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![Operation::Update {
                index: 1,
                previous: 2,
                value: 3,
            }]
        );
        require_sorted(&sorted, &[1, 3, 4, 9]);
    }

    #[test]
    fn test_update_relocates_as_move_then_update() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        let operations = capture(&sorted);
        // 2 -> 10 moves from sorted index 1 to the end.
        source.set(1, 10).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![
                Operation::StartTransaction,
                Operation::Move {
                    source: 1,
                    destination: 3,
                },
                Operation::Update {
                    index: 3,
                    previous: 2,
                    value: 10,
                },
                Operation::EndTransaction,
            ]
        );
        require_sorted(&sorted, &[1, 4, 9, 10]);
    }

    #[test]
    fn test_remove_passthrough() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        let operations = capture(&sorted);
        // Source index 2 holds 9, sorted index 3.
        source.remove(2).unwrap();
        assert_eq!(
            *operations.lock(),
            vec![
                Operation::PreRemove { index: 3 },
                Operation::Remove { index: 3 },
            ]
        );
        require_sorted(&sorted, &[1, 2, 4]);
    }

    #[test]
    fn test_remove_through_view() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        sorted.remove(0).unwrap();
        require_sorted(&sorted, &[2, 4, 9]);
        assert_eq!(source.get_size(), 3);
        assert_eq!(source.get(0).unwrap(), 4);
    }

    #[test]
    fn test_set_through_view() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        // Sorted index 0 holds 1, stored at source index 3.
        sorted.set(0, 5).unwrap();
        assert_eq!(source.get(3).unwrap(), 5);
        require_sorted(&sorted, &[2, 4, 5, 9]);
    }

    #[test]
    fn test_insert_is_invalid() {
        let source = Arc::new(ArrayListModel::from(vec![2, 1]));
        let sorted = SortedListModel::new(source.clone());
        assert_eq!(sorted.insert(3, 0).unwrap(), ValidationState::Invalid);
        assert_eq!(sorted.push(3).unwrap(), ValidationState::Invalid);
        assert_eq!(sorted.move_item(0, 1).unwrap(), ValidationState::Invalid);
        assert_eq!(sorted.move_item(1, 1).unwrap(), ValidationState::Acceptable);
        assert_eq!(sorted.get_size(), 2);
    }

    #[test]
    fn test_tied_elements_insert_at_lower_bound() {
        let source = Arc::new(ArrayListModel::from(vec![(2, 'a'), (1, 'b')]));
        let sorted =
            SortedListModel::with_comparator(source.clone(), |left, right| left.0.cmp(&right.0));
        // A new element tied with an existing one lands at the lower bound,
        // ahead of the elements it ties with.
        source.push((1, 'c')).unwrap();
        assert_eq!(sorted.get(0).unwrap(), (1, 'c'));
        assert_eq!(sorted.get(1).unwrap(), (1, 'b'));
        assert_eq!(sorted.get(2).unwrap(), (2, 'a'));
    }

    #[test]
    fn test_set_comparator() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        require_sorted(&sorted, &[1, 2, 4, 9]);
        let operations = capture(&sorted);
        sorted.set_comparator(|left: &i32, _, right: &i32, _| right.cmp(left));
        require_sorted(&sorted, &[9, 4, 2, 1]);
        let operations = operations.lock();
        assert_eq!(operations.first(), Some(&Operation::StartTransaction));
        assert_eq!(operations.last(), Some(&Operation::EndTransaction));
        assert!(
            operations[1..operations.len() - 1]
                .iter()
                .all(|operation| matches!(operation, Operation::Move { .. }))
        );
    }

    #[test]
    fn test_source_transaction() {
        let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
        let sorted = SortedListModel::new(source.clone());
        let operations = capture(&sorted);
        source.transact(&mut || {
            source.push(3).unwrap();
            source.push(0).unwrap();
        });
        require_sorted(&sorted, &[0, 1, 2, 3, 4, 9]);
        assert_eq!(
            *operations.lock(),
            vec![
                Operation::StartTransaction,
                Operation::Add { index: 2 },
                Operation::Add { index: 0 },
                Operation::EndTransaction,
            ]
        );
    }
}
