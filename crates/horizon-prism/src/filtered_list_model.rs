//! A view over the subsequence of a source list not excluded by a filter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};

use horizon_prism_core::{ConnectionGuard, Signal};

use crate::error::OutOfRange;
use crate::list_model::ListModel;
use crate::operation::Operation;
use crate::transaction_log::ListModelTransactionLog;
use crate::validation::ValidationState;

/// Callback deciding which source elements are hidden.
///
/// The callback receives the source model and a source index and returns
/// `true` iff that element is excluded from the view.
pub type Filter<T> = Arc<dyn Fn(&dyn ListModel<T>, usize) -> bool + Send + Sync>;

/// A [`ListModel`] exposing the elements of its source a filter does not
/// exclude, in source order.
///
/// The view maintains the ordered set of included source indices and
/// translates every source operation incrementally — a source change
/// produces at most one structural event on the view. Updates re-evaluate
/// the filter at the new value, so an update can surface as an `Add`, a
/// `PreRemove`/`Remove` pair, an `Update`, or nothing.
///
/// The filter itself can be swapped at runtime with
/// [`set_filter`](Self::set_filter), which emits a precise incremental diff
/// against the previous view state as a single transaction — never a reset.
/// `set_filter` may be called from inside one of this model's own operation
/// callbacks; the new filter is deferred and applied after the in-flight
/// dispatch completes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_prism::{ArrayListModel, FilteredListModel, ListModel};
///
/// let source = Arc::new(ArrayListModel::from(vec![4, 2, 9, 1]));
/// let filtered = FilteredListModel::new(source.clone(), |list, index| {
///     list.get(index).unwrap() > 3
/// });
/// assert_eq!(filtered.get_size(), 2);
/// assert_eq!(filtered.get(0).unwrap(), 2);
/// assert_eq!(filtered.get(1).unwrap(), 1);
/// ```
pub struct FilteredListModel<T> {
    inner: Arc<Inner<T>>,
    _source_connection: ConnectionGuard<Operation<T>>,
}

struct Inner<T> {
    source: Arc<dyn ListModel<T>>,
    filter: RwLock<Filter<T>>,
    /// Source indices visible in the view, in ascending order.
    indices: RwLock<Vec<usize>>,
    log: ListModelTransactionLog<T>,
    /// Non-zero while this model is translating an operation or dispatching;
    /// a `set_filter` arriving in that window is parked in `pending_filter`.
    /// A depth, not a flag: dispatch can re-enter through reentrant source
    /// mutation.
    dispatch_depth: AtomicUsize,
    pending_filter: Mutex<Option<Filter<T>>>,
}

impl<T: Clone + Send + Sync + 'static> FilteredListModel<T> {
    /// Constructs a view over `source`, hiding every element for which
    /// `filter` returns `true`.
    pub fn new<F>(source: Arc<dyn ListModel<T>>, filter: F) -> Self
    where
        F: Fn(&dyn ListModel<T>, usize) -> bool + Send + Sync + 'static,
    {
        let filter: Filter<T> = Arc::new(filter);
        let indices = (0..source.get_size())
            .filter(|&index| !filter(source.as_ref(), index))
            .collect();
        let inner = Arc::new(Inner {
            source,
            filter: RwLock::new(filter),
            indices: RwLock::new(indices),
            log: ListModelTransactionLog::new(),
            dispatch_depth: AtomicUsize::new(0),
            pending_filter: Mutex::new(None),
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

    /// Replaces the filter, emitting the incremental diff between the old
    /// and new view as one transaction.
    ///
    /// Safe to call reentrantly from an operation callback: the replacement
    /// is deferred until the current dispatch returns, then applied.
    pub fn set_filter<F>(&self, filter: F)
    where
        F: Fn(&dyn ListModel<T>, usize) -> bool + Send + Sync + 'static,
    {
        self.inner.set_filter(Arc::new(filter));
    }

    fn view_to_source(&self, index: usize) -> Result<usize, OutOfRange> {
        let indices = self.inner.indices.read();
        indices.get(index).copied().ok_or(OutOfRange {
            index,
            size: indices.len(),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn set_filter(&self, filter: Filter<T>) {
        if self.dispatch_depth.load(Ordering::Acquire) > 0 {
            *self.pending_filter.lock() = Some(filter);
            return;
        }
        self.guard_dispatch(|| self.apply_filter(filter));
    }

    fn on_operation(&self, operation: &Operation<T>) {
        self.guard_dispatch(|| self.apply_operation(operation));
    }

    /// Runs `body` with the dispatch depth raised, then drains any filter
    /// that was parked by a reentrant `set_filter` while it ran. Only the
    /// outermost dispatch drains.
    fn guard_dispatch(&self, body: impl FnOnce()) {
        self.dispatch_depth.fetch_add(1, Ordering::AcqRel);
        body();
        if self.dispatch_depth.fetch_sub(1, Ordering::AcqRel) > 1 {
            return;
        }
        loop {
            let Some(next) = self.pending_filter.lock().take() else {
                break;
            };
            self.dispatch_depth.fetch_add(1, Ordering::AcqRel);
            self.apply_filter(next);
            self.dispatch_depth.fetch_sub(1, Ordering::AcqRel);
        }
    }

    fn is_excluded(&self, index: usize) -> bool {
        let filter = self.filter.read().clone();
        filter(self.source.as_ref(), index)
    }

    fn apply_operation(&self, operation: &Operation<T>) {
        match operation {
            Operation::StartTransaction => self.log.start(),
            Operation::EndTransaction => self.log.end(),
            Operation::Add { index } => {
                let index = *index;
                let excluded = self.is_excluded(index);
                let position = {
                    let mut indices = self.indices.write();
                    for entry in indices.iter_mut() {
                        if *entry >= index {
                            *entry += 1;
                        }
                    }
                    if excluded {
                        None
                    } else {
                        let position = indices.partition_point(|&entry| entry < index);
                        indices.insert(position, index);
                        Some(position)
                    }
                };
                if let Some(position) = position {
                    self.log.push(Operation::Add { index: position });
                }
            }
            Operation::Move {
                source,
                destination,
            } => {
                let (s, d) = (*source, *destination);
                let moved = {
                    let mut indices = self.indices.write();
                    let previous = indices.binary_search(&s).ok();
                    if let Some(position) = previous {
                        indices.remove(position);
                    }
                    for entry in indices.iter_mut() {
                        if s < d && *entry > s && *entry <= d {
                            *entry -= 1;
                        } else if d < s && *entry >= d && *entry < s {
                            *entry += 1;
                        }
                    }
                    previous.map(|previous| {
                        let position = indices.partition_point(|&entry| entry < d);
                        indices.insert(position, d);
                        (previous, position)
                    })
                };
                if let Some((previous, position)) = moved {
                    if previous != position {
                        self.log.push(Operation::Move {
                            source: previous,
                            destination: position,
                        });
                    }
                }
            }
            Operation::PreRemove { index } => {
                let position = self.indices.read().binary_search(index).ok();
                if let Some(position) = position {
                    self.log.push(Operation::PreRemove { index: position });
                }
            }
            Operation::Remove { index } => {
                let index = *index;
                let position = {
                    let mut indices = self.indices.write();
                    let position = indices.binary_search(&index).ok();
                    if let Some(position) = position {
                        indices.remove(position);
                    }
                    for entry in indices.iter_mut() {
                        if *entry > index {
                            *entry -= 1;
                        }
                    }
                    position
                };
                if let Some(position) = position {
                    self.log.push(Operation::Remove { index: position });
                }
            }
            Operation::Update {
                index,
                previous,
                value,
            } => {
                let index = *index;
                let excluded = self.is_excluded(index);
                let position = self.indices.read().binary_search(&index).ok();
                match (position, excluded) {
                    (Some(position), true) => {
                        self.log.push(Operation::PreRemove { index: position });
                        self.indices.write().remove(position);
                        self.log.push(Operation::Remove { index: position });
                    }
                    (Some(position), false) => {
                        self.log.push(Operation::Update {
                            index: position,
                            previous: previous.clone(),
                            value: value.clone(),
                        });
                    }
                    (None, false) => {
                        let position = {
                            let mut indices = self.indices.write();
                            let position = indices.partition_point(|&entry| entry < index);
                            indices.insert(position, index);
                            position
                        };
                        self.log.push(Operation::Add { index: position });
                    }
                    (None, true) => {}
                }
            }
        }
    }

    /// Installs `filter` and emits the diff between the old and new view as
    /// one left-to-right sweep of the source.
    fn apply_filter(&self, filter: Filter<T>) {
        tracing::trace!(
            target: "horizon_prism::filtered_list_model",
            "applying replacement filter"
        );
        *self.filter.write() = filter.clone();
        self.log.start();
        {
            let mut indices = self.indices.write();
            let mut position = 0;
            for index in 0..self.source.get_size() {
                let included = indices.get(position) == Some(&index);
                let excluded = filter(self.source.as_ref(), index);
                match (included, excluded) {
                    (false, false) => {
                        indices.insert(position, index);
                        self.log.push(Operation::Add { index: position });
                        position += 1;
                    }
                    (true, true) => {
                        self.log.push(Operation::PreRemove { index: position });
                        indices.remove(position);
                        self.log.push(Operation::Remove { index: position });
                    }
                    (true, false) => position += 1,
                    (false, true) => {}
                }
            }
        }
        self.log.end();
    }
}

impl<T: Clone + Send + Sync + 'static> ListModel<T> for FilteredListModel<T> {
    fn get_size(&self) -> usize {
        self.inner.indices.read().len()
    }

    fn get(&self, index: usize) -> Result<T, OutOfRange> {
        let source_index = self.view_to_source(index)?;
        self.inner.source.get(source_index)
    }

    fn set(&self, index: usize, value: T) -> Result<ValidationState, OutOfRange> {
        let source_index = self.view_to_source(index)?;
        self.inner.source.set(source_index, value)
    }

    fn insert(&self, value: T, index: usize) -> Result<ValidationState, OutOfRange> {
        // Insert just before the source element visible at `index`; at the
        // end of the view, append to the source.
        let source_index = {
            let indices = self.inner.indices.read();
            match indices.get(index).copied() {
                Some(source_index) => source_index,
                None if index == indices.len() => self.inner.source.get_size(),
                None => {
                    return Err(OutOfRange {
                        index,
                        size: indices.len(),
                    });
                }
            }
        };
        self.inner.source.insert(value, source_index)
    }

    fn move_item(
        &self,
        source: usize,
        destination: usize,
    ) -> Result<ValidationState, OutOfRange> {
        if source == destination {
            let size = self.get_size();
            if source >= size {
                return Err(OutOfRange {
                    index: source,
                    size,
                });
            }
            return Ok(ValidationState::Acceptable);
        }
        let source_index = self.view_to_source(source)?;
        let destination_index = self.view_to_source(destination)?;
        self.inner.source.move_item(source_index, destination_index)
    }

    fn remove(&self, index: usize) -> Result<ValidationState, OutOfRange> {
        let source_index = self.view_to_source(index)?;
        self.inner.source.remove(source_index)
    }

    fn transact(&self, body: &mut dyn FnMut()) {
        self.inner.log.transact(|| body());
    }

    fn operation_signal(&self) -> &Signal<Operation<T>> {
        self.inner.log.operation_signal()
    }
}
