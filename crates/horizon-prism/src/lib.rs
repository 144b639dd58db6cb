//! Observable list and table models for Horizon Prism.
//!
//! This crate is the model half of a Model/View architecture: collections
//! that broadcast every mutation as a typed [`Operation`], and transform
//! views that project a source collection while translating its operation
//! stream into a minimal, correctly-indexed stream describing the derived
//! collection. Views never rebuild; every source mutation is translated
//! incrementally against a bidirectional index mapping.
//!
//! # Core Types
//!
//! - [`ListModel`] / [`TableModel`]: the observable collection contracts
//! - [`Operation`] / [`TableOperation`]: the closed operation taxonomies
//! - [`ArrayListModel`] / [`ArrayTableModel`]: concrete in-memory sources
//! - [`TransactionLog`]: transaction buffering and dispatch, composed by
//!   every model
//!
//! # Transform Views
//!
//! - [`ReversedListModel`]: the source in reverse order
//! - [`TranslatedListModel`]: an arbitrary permutation of the source, built
//!   incrementally through [`move_item`](ListModel::move_item)
//! - [`FilteredListModel`]: the subsequence of the source not excluded by a
//!   runtime-swappable filter
//! - [`SortedListModel`]: the source ordered by a runtime-swappable
//!   comparator
//! - [`TableToListModel`]: a table's rows as a flat list of [`RowView`]
//!   handles
//!
//! Every view is itself a [`ListModel`], so views chain arbitrarily deep:
//!
//! ```text
//! ┌────────────┐  Operation   ┌───────────────┐  Operation   ┌──────┐
//! │   source   │─────────────>│ transform view│─────────────>│ view │ ...
//! │ (ListModel)│              │  (ListModel)  │              │      │
//! └────────────┘              └───────────────┘              └──────┘
//!        edits go down, operations come back up, indices translated
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_prism::{ArrayListModel, ListModel, Operation, TranslatedListModel};
//!
//! let source = Arc::new(ArrayListModel::new());
//! source.push(4).unwrap();
//! source.push(2).unwrap();
//! source.push(9).unwrap();
//! source.push(1).unwrap();
//!
//! let translation = TranslatedListModel::new(source.clone());
//! let _guard = translation.operation_signal().connect_scoped(|operation| {
//!     if let Operation::Move { source, destination } = operation {
//!         println!("row {source} moved to {destination}");
//!     }
//! });
//!
//! translation.move_item(3, 0).unwrap();
//! assert_eq!(translation.get(0).unwrap(), 1);
//! assert_eq!(source.get(0).unwrap(), 4); // the source is untouched
//! ```
//!
//! # Transactions
//!
//! [`ListModel::transact`] batches edits: observers receive the batch
//! bracketed by [`Operation::StartTransaction`] /
//! [`Operation::EndTransaction`], nested transactions coalesce into the
//! outermost one, and a transaction producing exactly one operation is
//! delivered unwrapped.
//!
//! # Threading
//!
//! The layer is single-threaded by design: mutation and notification
//! dispatch happen synchronously on the calling thread. Types are
//! `Send + Sync` so an embedding GUI can own them wherever it likes, but no
//! internal synchronization beyond that is attempted, and reentrant
//! mutation from inside a notification is handled by deferral, not locking.

pub use horizon_prism_core::*;

mod array_list_model;
mod array_table_model;
mod error;
mod filtered_list_model;
mod list_model;
mod operation;
mod reversed_list_model;
mod sorted_list_model;
mod table_model;
mod table_to_list_model;
mod transaction_log;
mod translated_list_model;
mod validation;

pub use array_list_model::ArrayListModel;
pub use array_table_model::ArrayTableModel;
pub use error::OutOfRange;
pub use filtered_list_model::{Filter, FilteredListModel};
pub use list_model::{ListModel, clear};
pub use operation::Operation;
pub use reversed_list_model::ReversedListModel;
pub use sorted_list_model::{Comparator, SortedListModel};
pub use table_model::{TableModel, TableOperation};
pub use table_to_list_model::{RowView, TableToListModel, TableUpdate};
pub use transaction_log::{
    ListModelTransactionLog, TableModelTransactionLog, TransactionLog, TransactionalOperation,
};
pub use translated_list_model::TranslatedListModel;
pub use validation::ValidationState;
