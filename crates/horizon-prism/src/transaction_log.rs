//! Transaction buffering and dispatch for model operations.
//!
//! Every model owns exactly one [`TransactionLog`] and routes all of its
//! notifications through it. The log implements the transaction protocol
//! once, so models and views compose it instead of duplicating it:
//!
//! - outside a transaction, [`push`](TransactionLog::push) dispatches the
//!   operation immediately;
//! - inside a transaction, operations are buffered and flushed when the
//!   outermost transaction ends;
//! - a flush of exactly one operation is delivered bare (the trivial
//!   transaction optimization); zero operations deliver nothing; two or more
//!   are bracketed by start/end markers.
//!
//! Transactions nest by depth counter, so a `transact` inside a `transact`
//! coalesces into the outer one, including across models: a view translates
//! its source's start/end markers into [`start`](TransactionLog::start) /
//! [`end`](TransactionLog::end) calls on its own log.

use parking_lot::Mutex;

use horizon_prism_core::Signal;

use crate::operation::Operation;
use crate::table_model::TableOperation;

/// An operation type that can bracket a batch of operations.
///
/// Implemented by the list and table operation enums so one
/// [`TransactionLog`] serves both.
pub trait TransactionalOperation: Send + 'static {
    /// Returns the operation marking the beginning of a transaction.
    fn start_transaction() -> Self;

    /// Returns the operation marking the end of a transaction.
    fn end_transaction() -> Self;
}

/// Transaction log over list model operations.
pub type ListModelTransactionLog<T> = TransactionLog<Operation<T>>;

/// Transaction log over table model operations.
pub type TableModelTransactionLog<T> = TransactionLog<TableOperation<T>>;

struct LogState<Op> {
    /// Transaction nesting depth. Buffering is active while non-zero.
    level: usize,
    /// Operations accumulated by the open transaction.
    buffer: Vec<Op>,
}

/// Buffers operations produced while a transaction is open and dispatches
/// them through an operation signal.
///
/// See the [module documentation](self) for the dispatch protocol.
pub struct TransactionLog<Op> {
    state: Mutex<LogState<Op>>,
    signal: Signal<Op>,
}

impl<Op: TransactionalOperation> Default for TransactionLog<Op> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Op: TransactionalOperation> TransactionLog<Op> {
    /// Creates an empty log with no transaction open.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LogState {
                level: 0,
                buffer: Vec::new(),
            }),
            signal: Signal::new(),
        }
    }

    /// Returns the signal operations are dispatched through.
    pub fn operation_signal(&self) -> &Signal<Op> {
        &self.signal
    }

    /// Opens a transaction, or deepens the one already open.
    pub fn start(&self) {
        self.state.lock().level += 1;
    }

    /// Closes one level of transaction, flushing the buffer if the outermost
    /// level was closed.
    pub fn end(&self) {
        let flushed = {
            let mut state = self.state.lock();
            debug_assert!(state.level > 0, "unbalanced transaction end");
            state.level -= 1;
            if state.level > 0 {
                return;
            }
            std::mem::take(&mut state.buffer)
        };
        tracing::trace!(
            target: "horizon_prism::transaction_log",
            operations = flushed.len(),
            "flushing transaction"
        );
        if flushed.len() == 1 {
            // Trivial transaction: a single operation is delivered unwrapped.
            for operation in flushed {
                self.signal.emit(operation);
            }
        } else if !flushed.is_empty() {
            self.signal.emit(Op::start_transaction());
            for operation in flushed {
                self.signal.emit(operation);
            }
            self.signal.emit(Op::end_transaction());
        }
    }

    /// Records an operation: dispatched immediately outside a transaction,
    /// buffered inside one.
    pub fn push(&self, operation: Op) {
        {
            let mut state = self.state.lock();
            if state.level > 0 {
                state.buffer.push(operation);
                return;
            }
        }
        self.signal.emit(operation);
    }

    /// Runs `body` inside a transaction on this log.
    pub fn transact(&self, body: impl FnOnce()) {
        self.start();
        body();
        self.end();
    }
}
