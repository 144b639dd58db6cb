//! Signal/slot system for Horizon Prism.
//!
//! This module provides a type-safe, Qt-inspired signal/slot mechanism for
//! change notification. Signals are emitted by objects when their state
//! changes, and connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Dispatch
//!
//! Dispatch is always direct: slots run synchronously on the emitting thread,
//! in connection order. There is no deferred or cross-thread queueing at this
//! layer; an embedding event loop is free to build one on top.
//!
//! # Reentrancy
//!
//! Emission is reentrancy-safe. A slot may connect, disconnect, or emit the
//! same signal while an emission is in progress. The slot list is snapshotted
//! at the start of each emission, so a slot disconnected mid-emission may
//! still be invoked once for that emission, and a slot connected mid-emission
//! is first invoked on the next one.
//!
//! # Example
//!
//! ```
//! use horizon_prism_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|&value| {
//!     println!("value is now {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

type ConnectionMap<Args> = SlotMap<ConnectionId, Connection<Args>>;

/// A type-safe signal that can have multiple connected slots.
///
/// Signals are the core of the observer pattern in Horizon Prism. When a
/// signal is emitted, all connected slots are invoked with a reference to the
/// provided arguments.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple like `(String, i32)` for multiple
///   arguments.
///
/// # Related Types
///
/// - [`ConnectionId`] - Returned by [`connect`](Self::connect), used to
///   disconnect
/// - [`ConnectionGuard`] - RAII-style connection that auto-disconnects on
///   drop
pub struct Signal<Args> {
    /// All active connections, shared with outstanding [`ConnectionGuard`]s.
    connections: Arc<Mutex<ConnectionMap<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot
    /// later.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_prism_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
        })
    }

    /// Connect a slot with automatic disconnection when the guard is dropped.
    ///
    /// The guard holds a weak reference to this signal's connection list, so
    /// it is safe to drop the guard before or after the signal itself.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use horizon_prism_core::Signal;
    ///
    /// let signal = Signal::<i32>::new();
    /// let counter = Arc::new(AtomicI32::new(0));
    /// {
    ///     let counter = counter.clone();
    ///     let _guard = signal.connect_scoped(move |&n| {
    ///         counter.fetch_add(n, Ordering::SeqCst);
    ///     });
    ///     signal.emit(42);
    /// }
    /// signal.emit(43); // Nothing happens - connection was dropped
    /// assert_eq!(counter.load(Ordering::SeqCst), 42);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            connections: Arc::downgrade(&self.connections),
            id,
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false`
    /// otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// Slots are invoked synchronously on the calling thread, in connection
    /// order, each receiving `&args`. The connection list is snapshotted
    /// before the first slot runs, so slots may freely connect, disconnect,
    /// or re-emit without deadlocking.
    pub fn emit(&self, args: Args) {
        let slots: Vec<_> = {
            let connections = self.connections.lock();
            tracing::trace!(
                target: "horizon_prism_core::signal",
                connection_count = connections.len(),
                "emitting signal"
            );
            connections.values().map(|c| c.slot.clone()).collect()
        };
        for slot in slots {
            slot(&args);
        }
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// Created via [`Signal::connect_scoped`]. The guard only holds a weak
/// reference to the signal's connection list: dropping the guard after the
/// signal has been dropped is a no-op.
pub struct ConnectionGuard<Args> {
    connections: Weak<Mutex<ConnectionMap<Args>>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// Disconnect immediately, consuming the guard.
    pub fn disconnect(self) {}
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.upgrade() {
            connections.lock().remove(self.id);
        }
    }
}
