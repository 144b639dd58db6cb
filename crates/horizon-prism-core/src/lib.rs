//! Core systems for Horizon Prism: signals and scoped connections.
//!
//! This crate provides the notification primitives the model layer is built
//! on. A [`Signal`] is a type-safe observer list: models emit their change
//! notifications through signals, and observers connect slots (callbacks)
//! that run synchronously when the signal is emitted.
//!
//! # Example
//!
//! ```
//! use horizon_prism_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//!
//! text_changed.disconnect(conn_id);
//! ```

mod signal;

pub use signal::{ConnectionGuard, ConnectionId, Signal};
