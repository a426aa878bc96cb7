//! Core types for Horizon Mosaic.
//!
//! This crate provides the foundation the composition engine is built on:
//!
//! - **Index paths**: `(section, item)` coordinates and provider identity
//! - **Errors**: the typed [`CompositionError`] taxonomy
//! - **Signal/Slot System**: direct, synchronous change notification
//! - **Thread affinity**: verifying a composition tree stays on one thread
//! - **Logging**: tracing targets and span helpers
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_mosaic_core::{IndexPath, Signal};
//!
//! let selected = Signal::<IndexPath>::new();
//! let conn_id = selected.connect(|index| {
//!     println!("Selected {}", index);
//! });
//!
//! selected.emit(IndexPath::new(0, 3));
//! selected.disconnect(conn_id);
//! ```

mod error;
mod index;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use error::{CompositionError, Result};
pub use index::{GlobalIndex, IndexPath, LocalIndex, ProviderId};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
