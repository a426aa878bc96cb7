//! Prelude module for Horizon Mosaic.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use horizon_mosaic::prelude::*;
//! ```

// ============================================================================
// Coordinates and Errors
// ============================================================================

pub use crate::{CompositionError, GlobalIndex, IndexPath, LocalIndex, ProviderId};

// ============================================================================
// Signals
// ============================================================================

pub use crate::signal::{ConnectionId, Signal};

// ============================================================================
// Composition
// ============================================================================

pub use crate::model::{
    BatchSink, CompositeBuilder, CompositeCollection, CompositionMode, MutationOp, Provider,
    ProviderHandle,
};

// ============================================================================
// Providers
// ============================================================================

pub use crate::model::{ListProvider, SectionedProvider};

// ============================================================================
// Selection
// ============================================================================

pub use crate::model::{SelectionHandler, SelectionPolicy};
