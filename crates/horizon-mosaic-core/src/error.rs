//! Error types for Horizon Mosaic.
//!
//! Every variant describes a misuse of the composition contract, never a
//! transient condition, so callers are expected to surface them rather than
//! retry.

use crate::index::{IndexPath, ProviderId};

/// A specialized Result type for composition operations.
pub type Result<T> = std::result::Result<T, CompositionError>;

/// Errors raised by providers, composites and the batch translator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    /// A section, item or insertion position lies outside any valid range.
    #[error("{what} {index} is out of range (bound {bound})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// A child of a single-section composite reports more than one section.
    #[error("provider {provider} reports {sections} sections in a single-section composite")]
    InconsistentSectionCount {
        provider: ProviderId,
        sections: usize,
    },

    /// A move operation's endpoints do not both belong to the emitting child.
    #[error("move from {from} to {to} crosses out of provider {provider}")]
    MoveAcrossProviders {
        provider: ProviderId,
        from: IndexPath,
        to: IndexPath,
    },

    /// The child list was mutated, or a translation started, while a batch
    /// translation was already in progress.
    #[error("{operation} attempted while a batch translation is in progress")]
    ReentrantMutation { operation: &'static str },

    /// Attaching the provider would make a composite contain itself.
    #[error("attaching provider {provider} would create a composition cycle")]
    CycleDetected { provider: ProviderId },

    /// The provider is already attached to this composite.
    #[error("provider {provider} is already attached")]
    DuplicateProvider { provider: ProviderId },

    /// The provider is not attached to this composite.
    #[error("provider {provider} is not attached")]
    UnknownProvider { provider: ProviderId },
}

impl CompositionError {
    /// Create an out-of-range error for a section.
    pub fn section_out_of_range(section: usize, bound: usize) -> Self {
        Self::OutOfRange {
            what: "section",
            index: section,
            bound,
        }
    }

    /// Create an out-of-range error for an item.
    pub fn item_out_of_range(item: usize, bound: usize) -> Self {
        Self::OutOfRange {
            what: "item",
            index: item,
            bound,
        }
    }

    /// Create a reentrancy error naming the rejected operation.
    pub fn reentrant(operation: &'static str) -> Self {
        Self::ReentrantMutation { operation }
    }

    /// Returns `true` for [`CompositionError::OutOfRange`].
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
