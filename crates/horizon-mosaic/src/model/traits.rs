//! Core traits for composing content providers.
//!
//! This module defines the capability every content provider exposes to a
//! composite ([`Provider`]) and the channel providers use to report
//! structural changes upward ([`BatchSink`]).

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use horizon_mosaic_core::logging::targets;
use horizon_mosaic_core::{CompositionError, LocalIndex, ProviderId, Result};

use super::batch::MutationOp;
use super::selection::SelectionHandler;

/// A shared handle to a provider.
///
/// Composites hold their children through these handles; they never own the
/// provider's data.
pub type ProviderHandle = Arc<dyn Provider>;

/// The capability a content provider exposes to a composite.
///
/// Leaves and composites implement the same trait, which is what lets an
/// outer composite treat an inner one exactly like a leaf.
///
/// # Implementation Requirements
///
/// At minimum, you must implement:
/// - [`id`](Provider::id) - A stable identity, usually from [`ProviderId::next`]
/// - [`section_count`](Provider::section_count) - Number of sections
/// - [`item_count`](Provider::item_count) - Number of items in a section
///
/// Providers that emit mutation batches should also implement
/// [`set_batch_sink`](Provider::set_batch_sink) and store the sink.
///
/// # Example
///
/// ```ignore
/// use horizon_mosaic::model::Provider;
/// use horizon_mosaic::{CompositionError, ProviderId, Result};
///
/// struct Fixed {
///     id: ProviderId,
///     rows: usize,
/// }
///
/// impl Provider for Fixed {
///     fn id(&self) -> ProviderId {
///         self.id
///     }
///
///     fn section_count(&self) -> usize {
///         1
///     }
///
///     fn item_count(&self, section: usize) -> Result<usize> {
///         if section == 0 {
///             Ok(self.rows)
///         } else {
///             Err(CompositionError::section_out_of_range(section, 1))
///         }
///     }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// Returns the identity of this provider.
    ///
    /// Must not change while the provider is attached anywhere.
    fn id(&self) -> ProviderId;

    /// Returns the number of sections.
    fn section_count(&self) -> usize;

    /// Returns the number of items in `section`.
    ///
    /// Fails with `OutOfRange` if `section >= section_count()`.
    fn item_count(&self, section: usize) -> Result<usize>;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Returns the selection handler for this provider, if it declares one.
    ///
    /// Without a handler the selection router applies its default policy.
    fn selection_handler(&self) -> Option<Arc<dyn SelectionHandler>> {
        None
    }

    /// Sets (or clears) the sink this provider reports mutation batches to.
    ///
    /// Composites call this when the provider is attached and detached. The
    /// default ignores the sink, which suits providers that never change.
    fn set_batch_sink(&self, _sink: Option<Weak<dyn BatchSink>>) {}

    /// Clears the sink if it is still `sink`.
    ///
    /// A provider attached to several composites reports to the last one;
    /// detaching it from an earlier one must leave that sink in place.
    /// Providers that store their sink in a [`BatchSinkSlot`] override this
    /// with [`BatchSinkSlot::clear_if`]. The default clears unconditionally.
    fn detach_batch_sink(&self, _sink: &Weak<dyn BatchSink>) {
        self.set_batch_sink(None);
    }

    /// Returns the providers nested directly inside this one.
    ///
    /// Leaves have none. Composites return their children so ancestry can
    /// be walked when attaching.
    fn child_providers(&self) -> Vec<ProviderHandle> {
        Vec::new()
    }

    /// A short human-readable label used by debug output.
    fn debug_label(&self) -> String {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_string()
    }

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Checks that `index` addresses an existing item.
    fn validate_index(&self, index: &LocalIndex) -> Result<()> {
        let sections = self.section_count();
        if index.section >= sections {
            return Err(CompositionError::section_out_of_range(
                index.section,
                sections,
            ));
        }
        let items = self.item_count(index.section)?;
        if index.item >= items {
            return Err(CompositionError::item_out_of_range(index.item, items));
        }
        Ok(())
    }

    /// Returns the number of items across all sections.
    fn total_item_count(&self) -> usize {
        (0..self.section_count())
            .filter_map(|section| self.item_count(section).ok())
            .sum()
    }
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id())
            .field("label", &self.debug_label())
            .field("sections", &self.section_count())
            .finish()
    }
}

/// Receives structural mutation batches from a provider.
///
/// A composite implements this for its children: it translates the batch
/// into its own coordinate space and forwards it to its own sink. The root
/// of the chain is the rendering surface.
pub trait BatchSink: Send + Sync {
    /// Applies a batch of operations, expressed in `source`'s coordinates,
    /// as one indivisible update.
    fn perform_batch_updates(&self, source: ProviderId, ops: Vec<MutationOp>) -> Result<()>;

    /// Reloads everything `source` displays.
    fn reload_data(&self, source: ProviderId) -> Result<()>;
}

/// Storage for a provider's optional, weakly held batch sink.
///
/// The sink is weak so that a child never keeps its parent composite alive.
#[derive(Default)]
pub struct BatchSinkSlot {
    sink: Mutex<Option<Weak<dyn BatchSink>>>,
}

impl BatchSinkSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored sink.
    pub fn set(&self, sink: Option<Weak<dyn BatchSink>>) {
        *self.sink.lock() = sink;
    }

    /// Clears the stored sink if it is `sink`. Returns whether it was cleared.
    pub fn clear_if(&self, sink: &Weak<dyn BatchSink>) -> bool {
        let mut stored = self.sink.lock();
        match stored.as_ref() {
            Some(current) if Weak::ptr_eq(current, sink) => {
                *stored = None;
                true
            }
            _ => false,
        }
    }

    /// Returns the sink if one is set and still alive.
    pub fn get(&self) -> Option<Arc<dyn BatchSink>> {
        self.sink.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Returns `true` if a live sink is attached.
    pub fn is_attached(&self) -> bool {
        self.get().is_some()
    }

    /// Sends a batch to the sink.
    ///
    /// Empty batches are dropped. With no sink attached the batch is dropped
    /// as well; there is nobody to tell.
    pub fn send(&self, source: ProviderId, ops: Vec<MutationOp>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        match self.get() {
            Some(sink) => sink.perform_batch_updates(source, ops),
            None => {
                tracing::trace!(target: targets::PROVIDER, %source, op_count = ops.len(), "no batch sink, dropping batch");
                Ok(())
            }
        }
    }

    /// Asks the sink to reload everything `source` displays.
    pub fn reload(&self, source: ProviderId) -> Result<()> {
        match self.get() {
            Some(sink) => sink.reload_data(source),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for BatchSinkSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSinkSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}
