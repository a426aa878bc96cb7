//! Selection routing for composite collections.
//!
//! A rendering surface asks the composite whether an item may be highlighted
//! or selected, and tells it when that happens. The composite does not decide
//! anything itself: [`SelectionRouter`] finds the child owning the global
//! index, translates it, and asks that child's [`SelectionHandler`]. Children
//! without a handler get the composite's [`SelectionPolicy`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_mosaic::model::{CompositeCollection, CompositionMode, ListProvider, SelectionHandler};
//! use horizon_mosaic::{IndexPath, LocalIndex};
//!
//! struct EvenOnly;
//!
//! impl SelectionHandler for EvenOnly {
//!     fn should_select(&self, index: &LocalIndex) -> bool {
//!         index.item % 2 == 0
//!     }
//! }
//!
//! let composite = CompositeCollection::new(CompositionMode::Single);
//! composite.add(Arc::new(ListProvider::new(vec!["a", "b"]))).unwrap();
//! composite
//!     .add(Arc::new(ListProvider::new(vec!["c", "d"]).with_selection_handler(EvenOnly)))
//!     .unwrap();
//!
//! let router = composite.selection();
//! assert!(router.should_select(IndexPath::item(1)).unwrap()); // no handler
//! assert!(router.should_select(IndexPath::item(2)).unwrap()); // local 0
//! assert!(!router.should_select(IndexPath::item(3)).unwrap()); // local 1
//! ```

use std::sync::Arc;

use horizon_mosaic_core::logging::{span_names, targets};
use horizon_mosaic_core::{GlobalIndex, LocalIndex, PerfSpan, Result};

use super::composite::CompositeCollection;

/// Highlight and selection hooks a provider may declare.
///
/// Every hook has a default: "should" hooks allow, "did" hooks do nothing.
/// Implementors override only what they care about. Indices are in the
/// provider's own coordinate space.
pub trait SelectionHandler: Send + Sync {
    /// Whether the item may be highlighted.
    fn should_highlight(&self, index: &LocalIndex) -> bool {
        let _ = index;
        true
    }

    /// The item was highlighted.
    fn did_highlight(&self, index: &LocalIndex) {
        let _ = index;
    }

    /// The item's highlight was removed.
    fn did_unhighlight(&self, index: &LocalIndex) {
        let _ = index;
    }

    /// Whether the item may be selected.
    fn should_select(&self, index: &LocalIndex) -> bool {
        let _ = index;
        true
    }

    /// The item was selected.
    fn did_select(&self, index: &LocalIndex) {
        let _ = index;
    }

    /// Whether the item may be deselected.
    fn should_deselect(&self, index: &LocalIndex) -> bool {
        let _ = index;
        true
    }

    /// The item was deselected.
    fn did_deselect(&self, index: &LocalIndex) {
        let _ = index;
    }
}

/// Answers given to "should" queries when the owning child has no handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionPolicy {
    /// Answer for `should_highlight`.
    pub allow_highlight: bool,
    /// Answer for `should_select`.
    pub allow_select: bool,
    /// Answer for `should_deselect`.
    pub allow_deselect: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

impl SelectionPolicy {
    /// Allows everything.
    pub const fn permissive() -> Self {
        Self {
            allow_highlight: true,
            allow_select: true,
            allow_deselect: true,
        }
    }

    /// Allows highlighting but not selection changes.
    pub const fn read_only() -> Self {
        Self {
            allow_highlight: true,
            allow_select: false,
            allow_deselect: false,
        }
    }
}

/// Routes selection hooks from a composite to its children.
///
/// Obtained from [`CompositeCollection::selection`]. Every method resolves
/// the global index first; resolution errors are returned, a missing handler
/// is not an error.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRouter<'a> {
    composite: &'a CompositeCollection,
}

impl<'a> SelectionRouter<'a> {
    pub(crate) fn new(composite: &'a CompositeCollection) -> Self {
        Self { composite }
    }

    fn policy(&self) -> SelectionPolicy {
        self.composite.config().selection_policy
    }

    #[tracing::instrument(skip(self), target = "horizon_mosaic::selection", level = "trace")]
    fn resolve(&self, global: GlobalIndex) -> Result<(Option<Arc<dyn SelectionHandler>>, LocalIndex)> {
        let _span = PerfSpan::new(span_names::SELECTION);
        let (child, local) = self.composite.provider_and_local(global)?;
        let handler = child.selection_handler();
        tracing::trace!(
            target: targets::SELECTION,
            child = %child.id(),
            %local,
            has_handler = handler.is_some(),
            "resolved selection target"
        );
        Ok((handler, local))
    }

    /// Whether the item at `global` may be highlighted.
    pub fn should_highlight(&self, global: GlobalIndex) -> Result<bool> {
        let (handler, local) = self.resolve(global)?;
        Ok(handler.map_or(self.policy().allow_highlight, |h| h.should_highlight(&local)))
    }

    /// Tell the owning child the item at `global` was highlighted.
    pub fn did_highlight(&self, global: GlobalIndex) -> Result<()> {
        let (handler, local) = self.resolve(global)?;
        if let Some(handler) = handler {
            handler.did_highlight(&local);
        }
        Ok(())
    }

    /// Tell the owning child the item at `global` lost its highlight.
    pub fn did_unhighlight(&self, global: GlobalIndex) -> Result<()> {
        let (handler, local) = self.resolve(global)?;
        if let Some(handler) = handler {
            handler.did_unhighlight(&local);
        }
        Ok(())
    }

    /// Whether the item at `global` may be selected.
    pub fn should_select(&self, global: GlobalIndex) -> Result<bool> {
        let (handler, local) = self.resolve(global)?;
        Ok(handler.map_or(self.policy().allow_select, |h| h.should_select(&local)))
    }

    /// Tell the owning child the item at `global` was selected.
    pub fn did_select(&self, global: GlobalIndex) -> Result<()> {
        let (handler, local) = self.resolve(global)?;
        if let Some(handler) = handler {
            handler.did_select(&local);
        }
        Ok(())
    }

    /// Whether the item at `global` may be deselected.
    pub fn should_deselect(&self, global: GlobalIndex) -> Result<bool> {
        let (handler, local) = self.resolve(global)?;
        Ok(handler.map_or(self.policy().allow_deselect, |h| h.should_deselect(&local)))
    }

    /// Tell the owning child the item at `global` was deselected.
    pub fn did_deselect(&self, global: GlobalIndex) -> Result<()> {
        let (handler, local) = self.resolve(global)?;
        if let Some(handler) = handler {
            handler.did_deselect(&local);
        }
        Ok(())
    }
}
