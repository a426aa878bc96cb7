//! Single-section list provider.
//!
//! `ListProvider<T>` holds a plain list of items in one section. Every change
//! goes through the provider so it can report the matching [`MutationOp`]s to
//! its batch sink:
//!
//! ```
//! use std::sync::Arc;
//! use horizon_mosaic::model::{CompositeCollection, CompositionMode, ListProvider, Provider};
//!
//! let list = Arc::new(ListProvider::new(vec!["b", "c"]));
//! let composite = CompositeCollection::new(CompositionMode::Single);
//! composite.add(list.clone()).unwrap();
//!
//! list.perform_batch_updates(|editor| {
//!     editor.insert(0, "a")?;
//!     editor.push("d");
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(composite.item_count(0).unwrap(), 4);
//! assert_eq!(list.item(0), Some("a"));
//! ```

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use horizon_mosaic_core::logging::targets;
use horizon_mosaic_core::{CompositionError, IndexPath, ProviderId, Result};

use super::batch::MutationOp;
use super::selection::SelectionHandler;
use super::traits::{BatchSink, BatchSinkSlot, Provider};

/// A provider exposing a list of items as a single section.
pub struct ListProvider<T> {
    id: ProviderId,
    items: RwLock<Vec<T>>,
    selection_handler: RwLock<Option<Arc<dyn SelectionHandler>>>,
    sink: BatchSinkSlot,
}

impl<T: Send + Sync + 'static> ListProvider<T> {
    /// Creates a provider with the given items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            id: ProviderId::next(),
            items: RwLock::new(items),
            selection_handler: RwLock::new(None),
            sink: BatchSinkSlot::new(),
        }
    }

    /// Creates an empty provider.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Sets the selection handler.
    pub fn with_selection_handler(self, handler: impl SelectionHandler + 'static) -> Self {
        *self.selection_handler.write() = Some(Arc::new(handler));
        self
    }

    /// Replaces (or clears) the selection handler.
    pub fn set_selection_handler(&self, handler: Option<Arc<dyn SelectionHandler>>) {
        *self.selection_handler.write() = handler;
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the provider has no items.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns a clone of the item at `index`.
    pub fn item(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.read().get(index).cloned()
    }

    /// Returns a read guard over the items.
    ///
    /// Drop the guard before mutating the provider.
    pub fn items(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.items.read()
    }

    /// Appends an item.
    pub fn push(&self, item: T) -> Result<()> {
        self.perform_batch_updates(|editor| {
            editor.push(item);
            Ok(())
        })
    }

    /// Inserts an item at `index`.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        self.perform_batch_updates(|editor| editor.insert(index, item))
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&self, index: usize) -> Result<T> {
        self.perform_batch_updates(|editor| editor.remove(index))
    }

    /// Replaces the item at `index`, returning the old one.
    pub fn replace_item(&self, index: usize, item: T) -> Result<T> {
        self.perform_batch_updates(|editor| editor.replace(index, item))
    }

    /// Replaces every item and asks the sink for a full reload.
    pub fn set_items(&self, items: Vec<T>) -> Result<()> {
        *self.items.write() = items;
        tracing::debug!(target: targets::PROVIDER, provider = %self.id, "items replaced");
        self.sink.reload(self.id)
    }

    /// Removes every item.
    pub fn clear(&self) -> Result<()> {
        self.set_items(Vec::new())
    }

    /// Applies several edits and reports them as one batch.
    ///
    /// The items stay locked while `edit` runs; the recorded ops are sent to
    /// the sink after the lock is released. If `edit` fails part way, the ops
    /// recorded before the failure are still sent and the edit's error is
    /// returned.
    pub fn perform_batch_updates<F, R>(&self, edit: F) -> Result<R>
    where
        F: FnOnce(&mut ListEditor<'_, T>) -> Result<R>,
    {
        let (result, ops) = {
            let mut items = self.items.write();
            let mut editor = ListEditor {
                items: &mut *items,
                ops: Vec::new(),
            };
            let result = edit(&mut editor);
            (result, editor.ops)
        };

        tracing::trace!(target: targets::PROVIDER, provider = %self.id, op_count = ops.len(), "list batch");
        let sent = self.sink.send(self.id, ops);
        let value = result?;
        sent?;
        Ok(value)
    }
}

impl<T: Send + Sync + 'static> Default for ListProvider<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Send + Sync + 'static> Provider for ListProvider<T> {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn section_count(&self) -> usize {
        1
    }

    fn item_count(&self, section: usize) -> Result<usize> {
        if section != 0 {
            return Err(CompositionError::section_out_of_range(section, 1));
        }
        Ok(self.len())
    }

    fn selection_handler(&self) -> Option<Arc<dyn SelectionHandler>> {
        self.selection_handler.read().clone()
    }

    fn set_batch_sink(&self, sink: Option<Weak<dyn BatchSink>>) {
        self.sink.set(sink);
    }

    fn detach_batch_sink(&self, sink: &Weak<dyn BatchSink>) {
        self.sink.clear_if(sink);
    }
}

impl<T> std::fmt::Debug for ListProvider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListProvider")
            .field("id", &self.id)
            .field("len", &self.items.read().len())
            .field("sink", &self.sink)
            .finish()
    }
}

/// Edits a [`ListProvider`]'s items and records the matching ops.
pub struct ListEditor<'a, T> {
    items: &'a mut Vec<T>,
    ops: Vec<MutationOp>,
}

impl<T> ListEditor<'_, T> {
    /// Returns the current number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the ops recorded so far.
    pub fn ops(&self) -> &[MutationOp] {
        &self.ops
    }

    /// Appends an item.
    pub fn push(&mut self, item: T) {
        let index = self.items.len();
        self.items.push(item);
        self.ops.push(MutationOp::InsertItems(vec![IndexPath::item(index)]));
    }

    /// Inserts an item at `index`.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        if index > self.items.len() {
            return Err(CompositionError::item_out_of_range(index, self.items.len()));
        }
        self.items.insert(index, item);
        self.ops.push(MutationOp::InsertItems(vec![IndexPath::item(index)]));
        Ok(())
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        self.check(index)?;
        let item = self.items.remove(index);
        self.ops.push(MutationOp::DeleteItems(vec![IndexPath::item(index)]));
        Ok(item)
    }

    /// Replaces the item at `index`, returning the old one.
    pub fn replace(&mut self, index: usize, item: T) -> Result<T> {
        self.check(index)?;
        let old = std::mem::replace(&mut self.items[index], item);
        self.ops.push(MutationOp::ReloadItems(vec![IndexPath::item(index)]));
        Ok(old)
    }

    /// Marks the item at `index` for reload without changing it.
    pub fn reload(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.ops.push(MutationOp::ReloadItems(vec![IndexPath::item(index)]));
        Ok(())
    }

    /// Moves the item at `from` so that it ends up at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.check(from)?;
        self.check(to)?;
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.ops.push(MutationOp::MoveItem {
            from: IndexPath::item(from),
            to: IndexPath::item(to),
        });
        Ok(())
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(CompositionError::item_out_of_range(index, self.items.len()));
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(ListProvider<String>: Send, Sync);
