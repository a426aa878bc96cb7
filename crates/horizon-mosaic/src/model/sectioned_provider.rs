//! Multi-section provider.
//!
//! `SectionedProvider<T>` stores items grouped into sections and reports both
//! section and item changes. It is the natural child of a
//! [`CompositionMode::Multi`](super::CompositionMode::Multi) composite.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use horizon_mosaic_core::logging::targets;
use horizon_mosaic_core::{CompositionError, IndexPath, ProviderId, Result};

use super::batch::MutationOp;
use super::selection::SelectionHandler;
use super::traits::{BatchSink, BatchSinkSlot, Provider};

/// A provider exposing several sections of items.
pub struct SectionedProvider<T> {
    id: ProviderId,
    sections: RwLock<Vec<Vec<T>>>,
    selection_handler: RwLock<Option<Arc<dyn SelectionHandler>>>,
    sink: BatchSinkSlot,
}

impl<T: Send + Sync + 'static> SectionedProvider<T> {
    /// Creates a provider with the given sections.
    pub fn new(sections: Vec<Vec<T>>) -> Self {
        Self {
            id: ProviderId::next(),
            sections: RwLock::new(sections),
            selection_handler: RwLock::new(None),
            sink: BatchSinkSlot::new(),
        }
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

    /// Returns a clone of the item at `index`.
    pub fn item(&self, index: IndexPath) -> Option<T>
    where
        T: Clone,
    {
        self.sections
            .read()
            .get(index.section)
            .and_then(|items| items.get(index.item))
            .cloned()
    }

    /// Returns a read guard over the sections.
    ///
    /// Drop the guard before mutating the provider.
    pub fn sections(&self) -> impl std::ops::Deref<Target = Vec<Vec<T>>> + '_ {
        self.sections.read()
    }

    /// Replaces every section and asks the sink for a full reload.
    pub fn set_sections(&self, sections: Vec<Vec<T>>) -> Result<()> {
        *self.sections.write() = sections;
        tracing::debug!(target: targets::PROVIDER, provider = %self.id, "sections replaced");
        self.sink.reload(self.id)
    }

    /// Applies several edits and reports them as one batch.
    ///
    /// Behaves like [`ListProvider::perform_batch_updates`](super::ListProvider::perform_batch_updates).
    pub fn perform_batch_updates<F, R>(&self, edit: F) -> Result<R>
    where
        F: FnOnce(&mut SectionEditor<'_, T>) -> Result<R>,
    {
        let (result, ops) = {
            let mut sections = self.sections.write();
            let mut editor = SectionEditor {
                sections: &mut *sections,
                ops: Vec::new(),
            };
            let result = edit(&mut editor);
            (result, editor.ops)
        };

        tracing::trace!(target: targets::PROVIDER, provider = %self.id, op_count = ops.len(), "section batch");
        let sent = self.sink.send(self.id, ops);
        let value = result?;
        sent?;
        Ok(value)
    }
}

impl<T: Send + Sync + 'static> Provider for SectionedProvider<T> {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn section_count(&self) -> usize {
        self.sections.read().len()
    }

    fn item_count(&self, section: usize) -> Result<usize> {
        let sections = self.sections.read();
        sections
            .get(section)
            .map(Vec::len)
            .ok_or_else(|| CompositionError::section_out_of_range(section, sections.len()))
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

impl<T> std::fmt::Debug for SectionedProvider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionedProvider")
            .field("id", &self.id)
            .field("sections", &self.sections.read().len())
            .field("sink", &self.sink)
            .finish()
    }
}

/// Edits a [`SectionedProvider`]'s sections and records the matching ops.
pub struct SectionEditor<'a, T> {
    sections: &'a mut Vec<Vec<T>>,
    ops: Vec<MutationOp>,
}

impl<T> SectionEditor<'_, T> {
    /// Returns the current number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Returns the items of `section`.
    pub fn section(&self, section: usize) -> Option<&[T]> {
        self.sections.get(section).map(Vec::as_slice)
    }

    /// Returns the ops recorded so far.
    pub fn ops(&self) -> &[MutationOp] {
        &self.ops
    }

    /// Inserts a section at `index`.
    pub fn insert_section(&mut self, index: usize, items: Vec<T>) -> Result<()> {
        if index > self.sections.len() {
            return Err(CompositionError::section_out_of_range(index, self.sections.len()));
        }
        self.sections.insert(index, items);
        self.ops.push(MutationOp::InsertSections(vec![index]));
        Ok(())
    }

    /// Deletes the section at `index`, returning its items.
    pub fn delete_section(&mut self, index: usize) -> Result<Vec<T>> {
        self.check_section(index)?;
        let items = self.sections.remove(index);
        self.ops.push(MutationOp::DeleteSections(vec![index]));
        Ok(items)
    }

    /// Marks the section at `index` for reload.
    pub fn reload_section(&mut self, index: usize) -> Result<()> {
        self.check_section(index)?;
        self.ops.push(MutationOp::ReloadSections(vec![index]));
        Ok(())
    }

    /// Moves the section at `from` so that it ends up at `to`.
    pub fn move_section(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_section(from)?;
        self.check_section(to)?;
        let items = self.sections.remove(from);
        self.sections.insert(to, items);
        self.ops.push(MutationOp::MoveSection { from, to });
        Ok(())
    }

    /// Inserts an item at `index`.
    pub fn insert_item(&mut self, index: IndexPath, item: T) -> Result<()> {
        let items = self.section_mut(index.section)?;
        if index.item > items.len() {
            return Err(CompositionError::item_out_of_range(index.item, items.len()));
        }
        items.insert(index.item, item);
        self.ops.push(MutationOp::InsertItems(vec![index]));
        Ok(())
    }

    /// Removes and returns the item at `index`.
    pub fn remove_item(&mut self, index: IndexPath) -> Result<T> {
        self.check_item(index)?;
        let item = self.sections[index.section].remove(index.item);
        self.ops.push(MutationOp::DeleteItems(vec![index]));
        Ok(item)
    }

    /// Replaces the item at `index`, returning the old one.
    pub fn replace_item(&mut self, index: IndexPath, item: T) -> Result<T> {
        self.check_item(index)?;
        let old = std::mem::replace(&mut self.sections[index.section][index.item], item);
        self.ops.push(MutationOp::ReloadItems(vec![index]));
        Ok(old)
    }

    /// Marks the item at `index` for reload.
    pub fn reload_item(&mut self, index: IndexPath) -> Result<()> {
        self.check_item(index)?;
        self.ops.push(MutationOp::ReloadItems(vec![index]));
        Ok(())
    }

    /// Moves an item, possibly into another section.
    ///
    /// `to` addresses the item's position after it has been taken out of
    /// `from`.
    pub fn move_item(&mut self, from: IndexPath, to: IndexPath) -> Result<()> {
        self.check_item(from)?;
        self.check_section(to.section)?;
        let item = self.sections[from.section].remove(from.item);

        let target = &mut self.sections[to.section];
        if to.item > target.len() {
            // Put it back so a failed move leaves the data untouched.
            let len = target.len();
            self.sections[from.section].insert(from.item, item);
            return Err(CompositionError::item_out_of_range(to.item, len));
        }
        target.insert(to.item, item);
        self.ops.push(MutationOp::MoveItem { from, to });
        Ok(())
    }

    fn section_mut(&mut self, section: usize) -> Result<&mut Vec<T>> {
        let len = self.sections.len();
        self.sections
            .get_mut(section)
            .ok_or_else(|| CompositionError::section_out_of_range(section, len))
    }

    fn check_section(&self, section: usize) -> Result<()> {
        if section >= self.sections.len() {
            return Err(CompositionError::section_out_of_range(section, self.sections.len()));
        }
        Ok(())
    }

    fn check_item(&self, index: IndexPath) -> Result<()> {
        self.check_section(index.section)?;
        let len = self.sections[index.section].len();
        if index.item >= len {
            return Err(CompositionError::item_out_of_range(index.item, len));
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(SectionedProvider<String>: Send, Sync);
