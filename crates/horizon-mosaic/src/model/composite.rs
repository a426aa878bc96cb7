//! Composite collections.
//!
//! A [`CompositeCollection`] presents an ordered list of child providers as
//! one collection. It answers count queries and index lookups by walking its
//! children through an [`IndexTranslator`], receives their mutation batches
//! as a [`BatchSink`] and forwards the translated batches to its own sink.
//!
//! Composites are themselves providers, so they nest:
//!
//! ```
//! use std::sync::Arc;
//! use horizon_mosaic::model::{CompositeCollection, CompositionMode, ListProvider, Provider};
//! use horizon_mosaic::IndexPath;
//!
//! let header = Arc::new(ListProvider::new(vec!["title"]));
//! let rows = Arc::new(ListProvider::new(vec![1, 2, 3]));
//!
//! let inner = CompositeCollection::new(CompositionMode::Single);
//! inner.add(rows.clone()).unwrap();
//!
//! let outer = CompositeCollection::new(CompositionMode::Multi);
//! outer.add(header).unwrap();
//! outer.add(inner.clone()).unwrap();
//!
//! assert_eq!(outer.section_count(), 2);
//! assert_eq!(outer.item_count(1).unwrap(), 3);
//!
//! let (owner, local) = outer.provider_and_local(IndexPath::new(1, 2)).unwrap();
//! assert_eq!(owner.id(), inner.id());
//! assert_eq!(local, IndexPath::new(0, 2));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use horizon_mosaic_core::logging::{span_names, targets};
use horizon_mosaic_core::{
    CompositionError, GlobalIndex, LocalIndex, PerfSpan, ProviderId, Result, Signal,
    ThreadAffinity,
};

use super::batch::{BatchTranslator, MutationOp};
use super::config::{CompositeBuilder, CompositeConfig, CompositionMode};
use super::selection::{SelectionHandler, SelectionRouter};
use super::traits::{BatchSink, BatchSinkSlot, Provider, ProviderHandle};
use super::translator::IndexTranslator;

/// Signals emitted by a composite collection.
pub struct CollectionSignals {
    /// A child was attached. Args: (child, position)
    pub child_inserted: Signal<(ProviderId, usize)>,
    /// A child was detached. Args: (child, former position)
    pub child_removed: Signal<(ProviderId, usize)>,
    /// A translated batch is about to be forwarded to the sink.
    pub batch_forwarded: Signal<Vec<MutationOp>>,
    /// A child asked for a full reload. Args: the child
    pub reloaded: Signal<ProviderId>,
}

impl Default for CollectionSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionSignals {
    /// Create a new set of collection signals.
    pub fn new() -> Self {
        Self {
            child_inserted: Signal::new(),
            child_removed: Signal::new(),
            batch_forwarded: Signal::new(),
            reloaded: Signal::new(),
        }
    }
}

/// Marks a batch translation in progress; cleared on drop.
struct BatchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BatchGuard<'a> {
    fn enter(flag: &'a AtomicBool, operation: &'static str) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| CompositionError::reentrant(operation))?;
        Ok(Self { flag })
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// An ordered collection of child providers presented as one provider.
///
/// Offsets are derived from the children's current counts on every query and
/// never cached. While a batch is being translated and forwarded, the child
/// list is frozen: [`add`](Self::add), [`insert`](Self::insert),
/// [`remove`](Self::remove) and further translations fail with
/// [`CompositionError::ReentrantMutation`].
///
/// Composites are always handed out as `Arc`s because attached children keep
/// a weak reference back to them as their batch sink.
pub struct CompositeCollection {
    id: ProviderId,
    this: Weak<CompositeCollection>,
    config: CompositeConfig,
    children: RwLock<Vec<ProviderHandle>>,
    batch_in_progress: AtomicBool,
    sink: BatchSinkSlot,
    affinity: ThreadAffinity,
    signals: CollectionSignals,
}

impl CompositeCollection {
    /// Create an empty composite with the given mode.
    pub fn new(mode: CompositionMode) -> Arc<Self> {
        Self::with_config(CompositeConfig::with_mode(mode))
    }

    /// Create an empty composite with a custom configuration.
    pub fn with_config(config: CompositeConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            id: ProviderId::next(),
            this: this.clone(),
            config,
            children: RwLock::new(Vec::new()),
            batch_in_progress: AtomicBool::new(false),
            sink: BatchSinkSlot::new(),
            affinity: ThreadAffinity::current(),
            signals: CollectionSignals::new(),
        })
    }

    /// Create a builder for configuring a composite.
    pub fn builder() -> CompositeBuilder {
        CompositeBuilder::new()
    }

    /// Returns this composite's identity.
    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    /// Returns the composition mode.
    pub fn mode(&self) -> CompositionMode {
        self.config.mode
    }

    /// Returns the configured name, if any.
    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    /// Returns the signals for this composite.
    pub fn signals(&self) -> &CollectionSignals {
        &self.signals
    }

    /// Returns the number of direct children.
    pub fn len(&self) -> usize {
        self.children.read().len()
    }

    /// Returns `true` if the composite has no children.
    pub fn is_empty(&self) -> bool {
        self.children.read().is_empty()
    }

    /// Returns a snapshot of the children, in order.
    pub fn children(&self) -> Vec<ProviderHandle> {
        self.children.read().clone()
    }

    /// Returns `true` if a child with this id is attached.
    pub fn contains(&self, id: ProviderId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the position of the child with this id.
    pub fn position(&self, id: ProviderId) -> Option<usize> {
        self.children.read().iter().position(|child| child.id() == id)
    }

    /// Returns `true` while a batch is being translated or forwarded.
    pub fn is_translating(&self) -> bool {
        self.batch_in_progress.load(Ordering::Acquire)
    }

    // =========================================================================
    // Child list
    // =========================================================================

    /// Append a child.
    pub fn add(&self, provider: ProviderHandle) -> Result<()> {
        self.attach(provider, None)
    }

    /// Insert a child at position `at`.
    pub fn insert(&self, provider: ProviderHandle, at: usize) -> Result<()> {
        self.attach(provider, Some(at))
    }

    #[tracing::instrument(
        skip(self, provider),
        target = "horizon_mosaic::composite",
        level = "trace",
        fields(composite = %self.id, child = %provider.id())
    )]
    fn attach(&self, provider: ProviderHandle, at: Option<usize>) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        let _span = PerfSpan::new(span_names::MUTATE_CHILDREN);
        self.ensure_idle("insert")?;
        self.check_acyclic(&provider)?;

        let child = provider.id();
        let position = {
            let mut children = self.children.write();
            if children.iter().any(|c| c.id() == child) {
                return Err(CompositionError::DuplicateProvider { provider: child });
            }
            let position = at.unwrap_or(children.len());
            if position > children.len() {
                return Err(CompositionError::OutOfRange {
                    what: "position",
                    index: position,
                    bound: children.len(),
                });
            }
            children.insert(position, provider.clone());
            position
        };

        provider.set_batch_sink(Some(self.as_sink()));
        tracing::debug!(target: targets::COMPOSITE, composite = %self.id, %child, position, "attached child");
        self.signals.child_inserted.emit((child, position));
        Ok(())
    }

    /// Detach the child with this id and return it.
    #[tracing::instrument(skip(self), target = "horizon_mosaic::composite", level = "trace")]
    pub fn remove(&self, id: ProviderId) -> Result<ProviderHandle> {
        self.affinity.debug_assert_same_thread();
        let _span = PerfSpan::new(span_names::MUTATE_CHILDREN);
        self.ensure_idle("remove")?;

        let (provider, position) = {
            let mut children = self.children.write();
            let position = children
                .iter()
                .position(|child| child.id() == id)
                .ok_or(CompositionError::UnknownProvider { provider: id })?;
            (children.remove(position), position)
        };

        provider.detach_batch_sink(&self.as_sink());
        tracing::debug!(target: targets::COMPOSITE, composite = %self.id, child = %id, position, "detached child");
        self.signals.child_removed.emit((id, position));
        Ok(provider)
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<()> {
        if self.is_translating() {
            tracing::debug!(target: targets::COMPOSITE, composite = %self.id, operation, "rejected during batch");
            return Err(CompositionError::reentrant(operation));
        }
        Ok(())
    }

    /// Rejects `provider` if it is this composite or contains it.
    fn check_acyclic(&self, provider: &ProviderHandle) -> Result<()> {
        let mut pending = vec![provider.clone()];
        while let Some(node) = pending.pop() {
            if node.id() == self.id {
                tracing::trace!(
                    target: targets::COMPOSITE,
                    composite = %self.id,
                    child = %provider.id(),
                    "composition cycle detected"
                );
                return Err(CompositionError::CycleDetected {
                    provider: provider.id(),
                });
            }
            pending.extend(node.child_providers());
        }
        Ok(())
    }

    fn as_sink(&self) -> Weak<dyn BatchSink> {
        self.this.clone()
    }

    // =========================================================================
    // Index translation
    // =========================================================================

    /// Runs `f` with a translator over a snapshot of the children.
    ///
    /// The child lock is released before any child is queried.
    fn with_translator<R>(&self, f: impl FnOnce(&IndexTranslator<'_>) -> R) -> R {
        let children = self.children();
        f(&IndexTranslator::new(self.config.mode, &children))
    }

    /// Returns the child owning `global` and the index within that child.
    pub fn provider_and_local(&self, global: GlobalIndex) -> Result<(ProviderHandle, LocalIndex)> {
        self.with_translator(|translator| translator.global_to_local(global))
    }

    /// Maps an index of the child `child` to this composite's space.
    pub fn global_index(&self, child: ProviderId, local: LocalIndex) -> Result<GlobalIndex> {
        self.with_translator(|translator| translator.local_to_global(child, local))
    }

    /// Returns the cumulative offset of `child`: sections before it in Multi
    /// mode, items before it in Single mode.
    pub fn offset_of(&self, child: ProviderId) -> Result<usize> {
        self.with_translator(|translator| translator.offset_of(child))
    }

    /// Translates a batch emitted by `from` into this composite's space.
    ///
    /// The offset of `from` is computed once, before any op is read, and the
    /// ops keep their kind and order. Fails with `ReentrantMutation` if a
    /// batch is already being translated by this composite.
    #[tracing::instrument(
        skip(self, ops),
        target = "horizon_mosaic::batch",
        level = "trace",
        fields(composite = %self.id, op_count = ops.len())
    )]
    pub fn translate_batch(&self, from: ProviderId, ops: &[MutationOp]) -> Result<Vec<MutationOp>> {
        self.affinity.debug_assert_same_thread();
        let _guard = BatchGuard::enter(&self.batch_in_progress, "translate_batch")?;
        self.translate_snapshot(from, ops)
    }

    fn translate_snapshot(&self, from: ProviderId, ops: &[MutationOp]) -> Result<Vec<MutationOp>> {
        self.with_translator(|translator| BatchTranslator::new(translator, from)?.translate(ops))
    }

    /// Returns the selection router for this composite.
    pub fn selection(&self) -> SelectionRouter<'_> {
        SelectionRouter::new(self)
    }

    fn log_selection_failure(&self, hook: &'static str, index: &LocalIndex, err: &CompositionError) {
        tracing::warn!(
            target: targets::SELECTION,
            composite = %self.id,
            hook,
            %index,
            error = %err,
            "nested selection routing failed"
        );
    }
}

impl Provider for CompositeCollection {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn section_count(&self) -> usize {
        self.with_translator(|translator| translator.section_count())
    }

    fn item_count(&self, section: usize) -> Result<usize> {
        self.with_translator(|translator| translator.item_count(section))
    }

    fn selection_handler(&self) -> Option<Arc<dyn SelectionHandler>> {
        self.this
            .upgrade()
            .map(|this| this as Arc<dyn SelectionHandler>)
    }

    fn set_batch_sink(&self, sink: Option<Weak<dyn BatchSink>>) {
        self.sink.set(sink);
    }

    fn detach_batch_sink(&self, sink: &Weak<dyn BatchSink>) {
        self.sink.clear_if(sink);
    }

    fn child_providers(&self) -> Vec<ProviderHandle> {
        self.children()
    }

    fn debug_label(&self) -> String {
        match self.name() {
            Some(name) => format!("CompositeCollection \"{name}\" ({})", self.config.mode),
            None => format!("CompositeCollection ({})", self.config.mode),
        }
    }
}

impl BatchSink for CompositeCollection {
    fn perform_batch_updates(&self, source: ProviderId, ops: Vec<MutationOp>) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        let _span = PerfSpan::new(span_names::TRANSLATE_BATCH);
        // Held until the forward below returns.
        let _guard = BatchGuard::enter(&self.batch_in_progress, "perform_batch_updates")?;

        let translated = self.translate_snapshot(source, &ops)?;
        if translated.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            target: targets::BATCH,
            composite = %self.id,
            %source,
            op_count = translated.len(),
            "forwarding batch"
        );
        self.signals.batch_forwarded.emit(translated.clone());
        self.sink.send(self.id, translated)
    }

    fn reload_data(&self, source: ProviderId) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        if !self.contains(source) {
            return Err(CompositionError::UnknownProvider { provider: source });
        }

        tracing::debug!(target: targets::BATCH, composite = %self.id, %source, "forwarding reload");
        self.signals.reloaded.emit(source);
        self.sink.reload(self.id)
    }
}

impl SelectionHandler for CompositeCollection {
    fn should_highlight(&self, index: &LocalIndex) -> bool {
        self.selection().should_highlight(*index).unwrap_or_else(|err| {
            self.log_selection_failure("should_highlight", index, &err);
            self.config.selection_policy.allow_highlight
        })
    }

    fn did_highlight(&self, index: &LocalIndex) {
        if let Err(err) = self.selection().did_highlight(*index) {
            self.log_selection_failure("did_highlight", index, &err);
        }
    }

    fn did_unhighlight(&self, index: &LocalIndex) {
        if let Err(err) = self.selection().did_unhighlight(*index) {
            self.log_selection_failure("did_unhighlight", index, &err);
        }
    }

    fn should_select(&self, index: &LocalIndex) -> bool {
        self.selection().should_select(*index).unwrap_or_else(|err| {
            self.log_selection_failure("should_select", index, &err);
            self.config.selection_policy.allow_select
        })
    }

    fn did_select(&self, index: &LocalIndex) {
        if let Err(err) = self.selection().did_select(*index) {
            self.log_selection_failure("did_select", index, &err);
        }
    }

    fn should_deselect(&self, index: &LocalIndex) -> bool {
        self.selection().should_deselect(*index).unwrap_or_else(|err| {
            self.log_selection_failure("should_deselect", index, &err);
            self.config.selection_policy.allow_deselect
        })
    }

    fn did_deselect(&self, index: &LocalIndex) {
        if let Err(err) = self.selection().did_deselect(*index) {
            self.log_selection_failure("did_deselect", index, &err);
        }
    }
}

impl std::fmt::Debug for CompositeCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeCollection")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("mode", &self.config.mode)
            .field("children", &self.len())
            .field("translating", &self.is_translating())
            .finish()
    }
}

static_assertions::assert_impl_all!(CompositeCollection: Send, Sync);
static_assertions::assert_impl_all!(CollectionSignals: Send, Sync);
