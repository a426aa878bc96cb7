//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use horizon_mosaic::model::{
    BatchSink, BatchSinkSlot, MutationOp, Provider, SelectionHandler,
};
use horizon_mosaic::{CompositionError, LocalIndex, ProviderId, Result};

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A provider with fixed per-section item counts that can emit arbitrary
/// batches.
pub struct FixedProvider {
    id: ProviderId,
    sections: RwLock<Vec<usize>>,
    handler: Option<Arc<dyn SelectionHandler>>,
    sink: BatchSinkSlot,
}

impl FixedProvider {
    pub fn new(sections: &[usize]) -> Arc<Self> {
        Self::build(sections, None)
    }

    /// One section holding `items` items.
    pub fn single(items: usize) -> Arc<Self> {
        Self::new(&[items])
    }

    pub fn with_handler(sections: &[usize], handler: Arc<dyn SelectionHandler>) -> Arc<Self> {
        Self::build(sections, Some(handler))
    }

    fn build(sections: &[usize], handler: Option<Arc<dyn SelectionHandler>>) -> Arc<Self> {
        Arc::new(Self {
            id: ProviderId::next(),
            sections: RwLock::new(sections.to_vec()),
            handler,
            sink: BatchSinkSlot::new(),
        })
    }

    pub fn set_sections(&self, sections: &[usize]) {
        *self.sections.write() = sections.to_vec();
    }

    /// Report a batch to whatever sink is attached.
    pub fn emit(&self, ops: Vec<MutationOp>) -> Result<()> {
        self.sink.send(self.id, ops)
    }

    pub fn is_attached(&self) -> bool {
        self.sink.is_attached()
    }
}

impl Provider for FixedProvider {
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
            .copied()
            .ok_or_else(|| CompositionError::section_out_of_range(section, sections.len()))
    }

    fn selection_handler(&self) -> Option<Arc<dyn SelectionHandler>> {
        self.handler.clone()
    }

    fn set_batch_sink(&self, sink: Option<Weak<dyn BatchSink>>) {
        self.sink.set(sink);
    }

    fn detach_batch_sink(&self, sink: &Weak<dyn BatchSink>) {
        self.sink.clear_if(sink);
    }
}

/// A rendering surface stand-in that records everything it receives.
#[derive(Default)]
pub struct RecordingSurface {
    batches: Mutex<Vec<(ProviderId, Vec<MutationOp>)>>,
    reloads: Mutex<Vec<ProviderId>>,
}

impl RecordingSurface {
    /// Create a surface and make it the sink of `root`.
    pub fn attach(root: &dyn Provider) -> Arc<Self> {
        let surface = Arc::new(Self::default());
        root.set_batch_sink(Some(Arc::downgrade(&surface) as Weak<dyn BatchSink>));
        surface
    }

    pub fn batches(&self) -> Vec<(ProviderId, Vec<MutationOp>)> {
        self.batches.lock().clone()
    }

    /// Ops of every batch, ignoring the source.
    pub fn ops(&self) -> Vec<Vec<MutationOp>> {
        self.batches.lock().iter().map(|(_, ops)| ops.clone()).collect()
    }

    pub fn reloads(&self) -> Vec<ProviderId> {
        self.reloads.lock().clone()
    }
}

impl BatchSink for RecordingSurface {
    fn perform_batch_updates(&self, source: ProviderId, ops: Vec<MutationOp>) -> Result<()> {
        self.batches.lock().push((source, ops));
        Ok(())
    }

    fn reload_data(&self, source: ProviderId) -> Result<()> {
        self.reloads.lock().push(source);
        Ok(())
    }
}

/// A selection handler that records every hook and answers "should" hooks
/// with a fixed value.
pub struct RecordingHandler {
    answer: bool,
    calls: Mutex<Vec<(&'static str, LocalIndex)>>,
}

impl RecordingHandler {
    pub fn allowing() -> Arc<Self> {
        Self::answering(true)
    }

    pub fn refusing() -> Arc<Self> {
        Self::answering(false)
    }

    fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(&'static str, LocalIndex)> {
        self.calls.lock().clone()
    }

    fn record(&self, hook: &'static str, index: &LocalIndex) {
        self.calls.lock().push((hook, *index));
    }
}

impl SelectionHandler for RecordingHandler {
    fn should_highlight(&self, index: &LocalIndex) -> bool {
        self.record("should_highlight", index);
        self.answer
    }

    fn did_highlight(&self, index: &LocalIndex) {
        self.record("did_highlight", index);
    }

    fn did_unhighlight(&self, index: &LocalIndex) {
        self.record("did_unhighlight", index);
    }

    fn should_select(&self, index: &LocalIndex) -> bool {
        self.record("should_select", index);
        self.answer
    }

    fn did_select(&self, index: &LocalIndex) {
        self.record("did_select", index);
    }

    fn should_deselect(&self, index: &LocalIndex) -> bool {
        self.record("should_deselect", index);
        self.answer
    }

    fn did_deselect(&self, index: &LocalIndex) {
        self.record("did_deselect", index);
    }
}
