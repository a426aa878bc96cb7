//! Logging facilities for Horizon Mosaic.
//!
//! Horizon Mosaic uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; applications choose one:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_mosaic::batch=trace")
//!         .init();
//!
//!     // Build composites...
//! }
//! ```
//!
//! Every event carries one of the [`targets`] so that subsystems can be
//! filtered independently.

/// Span names used throughout Horizon Mosaic for tracing.
pub mod span_names {
    /// Batch translation span.
    pub const TRANSLATE_BATCH: &str = "horizon_mosaic::translate_batch";
    /// Child list mutation span.
    pub const MUTATE_CHILDREN: &str = "horizon_mosaic::mutate_children";
    /// Selection dispatch span.
    pub const SELECTION: &str = "horizon_mosaic::selection";
}

/// Target names for log filtering.
pub mod targets {
    /// Signal dispatch target.
    pub const SIGNAL: &str = "horizon_mosaic_core::signal";
    /// Composite collection target (attach, detach, queries).
    pub const COMPOSITE: &str = "horizon_mosaic::composite";
    /// Batch translation and forwarding target.
    pub const BATCH: &str = "horizon_mosaic::batch";
    /// Selection routing target.
    pub const SELECTION: &str = "horizon_mosaic::selection";
    /// Leaf provider target.
    pub const PROVIDER: &str = "horizon_mosaic::provider";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for measuring how long a translation or dispatch takes.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_mosaic::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // Just ensure it doesn't panic without a subscriber
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [targets::COMPOSITE, targets::BATCH, targets::SELECTION, targets::PROVIDER] {
            assert!(target.starts_with("horizon_mosaic::"));
        }
        assert!(span_names::TRANSLATE_BATCH.starts_with("horizon_mosaic::"));
    }
}
