//! Configuration for composite collections.

use std::sync::Arc;

use super::composite::CompositeCollection;
use super::selection::SelectionPolicy;

/// How a composite lays its children out in the global coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositionMode {
    /// All children share global section 0; their items are concatenated.
    Single,
    /// Each child owns a contiguous run of whole global sections.
    #[default]
    Multi,
}

impl CompositionMode {
    /// Returns `true` for [`CompositionMode::Single`].
    pub fn is_single(self) -> bool {
        self == Self::Single
    }
}

impl std::fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Multi => f.write_str("multi"),
        }
    }
}

/// Configuration for a [`CompositeCollection`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositeConfig {
    /// The composition mode.
    pub mode: CompositionMode,
    /// Optional name, shown in logs and debug trees.
    pub name: Option<String>,
    /// Answers given to "should" queries for children without a handler.
    pub selection_policy: SelectionPolicy,
}

impl CompositeConfig {
    /// Create a configuration with the given mode.
    pub fn with_mode(mode: CompositionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}

/// Builder for creating composites with custom configuration.
///
/// # Example
///
/// ```
/// use horizon_mosaic::model::{CompositeBuilder, CompositionMode, Provider, SelectionPolicy};
///
/// let feed = CompositeBuilder::new()
///     .mode(CompositionMode::Single)
///     .name("feed")
///     .selection_policy(SelectionPolicy::read_only())
///     .build();
///
/// assert_eq!(feed.name(), Some("feed"));
/// assert_eq!(feed.section_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct CompositeBuilder {
    config: CompositeConfig,
}

impl CompositeBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the composition mode.
    pub fn mode(mut self, mode: CompositionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Set the default selection policy.
    pub fn selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.config.selection_policy = policy;
        self
    }

    /// Returns the configuration built so far.
    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    /// Build the composite.
    pub fn build(self) -> Arc<CompositeCollection> {
        CompositeCollection::with_config(self.config)
    }
}
