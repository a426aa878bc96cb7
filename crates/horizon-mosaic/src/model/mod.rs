//! Composition model for Horizon Mosaic.
//!
//! This module composes independently written content providers into one
//! logical collection. A rendering surface sees a single provider with a
//! single flattened coordinate space; each child keeps its own private
//! coordinates and never learns about its siblings.
//!
//! # Core Types
//!
//! - `Provider`: The capability every content provider exposes
//! - `CompositeCollection`: An ordered list of providers presented as one
//! - `IndexTranslator`: Maps global indices to (child, local) pairs and back
//! - `MutationOp` / `BatchTranslator`: Structural change batches and their
//!   translation into global space
//! - `SelectionHandler` / `SelectionRouter`: Highlight and selection hooks
//!   routed to the owning child
//! - `BatchSink`: Where providers report their batches
//!
//! # Provider Implementations
//!
//! - `ListProvider`: A single-section list with a batch editor
//! - `SectionedProvider`: Several sections with section and item edits
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  counts, lookups  ┌─────────────────────┐
//! │   Surface   │──────────────────>│ CompositeCollection │
//! │ (BatchSink) │<──────────────────│  (IndexTranslator)  │
//! └─────────────┘   global batches  └─────────────────────┘
//!                                       │            ^
//!                        local indices  │            │ local batches
//!                                       v            │
//!                                   ┌─────────────────────┐
//!                                   │  Provider children  │
//!                                   └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_mosaic::model::{CompositeCollection, CompositionMode, ListProvider, Provider};
//! use horizon_mosaic::IndexPath;
//!
//! let news = Arc::new(ListProvider::new(vec!["a"; 50]));
//! let ads = Arc::new(ListProvider::new(vec!["b"; 200]));
//!
//! let feed = CompositeCollection::new(CompositionMode::Single);
//! feed.add(news.clone()).unwrap();
//! feed.add(ads.clone()).unwrap();
//!
//! assert_eq!(feed.item_count(0).unwrap(), 250);
//!
//! let (owner, local) = feed.provider_and_local(IndexPath::item(150)).unwrap();
//! assert_eq!(owner.id(), ads.id());
//! assert_eq!(local, IndexPath::item(100));
//! ```

mod batch;
mod composite;
mod config;
mod list_provider;
mod sectioned_provider;
pub mod selection;
mod traits;
mod translator;
mod tree_debug;

pub use batch::{BatchTranslator, MutationOp, application_order};
pub use composite::{CollectionSignals, CompositeCollection};
pub use config::{CompositeBuilder, CompositeConfig, CompositionMode};
pub use list_provider::{ListEditor, ListProvider};
pub use sectioned_provider::{SectionEditor, SectionedProvider};
pub use selection::{SelectionHandler, SelectionPolicy, SelectionRouter};
pub use traits::{BatchSink, BatchSinkSlot, Provider, ProviderHandle};
pub use translator::IndexTranslator;
pub use tree_debug::{CompositionTreeDebug, TreeFormatOptions, TreeStyle};
