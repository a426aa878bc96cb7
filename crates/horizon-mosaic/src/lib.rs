//! Horizon Mosaic - composite collection providers for list and grid views.
//!
//! Independently written content providers are composed into one logical,
//! scrollable collection. The crate maps indices between the flattened space
//! a rendering surface sees and each provider's private space, translates
//! structural mutation batches from any nested provider into that flattened
//! space, and routes highlight and selection hooks to the provider that owns
//! the item.
//!
//! This is the main crate; it re-exports everything from
//! `horizon-mosaic-core`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_mosaic::prelude::*;
//!
//! let headlines = Arc::new(ListProvider::new(vec!["one", "two"]));
//! let photos = Arc::new(SectionedProvider::new(vec![vec![1, 2, 3], vec![4]]));
//!
//! let page = CompositeCollection::new(CompositionMode::Multi);
//! page.add(headlines.clone()).unwrap();
//! page.add(photos.clone()).unwrap();
//!
//! assert_eq!(page.section_count(), 3);
//! assert_eq!(
//!     page.global_index(photos.id(), IndexPath::new(1, 0)).unwrap(),
//!     IndexPath::new(2, 0)
//! );
//! ```

pub use horizon_mosaic_core::*;

pub mod model;
pub mod prelude;
