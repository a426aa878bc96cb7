//! Index paths and provider identity.
//!
//! An [`IndexPath`] is the `(section, item)` pair used to address a single
//! item in a sectioned collection. The same type is used for both coordinate
//! spaces a composite deals with:
//!
//! - [`GlobalIndex`]: the flattened space seen by the rendering surface
//! - [`LocalIndex`]: a child provider's own space, unaware of its siblings
//!
//! The aliases exist to document which space a value lives in at API
//! boundaries; they are deliberately interchangeable.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A global counter for generating unique provider identifiers.
static PROVIDER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies an item by section and item position.
///
/// Ordering is lexicographic: section first, then item.
///
/// # Example
///
/// ```
/// use horizon_mosaic_core::IndexPath;
///
/// let first = IndexPath::new(0, 0);
/// let later = IndexPath::new(0, 7);
/// assert!(first < later);
/// assert_eq!(later.with_item(3), IndexPath::new(0, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    /// The section containing the item.
    pub section: usize,
    /// The position of the item within its section.
    pub item: usize,
}

/// An index path expressed in a composite's flattened coordinate space.
pub type GlobalIndex = IndexPath;

/// An index path expressed in a child provider's own coordinate space.
pub type LocalIndex = IndexPath;

impl IndexPath {
    /// Creates an index path for `item` in `section`.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Index path of `item` in section 0.
    ///
    /// Convenience for single-section providers.
    #[inline]
    pub const fn item(item: usize) -> Self {
        Self { section: 0, item }
    }

    /// Returns a copy with the section replaced.
    #[inline]
    pub const fn with_section(self, section: usize) -> Self {
        Self { section, ..self }
    }

    /// Returns a copy with the item replaced.
    #[inline]
    pub const fn with_item(self, item: usize) -> Self {
        Self { item, ..self }
    }

    /// Returns a copy with the section shifted forward by `offset`.
    #[inline]
    pub const fn offset_section(self, offset: usize) -> Self {
        Self {
            section: self.section + offset,
            item: self.item,
        }
    }

    /// Returns a copy with the item shifted forward by `offset`.
    #[inline]
    pub const fn offset_item(self, offset: usize) -> Self {
        Self {
            section: self.section,
            item: self.item + offset,
        }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}

/// Opaque identity of a provider attached to a composite.
///
/// Every provider allocates one at construction with [`ProviderId::next`] and
/// reports it from `Provider::id` for its whole lifetime. Composites use it to
/// find a child's position, to reject duplicates, and to walk ancestry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(u64);

impl ProviderId {
    /// Allocates a fresh, process-unique identifier.
    pub fn next() -> Self {
        Self(PROVIDER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProviderId({})", self.0)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
