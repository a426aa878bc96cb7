//! Index translation between a composite and its children.
//!
//! `IndexTranslator` maps between the flattened coordinate space a composite
//! exposes (global) and the private coordinate space of each child (local).
//! It is a borrowed view over a child list; a new one is built for every
//! query so offsets always reflect the current children.
//!
//! In [`CompositionMode::Multi`] every child owns a contiguous run of global
//! sections and item indices pass through unchanged. In
//! [`CompositionMode::Single`] every child lives in global section 0 and its
//! items are shifted by the number of items in the children before it.

use horizon_mosaic_core::logging::targets;
use horizon_mosaic_core::{CompositionError, GlobalIndex, LocalIndex, ProviderId, Result};

use super::config::CompositionMode;
use super::traits::{Provider, ProviderHandle};

/// Maps indices between a composite's global space and its children.
#[derive(Clone, Copy)]
pub struct IndexTranslator<'a> {
    mode: CompositionMode,
    children: &'a [ProviderHandle],
}

impl<'a> IndexTranslator<'a> {
    /// Create a translator over the given children.
    pub fn new(mode: CompositionMode, children: &'a [ProviderHandle]) -> Self {
        Self { mode, children }
    }

    /// Returns the composition mode.
    pub fn mode(&self) -> CompositionMode {
        self.mode
    }

    /// Returns the children this translator walks.
    pub fn children(&self) -> &'a [ProviderHandle] {
        self.children
    }

    /// Returns the number of global sections.
    pub fn section_count(&self) -> usize {
        match self.mode {
            CompositionMode::Multi => self.children.iter().map(|c| c.section_count()).sum(),
            CompositionMode::Single => usize::from(!self.children.is_empty()),
        }
    }

    /// Returns the number of items in a global section.
    pub fn item_count(&self, section: usize) -> Result<usize> {
        match self.mode {
            CompositionMode::Multi => {
                let (child, local_section) = self.owner_of_section(section)?;
                child.item_count(local_section)
            }
            CompositionMode::Single => {
                if section != 0 || self.children.is_empty() {
                    return Err(CompositionError::section_out_of_range(
                        section,
                        self.section_count(),
                    ));
                }
                self.children.iter().try_fold(0, |total, child| {
                    Ok(total + self.span_of(child.as_ref())?)
                })
            }
        }
    }

    /// Returns how much of the global space `child` occupies: sections in
    /// Multi mode, items of section 0 in Single mode.
    pub fn span_of(&self, child: &dyn Provider) -> Result<usize> {
        match self.mode {
            CompositionMode::Multi => Ok(child.section_count()),
            CompositionMode::Single => single_section_items(child),
        }
    }

    /// Returns the cumulative offset of `child`: the total span of every
    /// child strictly before it.
    pub fn offset_of(&self, child: ProviderId) -> Result<usize> {
        self.locate(child).map(|(_, offset)| offset)
    }

    /// Finds `child` and its cumulative offset.
    pub(crate) fn locate(&self, child: ProviderId) -> Result<(&'a ProviderHandle, usize)> {
        let mut offset = 0;
        for candidate in self.children {
            if candidate.id() == child {
                return Ok((candidate, offset));
            }
            offset += self.span_of(candidate.as_ref())?;
        }
        Err(CompositionError::UnknownProvider { provider: child })
    }

    /// Maps a child's local index to the composite's global space.
    ///
    /// Fails with `UnknownProvider` if `child` is not one of the children and
    /// with `OutOfRange` if `local` is not a valid index of `child`.
    pub fn local_to_global(&self, child: ProviderId, local: LocalIndex) -> Result<GlobalIndex> {
        let (handle, offset) = self.locate(child)?;
        handle.validate_index(&local)?;

        let global = match self.mode {
            CompositionMode::Multi => local.offset_section(offset),
            CompositionMode::Single => {
                if local.section != 0 {
                    return Err(CompositionError::section_out_of_range(local.section, 1));
                }
                local.offset_item(offset)
            }
        };

        tracing::trace!(target: targets::COMPOSITE, %child, %local, %global, "local_to_global");
        Ok(global)
    }

    /// Maps a global index to the child owning it and the child-local index.
    ///
    /// Fails with `OutOfRange` if no child covers the index, including an
    /// item past the owning child's item count.
    pub fn global_to_local(&self, global: GlobalIndex) -> Result<(ProviderHandle, LocalIndex)> {
        let (child, local) = match self.mode {
            CompositionMode::Multi => {
                let (child, local_section) = self.owner_of_section(global.section)?;
                let items = child.item_count(local_section)?;
                if global.item >= items {
                    return Err(CompositionError::item_out_of_range(global.item, items));
                }
                (child, global.with_section(local_section))
            }
            CompositionMode::Single => {
                if global.section != 0 {
                    return Err(CompositionError::section_out_of_range(
                        global.section,
                        self.section_count(),
                    ));
                }
                self.owner_of_item(global.item)?
            }
        };

        tracing::trace!(target: targets::COMPOSITE, %global, child = %child.id(), %local, "global_to_local");
        Ok((child.clone(), local))
    }

    fn owner_of_section(&self, section: usize) -> Result<(&'a ProviderHandle, usize)> {
        let mut before = 0;
        for child in self.children {
            let sections = child.section_count();
            if section < before + sections {
                return Ok((child, section - before));
            }
            before += sections;
        }
        Err(CompositionError::section_out_of_range(section, before))
    }

    fn owner_of_item(&self, item: usize) -> Result<(&'a ProviderHandle, LocalIndex)> {
        let mut before = 0;
        for child in self.children {
            let items = single_section_items(child.as_ref())?;
            if item < before + items {
                return Ok((child, LocalIndex::item(item - before)));
            }
            before += items;
        }
        Err(CompositionError::item_out_of_range(item, before))
    }
}

impl std::fmt::Debug for IndexTranslator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexTranslator")
            .field("mode", &self.mode)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Item count of a child inside a single-section composite.
///
/// A child without sections contributes nothing; one with several sections
/// cannot be flattened.
fn single_section_items(child: &dyn Provider) -> Result<usize> {
    match child.section_count() {
        0 => Ok(0),
        1 => child.item_count(0),
        sections => Err(CompositionError::InconsistentSectionCount {
            provider: child.id(),
            sections,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_mosaic_core::IndexPath;
    use std::sync::Arc;

    struct Fixed {
        id: ProviderId,
        sections: Vec<usize>,
    }

    impl Fixed {
        fn handle(sections: &[usize]) -> ProviderHandle {
            Arc::new(Self {
                id: ProviderId::next(),
                sections: sections.to_vec(),
            })
        }
    }

    impl Provider for Fixed {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn section_count(&self) -> usize {
            self.sections.len()
        }

        fn item_count(&self, section: usize) -> Result<usize> {
            self.sections
                .get(section)
                .copied()
                .ok_or_else(|| CompositionError::section_out_of_range(section, self.sections.len()))
        }
    }

    #[test]
    fn test_multi_counts() {
        let children = vec![Fixed::handle(&[3, 4]), Fixed::handle(&[]), Fixed::handle(&[5])];
        let translator = IndexTranslator::new(CompositionMode::Multi, &children);

        assert_eq!(translator.section_count(), 3);
        assert_eq!(translator.item_count(0).unwrap(), 3);
        assert_eq!(translator.item_count(1).unwrap(), 4);
        assert_eq!(translator.item_count(2).unwrap(), 5);
        assert!(translator.item_count(3).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_multi_mapping() {
        let children = vec![Fixed::handle(&[3, 4]), Fixed::handle(&[5])];
        let translator = IndexTranslator::new(CompositionMode::Multi, &children);
        let second = children[1].id();

        assert_eq!(translator.offset_of(second).unwrap(), 2);
        assert_eq!(
            translator.local_to_global(second, IndexPath::new(0, 4)).unwrap(),
            IndexPath::new(2, 4)
        );

        let (owner, local) = translator.global_to_local(IndexPath::new(1, 3)).unwrap();
        assert_eq!(owner.id(), children[0].id());
        assert_eq!(local, IndexPath::new(1, 3));

        // Item past the owner's count in an existing section
        assert!(translator
            .global_to_local(IndexPath::new(1, 4))
            .unwrap_err()
            .is_out_of_range());
    }

    #[test]
    fn test_single_mapping() {
        let children = vec![Fixed::handle(&[2]), Fixed::handle(&[]), Fixed::handle(&[3])];
        let translator = IndexTranslator::new(CompositionMode::Single, &children);
        let last = children[2].id();

        assert_eq!(translator.section_count(), 1);
        assert_eq!(translator.item_count(0).unwrap(), 5);
        assert_eq!(translator.offset_of(last).unwrap(), 2);

        let (owner, local) = translator.global_to_local(IndexPath::item(2)).unwrap();
        assert_eq!(owner.id(), last);
        assert_eq!(local, IndexPath::item(0));

        assert!(translator.global_to_local(IndexPath::item(5)).unwrap_err().is_out_of_range());
        assert!(translator.global_to_local(IndexPath::new(1, 0)).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_single_rejects_multi_section_child() {
        let bad = Fixed::handle(&[1, 1]);
        let children = vec![Fixed::handle(&[2]), bad.clone()];
        let translator = IndexTranslator::new(CompositionMode::Single, &children);

        assert_eq!(
            translator.item_count(0),
            Err(CompositionError::InconsistentSectionCount {
                provider: bad.id(),
                sections: 2,
            })
        );

        // Items owned by the first child are still reachable
        assert!(translator.global_to_local(IndexPath::item(1)).is_ok());
        assert!(matches!(
            translator.global_to_local(IndexPath::item(2)),
            Err(CompositionError::InconsistentSectionCount { .. })
        ));
    }

    #[test]
    fn test_unknown_child() {
        let children = vec![Fixed::handle(&[1])];
        let translator = IndexTranslator::new(CompositionMode::Multi, &children);
        let stranger = ProviderId::next();

        assert_eq!(
            translator.offset_of(stranger),
            Err(CompositionError::UnknownProvider { provider: stranger })
        );
    }

    #[test]
    fn test_empty_children() {
        let children: Vec<ProviderHandle> = Vec::new();
        for mode in [CompositionMode::Single, CompositionMode::Multi] {
            let translator = IndexTranslator::new(mode, &children);
            assert_eq!(translator.section_count(), 0);
            assert!(translator.item_count(0).unwrap_err().is_out_of_range());
            assert!(translator.global_to_local(IndexPath::item(0)).is_err());
        }
    }
}
