//! Structural mutation batches and their translation.
//!
//! A provider reports structural changes as a batch of [`MutationOp`]s in its
//! own coordinate space. A composite translates the batch into its global
//! space with a [`BatchTranslator`], which fixes the emitting child's offset
//! once for the whole batch.
//!
//! The translator preserves the kind and order of every op; it never merges,
//! drops or reorders them. Surfaces that apply ops one at a time can use
//! [`application_order`] to get a safe sequence.

use std::cmp::Reverse;

use horizon_mosaic_core::logging::targets;
use horizon_mosaic_core::{CompositionError, IndexPath, ProviderId, Result};

use super::config::CompositionMode;
use super::traits::ProviderHandle;
use super::translator::IndexTranslator;

/// A single structural change, expressed in some provider's coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MutationOp {
    /// Sections inserted at these indices.
    InsertSections(Vec<usize>),
    /// Sections deleted at these indices.
    DeleteSections(Vec<usize>),
    /// Sections whose contents should be reloaded.
    ReloadSections(Vec<usize>),
    /// A section moved.
    MoveSection { from: usize, to: usize },
    /// Items inserted at these index paths.
    InsertItems(Vec<IndexPath>),
    /// Items deleted at these index paths.
    DeleteItems(Vec<IndexPath>),
    /// Items that should be reloaded.
    ReloadItems(Vec<IndexPath>),
    /// An item moved.
    MoveItem { from: IndexPath, to: IndexPath },
}

impl MutationOp {
    /// Returns `true` if the op changes sections rather than items.
    pub fn is_section_op(&self) -> bool {
        matches!(
            self,
            Self::InsertSections(_)
                | Self::DeleteSections(_)
                | Self::ReloadSections(_)
                | Self::MoveSection { .. }
        )
    }

    /// Returns the op's name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertSections(_) => "insert_sections",
            Self::DeleteSections(_) => "delete_sections",
            Self::ReloadSections(_) => "reload_sections",
            Self::MoveSection { .. } => "move_section",
            Self::InsertItems(_) => "insert_items",
            Self::DeleteItems(_) => "delete_items",
            Self::ReloadItems(_) => "reload_items",
            Self::MoveItem { .. } => "move_item",
        }
    }

    // Position of the op in `application_order`.
    fn phase(&self) -> u8 {
        match self {
            Self::DeleteItems(_) => 0,
            Self::DeleteSections(_) => 1,
            Self::ReloadSections(_) | Self::ReloadItems(_) => 2,
            Self::MoveSection { .. } | Self::MoveItem { .. } => 3,
            Self::InsertSections(_) => 4,
            Self::InsertItems(_) => 5,
        }
    }
}

/// Translates batches from one child into its composite's global space.
///
/// The child's offset is computed when the translator is created and reused
/// for every op, so a batch is interpreted against a single snapshot even if
/// earlier ops in it grow or shrink the child.
#[derive(Debug)]
pub struct BatchTranslator<'a> {
    mode: CompositionMode,
    child: &'a ProviderHandle,
    offset: usize,
}

impl<'a> BatchTranslator<'a> {
    /// Snapshot the offset of `child` among the translator's children.
    pub fn new(translator: &IndexTranslator<'a>, child: ProviderId) -> Result<Self> {
        let (handle, offset) = translator.locate(child)?;
        if translator.mode().is_single() {
            // Rejects children that cannot be flattened before any op is read.
            translator.span_of(handle.as_ref())?;
        }
        Ok(Self {
            mode: translator.mode(),
            child: handle,
            offset,
        })
    }

    /// Returns the offset applied to every op.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Translates a whole batch, stopping at the first invalid op.
    ///
    /// The child has already applied the batch when it reports it, so move
    /// endpoints are checked against the child's span as it was when each
    /// move ran: the current span with this batch's inserts and deletes
    /// undone, then replayed op by op.
    pub fn translate(&self, ops: &[MutationOp]) -> Result<Vec<MutationOp>> {
        let mut span = self.span_before(ops)?;
        let mut translated = Vec::with_capacity(ops.len());
        for op in ops {
            translated.push(self.translate_within(op, span)?);
            span = self.apply_span_delta(op, span);
        }

        tracing::trace!(
            target: targets::BATCH,
            child = %self.child.id(),
            mode = %self.mode,
            offset = self.offset,
            op_count = translated.len(),
            "translated batch"
        );
        Ok(translated)
    }

    /// Translates a single op.
    pub fn translate_op(&self, op: &MutationOp) -> Result<MutationOp> {
        let span = self.span_before(std::slice::from_ref(op))?;
        self.translate_within(op, span)
    }

    fn translate_within(&self, op: &MutationOp, span: usize) -> Result<MutationOp> {
        match self.mode {
            CompositionMode::Multi => self.translate_multi(op, span),
            CompositionMode::Single => self.translate_single(op, span),
        }
    }

    // Sections in Multi mode, items of section 0 in Single mode.
    fn current_span(&self) -> Result<usize> {
        match self.mode {
            CompositionMode::Multi => Ok(self.child.section_count()),
            CompositionMode::Single if self.child.section_count() == 0 => Ok(0),
            CompositionMode::Single => self.child.item_count(0),
        }
    }

    fn span_before(&self, ops: &[MutationOp]) -> Result<usize> {
        let (inserted, deleted) = ops.iter().fold((0usize, 0usize), |(ins, del), op| {
            match self.span_change(op) {
                SpanChange::Grow(n) => (ins + n, del),
                SpanChange::Shrink(n) => (ins, del + n),
                SpanChange::None => (ins, del),
            }
        });
        Ok((self.current_span()? + deleted).saturating_sub(inserted))
    }

    fn apply_span_delta(&self, op: &MutationOp, span: usize) -> usize {
        match self.span_change(op) {
            SpanChange::Grow(n) => span + n,
            SpanChange::Shrink(n) => span.saturating_sub(n),
            SpanChange::None => span,
        }
    }

    fn span_change(&self, op: &MutationOp) -> SpanChange {
        match (self.mode, op) {
            (CompositionMode::Multi, MutationOp::InsertSections(s)) => SpanChange::Grow(s.len()),
            (CompositionMode::Multi, MutationOp::DeleteSections(s)) => SpanChange::Shrink(s.len()),
            (CompositionMode::Single, MutationOp::InsertItems(i)) => SpanChange::Grow(i.len()),
            (CompositionMode::Single, MutationOp::DeleteItems(i)) => SpanChange::Shrink(i.len()),
            _ => SpanChange::None,
        }
    }

    fn translate_multi(&self, op: &MutationOp, span: usize) -> Result<MutationOp> {
        let offset = self.offset;
        let sections = |indices: &[usize]| -> Vec<usize> {
            indices.iter().map(|s| s + offset).collect()
        };
        let paths = |paths: &[IndexPath]| -> Vec<IndexPath> {
            paths.iter().map(|p| p.offset_section(offset)).collect()
        };

        Ok(match op {
            MutationOp::InsertSections(indices) => MutationOp::InsertSections(sections(indices)),
            MutationOp::DeleteSections(indices) => MutationOp::DeleteSections(sections(indices)),
            MutationOp::ReloadSections(indices) => MutationOp::ReloadSections(sections(indices)),
            MutationOp::MoveSection { from, to } => {
                let (from_path, to_path) = (IndexPath::new(*from, 0), IndexPath::new(*to, 0));
                self.check_move(from_path, to_path, *from, *to, span)?;
                MutationOp::MoveSection {
                    from: from + offset,
                    to: to + offset,
                }
            }
            MutationOp::InsertItems(items) => MutationOp::InsertItems(paths(items)),
            MutationOp::DeleteItems(items) => MutationOp::DeleteItems(paths(items)),
            MutationOp::ReloadItems(items) => MutationOp::ReloadItems(paths(items)),
            MutationOp::MoveItem { from, to } => {
                self.check_move(*from, *to, from.section, to.section, span)?;
                MutationOp::MoveItem {
                    from: from.offset_section(offset),
                    to: to.offset_section(offset),
                }
            }
        })
    }

    fn translate_single(&self, op: &MutationOp, span: usize) -> Result<MutationOp> {
        let offset = self.offset;

        Ok(match op {
            MutationOp::InsertSections(_)
            | MutationOp::DeleteSections(_)
            | MutationOp::MoveSection { .. } => {
                return Err(CompositionError::InconsistentSectionCount {
                    provider: self.child.id(),
                    sections: self.child.section_count(),
                });
            }
            MutationOp::ReloadSections(indices) => {
                if let Some(&section) = indices.iter().find(|&&s| s != 0) {
                    return Err(CompositionError::section_out_of_range(section, 1));
                }
                MutationOp::ReloadSections(indices.clone())
            }
            MutationOp::InsertItems(items) => MutationOp::InsertItems(self.flatten(items)?),
            MutationOp::DeleteItems(items) => MutationOp::DeleteItems(self.flatten(items)?),
            MutationOp::ReloadItems(items) => MutationOp::ReloadItems(self.flatten(items)?),
            MutationOp::MoveItem { from, to } => {
                require_section_zero(from)?;
                require_section_zero(to)?;
                self.check_move(*from, *to, from.item, to.item, span)?;
                MutationOp::MoveItem {
                    from: from.offset_item(offset),
                    to: to.offset_item(offset),
                }
            }
        })
    }

    fn flatten(&self, items: &[IndexPath]) -> Result<Vec<IndexPath>> {
        items
            .iter()
            .map(|path| {
                require_section_zero(path)?;
                Ok(path.offset_item(self.offset))
            })
            .collect()
    }

    // Both endpoints must lie inside the child's span at the time of the move.
    fn check_move(
        &self,
        from: IndexPath,
        to: IndexPath,
        from_key: usize,
        to_key: usize,
        span: usize,
    ) -> Result<()> {
        if from_key >= span || to_key >= span {
            return Err(self.move_across(from, to));
        }
        Ok(())
    }

    fn move_across(&self, from: IndexPath, to: IndexPath) -> CompositionError {
        CompositionError::MoveAcrossProviders {
            provider: self.child.id(),
            from,
            to,
        }
    }
}

/// How one op changes the child's span.
enum SpanChange {
    Grow(usize),
    Shrink(usize),
    None,
}

fn require_section_zero(path: &IndexPath) -> Result<()> {
    if path.section != 0 {
        return Err(CompositionError::section_out_of_range(path.section, 1));
    }
    Ok(())
}

/// Returns a copy of `ops` in an order that is safe to apply one at a time.
///
/// Deletions come first (items before sections, highest index first), then
/// reloads, then moves in their original order, then insertions (sections
/// before items, lowest index first). Indices inside each delete or insert op
/// are sorted the same way.
pub fn application_order(ops: &[MutationOp]) -> Vec<MutationOp> {
    let mut ordered: Vec<MutationOp> = ops
        .iter()
        .cloned()
        .map(|op| match op {
            MutationOp::DeleteItems(mut items) => {
                items.sort_unstable_by_key(|p| Reverse(*p));
                MutationOp::DeleteItems(items)
            }
            MutationOp::DeleteSections(mut sections) => {
                sections.sort_unstable_by_key(|s| Reverse(*s));
                MutationOp::DeleteSections(sections)
            }
            MutationOp::InsertSections(mut sections) => {
                sections.sort_unstable();
                MutationOp::InsertSections(sections)
            }
            MutationOp::InsertItems(mut items) => {
                items.sort_unstable();
                MutationOp::InsertItems(items)
            }
            other => other,
        })
        .collect();

    // Stable sort: ops within the reload and move phases keep their order.
    ordered.sort_by(|a, b| {
        a.phase()
            .cmp(&b.phase())
            .then_with(|| match (a, b) {
                (MutationOp::DeleteItems(x), MutationOp::DeleteItems(y)) => y.first().cmp(&x.first()),
                (MutationOp::DeleteSections(x), MutationOp::DeleteSections(y)) => {
                    y.first().cmp(&x.first())
                }
                (MutationOp::InsertSections(x), MutationOp::InsertSections(y)) => {
                    x.first().cmp(&y.first())
                }
                (MutationOp::InsertItems(x), MutationOp::InsertItems(y)) => x.first().cmp(&y.first()),
                _ => std::cmp::Ordering::Equal,
            })
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::traits::Provider;
    use std::sync::Arc;

    struct Fixed {
        id: ProviderId,
        sections: Vec<usize>,
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

    fn handle(sections: &[usize]) -> ProviderHandle {
        Arc::new(Fixed {
            id: ProviderId::next(),
            sections: sections.to_vec(),
        })
    }

    #[test]
    fn test_multi_shifts_sections() {
        let children = vec![handle(&[1, 1, 1]), handle(&[4, 4])];
        let translator = IndexTranslator::new(CompositionMode::Multi, &children);
        let batch = BatchTranslator::new(&translator, children[1].id()).unwrap();
        assert_eq!(batch.offset(), 3);

        let ops = vec![
            MutationOp::InsertSections(vec![0, 2]),
            MutationOp::ReloadItems(vec![IndexPath::new(1, 3)]),
            MutationOp::MoveSection { from: 0, to: 1 },
            MutationOp::MoveItem {
                from: IndexPath::new(0, 0),
                to: IndexPath::new(1, 9),
            },
        ];
        let translated = batch.translate(&ops).unwrap();

        assert_eq!(
            translated,
            vec![
                MutationOp::InsertSections(vec![3, 5]),
                MutationOp::ReloadItems(vec![IndexPath::new(4, 3)]),
                MutationOp::MoveSection { from: 3, to: 4 },
                MutationOp::MoveItem {
                    from: IndexPath::new(3, 0),
                    to: IndexPath::new(4, 9),
                },
            ]
        );
    }

    #[test]
    fn test_multi_move_outside_child() {
        let children = vec![handle(&[1]), handle(&[4, 4])];
        let translator = IndexTranslator::new(CompositionMode::Multi, &children);
        let first = children[0].id();
        let batch = BatchTranslator::new(&translator, first).unwrap();

        let err = batch
            .translate(&[MutationOp::MoveSection { from: 0, to: 1 }])
            .unwrap_err();
        assert_eq!(
            err,
            CompositionError::MoveAcrossProviders {
                provider: first,
                from: IndexPath::new(0, 0),
                to: IndexPath::new(1, 0),
            }
        );
    }

    #[test]
    fn test_single_shifts_items() {
        let children = vec![handle(&[50]), handle(&[200])];
        let translator = IndexTranslator::new(CompositionMode::Single, &children);
        let batch = BatchTranslator::new(&translator, children[1].id()).unwrap();
        assert_eq!(batch.offset(), 50);

        let translated = batch
            .translate(&[
                MutationOp::DeleteItems(vec![IndexPath::item(0), IndexPath::item(199)]),
                MutationOp::ReloadSections(vec![0]),
                MutationOp::MoveItem {
                    from: IndexPath::item(3),
                    to: IndexPath::item(7),
                },
            ])
            .unwrap();

        assert_eq!(
            translated,
            vec![
                MutationOp::DeleteItems(vec![IndexPath::item(50), IndexPath::item(249)]),
                MutationOp::ReloadSections(vec![0]),
                MutationOp::MoveItem {
                    from: IndexPath::item(53),
                    to: IndexPath::item(57),
                },
            ]
        );
    }

    #[test]
    fn test_single_rejects_section_ops() {
        let children = vec![handle(&[5])];
        let translator = IndexTranslator::new(CompositionMode::Single, &children);
        let id = children[0].id();
        let batch = BatchTranslator::new(&translator, id).unwrap();

        for op in [
            MutationOp::InsertSections(vec![1]),
            MutationOp::DeleteSections(vec![0]),
            MutationOp::MoveSection { from: 0, to: 0 },
        ] {
            assert_eq!(
                batch.translate_op(&op),
                Err(CompositionError::InconsistentSectionCount {
                    provider: id,
                    sections: 1,
                })
            );
        }

        assert!(batch
            .translate_op(&MutationOp::ReloadSections(vec![1]))
            .unwrap_err()
            .is_out_of_range());
        assert!(batch
            .translate_op(&MutationOp::InsertItems(vec![IndexPath::new(1, 0)]))
            .unwrap_err()
            .is_out_of_range());
    }

    #[test]
    fn test_single_move_outside_child() {
        let children = vec![handle(&[5]), handle(&[5])];
        let translator = IndexTranslator::new(CompositionMode::Single, &children);
        let batch = BatchTranslator::new(&translator, children[0].id()).unwrap();

        // Local item 5 would be the second child's first item
        assert!(matches!(
            batch.translate_op(&MutationOp::MoveItem {
                from: IndexPath::item(0),
                to: IndexPath::item(5),
            }),
            Err(CompositionError::MoveAcrossProviders { .. })
        ));
    }

    #[test]
    fn test_moves_follow_the_running_span() {
        // Five items after the batch, four before the insert
        let children = vec![handle(&[5]), handle(&[3])];
        let translator = IndexTranslator::new(CompositionMode::Single, &children);
        let id = children[0].id();
        let batch = BatchTranslator::new(&translator, id).unwrap();
        let move_to_last = MutationOp::MoveItem {
            from: IndexPath::item(0),
            to: IndexPath::item(4),
        };

        assert!(batch
            .translate(&[MutationOp::InsertItems(vec![IndexPath::item(4)]), move_to_last.clone()])
            .is_ok());
        assert_eq!(
            batch.translate(&[move_to_last, MutationOp::InsertItems(vec![IndexPath::item(4)])]),
            Err(CompositionError::MoveAcrossProviders {
                provider: id,
                from: IndexPath::item(0),
                to: IndexPath::item(4),
            })
        );
    }

    #[test]
    fn test_single_rejects_multi_section_child() {
        let children = vec![handle(&[1, 2])];
        let translator = IndexTranslator::new(CompositionMode::Single, &children);
        assert!(matches!(
            BatchTranslator::new(&translator, children[0].id()),
            Err(CompositionError::InconsistentSectionCount { sections: 2, .. })
        ));
    }

    #[test]
    fn test_translation_keeps_order_and_empty_ops() {
        let children = vec![handle(&[1])];
        let translator = IndexTranslator::new(CompositionMode::Multi, &children);
        let batch = BatchTranslator::new(&translator, children[0].id()).unwrap();

        let ops = vec![
            MutationOp::InsertItems(Vec::new()),
            MutationOp::DeleteItems(vec![IndexPath::new(0, 0)]),
            MutationOp::InsertItems(vec![IndexPath::new(0, 0)]),
        ];
        assert_eq!(batch.translate(&ops).unwrap(), ops);
    }

    #[test]
    fn test_application_order() {
        let ops = vec![
            MutationOp::InsertItems(vec![IndexPath::new(0, 4), IndexPath::new(0, 1)]),
            MutationOp::MoveItem {
                from: IndexPath::new(0, 0),
                to: IndexPath::new(0, 2),
            },
            MutationOp::DeleteSections(vec![1, 3]),
            MutationOp::ReloadItems(vec![IndexPath::new(2, 2)]),
            MutationOp::DeleteItems(vec![IndexPath::new(0, 1), IndexPath::new(0, 6)]),
            MutationOp::InsertSections(vec![2]),
            MutationOp::DeleteItems(vec![IndexPath::new(2, 0)]),
        ];

        assert_eq!(
            application_order(&ops),
            vec![
                MutationOp::DeleteItems(vec![IndexPath::new(2, 0)]),
                MutationOp::DeleteItems(vec![IndexPath::new(0, 6), IndexPath::new(0, 1)]),
                MutationOp::DeleteSections(vec![3, 1]),
                MutationOp::ReloadItems(vec![IndexPath::new(2, 2)]),
                MutationOp::MoveItem {
                    from: IndexPath::new(0, 0),
                    to: IndexPath::new(0, 2),
                },
                MutationOp::InsertSections(vec![2]),
                MutationOp::InsertItems(vec![IndexPath::new(0, 1), IndexPath::new(0, 4)]),
            ]
        );
    }

    #[test]
    fn test_op_names() {
        assert_eq!(MutationOp::ReloadSections(vec![0]).name(), "reload_sections");
        assert!(MutationOp::MoveSection { from: 0, to: 1 }.is_section_op());
        assert!(!MutationOp::DeleteItems(Vec::new()).is_section_op());
    }
}
