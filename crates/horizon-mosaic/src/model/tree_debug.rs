//! Debug output for composition trees.
//!
//! [`CompositionTreeDebug`] renders a provider and everything nested inside
//! it, which helps when an index lands in an unexpected child:
//!
//! ```
//! use std::sync::Arc;
//! use horizon_mosaic::model::{CompositeCollection, CompositionMode, CompositionTreeDebug, ListProvider};
//!
//! let inner = CompositeCollection::builder().mode(CompositionMode::Single).name("rows").build();
//! inner.add(Arc::new(ListProvider::new(vec![1, 2, 3]))).unwrap();
//!
//! let root = CompositeCollection::builder().name("page").build();
//! root.add(inner).unwrap();
//!
//! let text = CompositionTreeDebug::minimal().format(root.as_ref());
//! assert_eq!(
//!     text,
//!     "CompositeCollection \"page\" (multi)\n\
//!      \u{2514}\u{2500}\u{2500} CompositeCollection \"rows\" (single)\n    \
//!      \u{2514}\u{2500}\u{2500} ListProvider\n"
//! );
//! ```

use std::fmt::Write;

use super::traits::Provider;

/// Visual style of the tree branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Plain indentation with a leading dash.
    Compact,
}

/// Configuration for composition tree output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show provider ids.
    pub show_ids: bool,
    /// Whether to show section and item counts.
    pub show_counts: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_counts: true,
            max_depth: None,
        }
    }
}

/// Renders provider trees as text.
#[derive(Debug, Clone, Default)]
pub struct CompositionTreeDebug {
    options: TreeFormatOptions,
}

impl CompositionTreeDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Create a formatter that prints labels only.
    pub fn minimal() -> Self {
        Self::with_options(TreeFormatOptions {
            show_ids: false,
            show_counts: false,
            ..Default::default()
        })
    }

    /// Format the tree rooted at `root`.
    pub fn format(&self, root: &dyn Provider) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_tree(root, &mut output);
        output
    }

    /// Write the tree rooted at `root` into `output`.
    pub fn write_tree(&self, root: &dyn Provider, output: &mut impl Write) -> std::fmt::Result {
        let mut ancestors = Vec::new();
        self.write_node(root, &mut ancestors, true, output)
    }

    // `ancestors` holds, for every level above this node, whether that
    // ancestor was the last of its siblings.
    fn write_node(
        &self,
        node: &dyn Provider,
        ancestors: &mut Vec<bool>,
        is_last: bool,
        output: &mut impl Write,
    ) -> std::fmt::Result {
        let depth = ancestors.len();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        output.write_str(&self.prefix(ancestors, is_last))?;
        output.write_str(&node.debug_label())?;
        if self.options.show_ids {
            write!(output, " [{}]", node.id())?;
        }
        if self.options.show_counts {
            write!(
                output,
                " (sections: {}, items: {})",
                node.section_count(),
                node.total_item_count()
            )?;
        }
        output.write_char('\n')?;

        let children = node.child_providers();
        let count = children.len();
        ancestors.push(is_last);
        for (i, child) in children.iter().enumerate() {
            self.write_node(child.as_ref(), ancestors, i + 1 == count, output)?;
        }
        ancestors.pop();
        Ok(())
    }

    fn prefix(&self, ancestors: &[bool], is_last: bool) -> String {
        if ancestors.is_empty() {
            return String::new();
        }

        let (pipe, tee, corner, blank) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- ", "    "),
            TreeStyle::Unicode => (
                "\u{2502}   ",
                "\u{251c}\u{2500}\u{2500} ",
                "\u{2514}\u{2500}\u{2500} ",
                "    ",
            ),
            TreeStyle::Compact => ("  ", "- ", "- ", "  "),
        };

        let mut prefix = String::new();
        // The root's entry never draws a continuation line.
        for &ancestor_last in &ancestors[1..] {
            prefix.push_str(if ancestor_last { blank } else { pipe });
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix
    }
}
