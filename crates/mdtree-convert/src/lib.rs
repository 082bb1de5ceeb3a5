//! Markdown AST to document tree conversion.
//!
//! This crate turns a parsed markdown tree ([`mdtree_ast::Node`]) into the
//! nested [`mdtree_doc::Node`] tree consumed by the rich-text editor.
//!
//! # Architecture
//!
//! The [`Converter`] walks the source tree and dispatches each node kind:
//! - inline marks (`strong`, `emphasis`, `delete`, `link`, `inlineCode`) are
//!   flattened into formatted leaves;
//! - raw HTML is interpreted: media tags become `media` elements, inline
//!   formatting tags are tracked on a tag stack and applied to the text that
//!   follows them;
//! - tables are padded so every row has the same number of cells;
//! - paragraphs are split around images so media never nests inside text;
//! - at the top level, empty paragraphs are inserted where the source had
//!   runs of blank lines.
//!
//! Conversion never fails: unknown or malformed input degrades to empty or
//! literal text leaves.
//!
//! [`to_markdown`] writes a document tree back to markdown.
//!
//! # Example
//!
//! ```
//! use mdtree_ast::ParseOptions;
//! use mdtree_convert::{ConvertOptions, markdown_to_document};
//!
//! let doc = markdown_to_document(
//!     "Text ![alt](img.png) more text",
//!     &ParseOptions::default(),
//!     &ConvertOptions::default(),
//! );
//! let kinds: Vec<_> = doc.iter().map(|n| n.kind_name()).collect();
//! assert_eq!(kinds, ["paragraph", "media", "paragraph"]);
//! ```

mod block;
mod html;
mod inline;
mod markdown;
mod paragraph;
mod spacing;
mod table;
mod util;

use mdtree_ast::{Node as SourceNode, NodeKind, ParseOptions};
use mdtree_doc::Node;

pub use html::{Attachment, MediaTag, find_attachment, find_media};
pub use markdown::to_markdown;

/// Conversion settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Insert empty paragraphs between top-level blocks separated by runs
    /// of blank lines.
    pub reconstruct_blank_lines: bool,
    /// Percent-decode media and link URLs.
    pub decode_urls: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            reconstruct_blank_lines: true,
            decode_urls: true,
        }
    }
}

/// Converts source trees into document trees.
///
/// Holds only settings; every call starts from fresh local state, so one
/// converter can be shared across threads.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with the given settings.
    #[must_use]
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Settings in use.
    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a whole document.
    ///
    /// A `root` node has its children converted as top-level blocks; any
    /// other node is converted as a single top-level block.
    #[must_use]
    pub fn convert_document(&self, root: &SourceNode) -> Vec<Node> {
        let nodes = match &root.kind {
            NodeKind::Root { children } => self.convert(children, true, None),
            _ => self.convert(std::slice::from_ref(root), true, None),
        };
        tracing::debug!(blocks = nodes.len(), "Converted document");
        nodes
    }
}

/// Convert a whole document with default settings.
#[must_use]
pub fn convert_document(root: &SourceNode) -> Vec<Node> {
    Converter::default().convert_document(root)
}

/// Parse markdown text and convert it in one step.
#[must_use]
pub fn markdown_to_document(
    markdown: &str,
    parse_options: &ParseOptions,
    convert_options: &ConvertOptions,
) -> Vec<Node> {
    let root = mdtree_ast::parse(markdown, parse_options);
    Converter::new(*convert_options).convert_document(&root)
}
