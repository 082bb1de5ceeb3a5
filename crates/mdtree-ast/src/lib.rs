//! Markdown source AST for the document-tree converter.
//!
//! The converter consumes an mdast-shaped tree: every node is tagged by kind,
//! carries kind-specific fields and, when known, the source lines it spans.
//! Trees come from one of two places:
//!
//! - [`parse`]: the built-in adapter over `pulldown-cmark`, covering
//!   CommonMark, GFM tables/strikethrough/task lists, footnotes, math,
//!   YAML frontmatter and wiki links.
//! - Any external parser that emits mdast JSON, deserialized through the
//!   `serde` feature.
//!
//! # Example
//!
//! ```
//! use mdtree_ast::{NodeKind, ParseOptions, parse};
//!
//! let root = parse("# Title\n\nBody text.\n", &ParseOptions::default());
//! let children = root.children();
//! assert!(matches!(children[0].kind, NodeKind::Heading { depth: 1, .. }));
//! assert_eq!(children[1].start_line(), Some(3));
//! ```

mod node;
mod parse;
mod position;

pub use node::{AlignKind, Node, NodeKind};
pub use parse::{ParseOptions, parse};
pub use position::{LineIndex, Point, Position};
