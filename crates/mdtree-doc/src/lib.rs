//! Document node tree consumed by the rich-text editing surface.
//!
//! A document is a sequence of [`Node`]s. Each node is either an
//! [`Element`] (a tagged block or inline element owning children) or a
//! [`Leaf`] (a run of text with formatting flags).
//!
//! # Invariants
//!
//! - An element's children are never empty. [`Element::new`] substitutes a
//!   single empty leaf when given none.
//! - Optional fields (`url`, `align`, `height`, `id`, ...) are `None` when
//!   unset, never empty strings.
//!
//! With the `serde` feature the tree serializes to the JSON shape the
//! editor expects:
//!
//! ```json
//! [{"type": "head", "level": 1, "children": [{"text": "Title"}]}]
//! ```

mod node;

pub use node::{Align, Element, ElementKind, Leaf, Node};
