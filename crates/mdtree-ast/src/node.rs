//! Source AST node types.

use crate::position::Position;

/// Column alignment of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlignKind {
    Left,
    Right,
    Center,
}

/// A node of the source tree: its kind plus optional source position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Kind-specific payload, including children for container kinds.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: NodeKind,
    /// Source span, when the producing parser tracks it.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub position: Option<Position>,
}

/// Node kinds understood by the converter.
///
/// Field names follow mdast so that JSON produced by remark-style parsers
/// deserializes directly. Kinds outside this set map to [`NodeKind::Unknown`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum NodeKind {
    Root {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Heading {
        depth: u8,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Paragraph {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    List {
        #[cfg_attr(feature = "serde", serde(default))]
        ordered: bool,
        start: Option<u64>,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    ListItem {
        checked: Option<bool>,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Table {
        #[cfg_attr(feature = "serde", serde(default))]
        align: Vec<Option<AlignKind>>,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    TableRow {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    TableCell {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Blockquote {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    Html {
        value: String,
    },
    Image {
        url: String,
        #[cfg_attr(feature = "serde", serde(default))]
        alt: String,
        title: Option<String>,
    },
    Link {
        url: String,
        title: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Text {
        value: String,
    },
    Strong {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Emphasis {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    Delete {
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    InlineCode {
        value: String,
    },
    FootnoteReference {
        identifier: String,
        label: Option<String>,
    },
    FootnoteDefinition {
        identifier: String,
        label: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<Node>,
    },
    ThematicBreak,
    Yaml {
        value: String,
    },
    Math {
        value: String,
    },
    InlineMath {
        value: String,
    },
    WikiLink {
        value: String,
        alias: Option<String>,
    },
    Break,
    /// Any kind the converter does not model.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl NodeKind {
    /// mdast type name of this kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Root { .. } => "root",
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::List { .. } => "list",
            Self::ListItem { .. } => "listItem",
            Self::Table { .. } => "table",
            Self::TableRow { .. } => "tableRow",
            Self::TableCell { .. } => "tableCell",
            Self::Blockquote { .. } => "blockquote",
            Self::Code { .. } => "code",
            Self::Html { .. } => "html",
            Self::Image { .. } => "image",
            Self::Link { .. } => "link",
            Self::Text { .. } => "text",
            Self::Strong { .. } => "strong",
            Self::Emphasis { .. } => "emphasis",
            Self::Delete { .. } => "delete",
            Self::InlineCode { .. } => "inlineCode",
            Self::FootnoteReference { .. } => "footnoteReference",
            Self::FootnoteDefinition { .. } => "footnoteDefinition",
            Self::ThematicBreak => "thematicBreak",
            Self::Yaml { .. } => "yaml",
            Self::Math { .. } => "math",
            Self::InlineMath { .. } => "inlineMath",
            Self::WikiLink { .. } => "wikiLink",
            Self::Break => "break",
            Self::Unknown => "unknown",
        }
    }

    /// Child nodes, empty for leaf kinds.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Root { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Table { children, .. }
            | Self::TableRow { children }
            | Self::TableCell { children }
            | Self::Blockquote { children }
            | Self::Link { children, .. }
            | Self::Strong { children }
            | Self::Emphasis { children }
            | Self::Delete { children }
            | Self::FootnoteDefinition { children, .. } => children,
            _ => &[],
        }
    }

    /// Mutable child list, `None` for leaf kinds.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Root { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Table { children, .. }
            | Self::TableRow { children }
            | Self::TableCell { children }
            | Self::Blockquote { children }
            | Self::Link { children, .. }
            | Self::Strong { children }
            | Self::Emphasis { children }
            | Self::Delete { children }
            | Self::FootnoteDefinition { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Whether this kind is phrasing content (lives inside paragraphs).
    ///
    /// `html` is not listed: raw HTML is phrasing or block content depending
    /// on where the parser found it.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text { .. }
                | Self::Strong { .. }
                | Self::Emphasis { .. }
                | Self::Delete { .. }
                | Self::Link { .. }
                | Self::Image { .. }
                | Self::InlineCode { .. }
                | Self::InlineMath { .. }
                | Self::FootnoteReference { .. }
                | Self::WikiLink { .. }
                | Self::Break
        )
    }
}

impl Node {
    /// Node without position information.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    /// Node spanning the given position.
    #[must_use]
    pub fn with_position(kind: NodeKind, position: Position) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }

    /// Text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    /// Child nodes, empty for leaf kinds.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        self.kind.children()
    }

    /// First source line, if known.
    #[must_use]
    pub fn start_line(&self) -> Option<usize> {
        self.position.map(|p| p.start.line)
    }

    /// Last source line, if known.
    #[must_use]
    pub fn end_line(&self) -> Option<usize> {
        self.position.map(|p| p.end.line)
    }

    /// Concatenated literal text of this node and its descendants.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { value }
            | NodeKind::InlineCode { value }
            | NodeKind::InlineMath { value }
            | NodeKind::Math { value } => out.push_str(value),
            NodeKind::Image { alt, .. } => out.push_str(alt),
            NodeKind::WikiLink { value, alias } => {
                out.push_str(alias.as_deref().unwrap_or(value));
            }
            NodeKind::Break => out.push('\n'),
            kind => {
                for child in kind.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Point;

    #[test]
    fn test_plain_text_nested() {
        let node = Node::new(NodeKind::Paragraph {
            children: vec![
                Node::text("a "),
                Node::new(NodeKind::Strong {
                    children: vec![Node::text("b")],
                }),
                Node::new(NodeKind::InlineCode {
                    value: "c".to_owned(),
                }),
            ],
        });
        assert_eq!(node.plain_text(), "a bc");
    }

    #[test]
    fn test_lines_from_position() {
        let position = Position {
            start: Point { line: 2, column: 1 },
            end: Point { line: 4, column: 3 },
        };
        let node = Node::with_position(NodeKind::ThematicBreak, position);
        assert_eq!(node.start_line(), Some(2));
        assert_eq!(node.end_line(), Some(4));
        assert_eq!(Node::new(NodeKind::Break).start_line(), None);
    }

    #[test]
    fn test_leaf_kinds_have_no_children() {
        let mut kind = NodeKind::Text {
            value: "x".to_owned(),
        };
        assert!(kind.children().is_empty());
        assert!(kind.children_mut().is_none());
    }

    #[test]
    fn test_phrasing_kinds() {
        assert!(NodeKind::Break.is_inline());
        assert!(
            NodeKind::Strong {
                children: Vec::new()
            }
            .is_inline()
        );
        assert!(
            !NodeKind::Paragraph {
                children: Vec::new()
            }
            .is_inline()
        );
        assert!(
            !NodeKind::Html {
                value: "<b>".to_owned()
            }
            .is_inline()
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_mdast_json() {
        let json = r#"{
            "type": "root",
            "children": [
                {
                    "type": "heading",
                    "depth": 2,
                    "children": [{"type": "text", "value": "Hi"}],
                    "position": {
                        "start": {"line": 1, "column": 1, "offset": 0},
                        "end": {"line": 1, "column": 6, "offset": 5}
                    }
                },
                {"type": "table", "align": ["left", null], "children": []},
                {"type": "definition", "identifier": "x", "url": "y"}
            ]
        }"#;
        let root: Node = serde_json::from_str(json).unwrap();
        let children = root.children();
        assert_eq!(children.len(), 3);
        assert!(matches!(children[0].kind, NodeKind::Heading { depth: 2, .. }));
        assert_eq!(children[0].start_line(), Some(1));
        assert_eq!(
            children[1].kind,
            NodeKind::Table {
                align: vec![Some(AlignKind::Left), None],
                children: vec![],
            }
        );
        assert_eq!(children[2].kind, NodeKind::Unknown);
    }
}
