//! Document node types.

/// Horizontal alignment of a table cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    /// Alignment row marker used in markdown tables.
    #[must_use]
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Left => ":---",
            Self::Right => "---:",
            Self::Center => ":---:",
        }
    }
}

/// A run of text with formatting flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leaf {
    pub text: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "std::ops::Not::not")
    )]
    pub bold: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "std::ops::Not::not")
    )]
    pub italic: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "std::ops::Not::not")
    )]
    pub strikethrough: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "std::ops::Not::not")
    )]
    pub code: bool,
    /// Link target.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub url: Option<String>,
    /// Text highlight color (CSS color value).
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            rename = "highColor",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub high_color: Option<String>,
}

impl Leaf {
    /// Unformatted leaf.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Unformatted leaf with no text.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy of this leaf's formatting with different text.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Whether any formatting flag is set.
    #[must_use]
    pub fn is_formatted(&self) -> bool {
        self.bold
            || self.italic
            || self.strikethrough
            || self.code
            || self.url.is_some()
            || self.high_color.is_some()
    }
}

/// Element kinds and their kind-specific attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum ElementKind {
    Paragraph,
    Head {
        level: u8,
    },
    List {
        ordered: bool,
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        start: Option<u64>,
        /// At least one item carries a checkbox.
        #[cfg_attr(feature = "serde", serde(default))]
        task: bool,
    },
    ListItem {
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        checked: Option<bool>,
    },
    Table,
    TableRow,
    TableCell {
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        align: Option<Align>,
        /// Cell belongs to the header row.
        #[cfg_attr(feature = "serde", serde(default))]
        title: bool,
    },
    Blockquote,
    /// Code block. At most one of `render`, `frontmatter` and `katex` is set.
    Code {
        language: String,
        code: String,
        /// Fenced with `render` meta: the editor renders the content.
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "std::ops::Not::not")
        )]
        render: bool,
        /// Leading YAML frontmatter.
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "std::ops::Not::not")
        )]
        frontmatter: bool,
        /// Display math.
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "std::ops::Not::not")
        )]
        katex: bool,
    },
    Media {
        url: String,
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        align: Option<String>,
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        height: Option<u32>,
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        id: Option<String>,
    },
    InlineKatex,
    WikiLink,
    Break,
    Hr,
}

impl ElementKind {
    /// Wire name of this kind (the JSON `type` value).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Head { .. } => "head",
            Self::List { .. } => "list",
            Self::ListItem { .. } => "list-item",
            Self::Table => "table",
            Self::TableRow => "table-row",
            Self::TableCell { .. } => "table-cell",
            Self::Blockquote => "blockquote",
            Self::Code { .. } => "code",
            Self::Media { .. } => "media",
            Self::InlineKatex => "inline-katex",
            Self::WikiLink => "wiki-link",
            Self::Break => "break",
            Self::Hr => "hr",
        }
    }

    /// Media element with only a URL.
    #[must_use]
    pub fn media(url: impl Into<String>) -> Self {
        Self::Media {
            url: url.into(),
            align: None,
            height: None,
            id: None,
        }
    }
}

/// A tagged element owning a non-empty child sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

impl Element {
    /// Element with the given children, or a single empty leaf if none.
    #[must_use]
    pub fn new(kind: ElementKind, mut children: Vec<Node>) -> Self {
        if children.is_empty() {
            children.push(Node::Text(Leaf::empty()));
        }
        Self { kind, children }
    }

    /// Element whose content lives in its attributes (media, code, hr, ...).
    #[must_use]
    pub fn void(kind: ElementKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Paragraph with the given children.
    #[must_use]
    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(ElementKind::Paragraph, children)
    }

    /// Paragraph holding a single empty leaf.
    #[must_use]
    pub fn empty_paragraph() -> Self {
        Self::void(ElementKind::Paragraph)
    }

    /// Whether this element has only empty-text leaves.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.children
            .iter()
            .all(|child| matches!(child, Node::Text(leaf) if leaf.text.is_empty()))
    }
}

/// A document node: an element or a text leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Node {
    Element(Element),
    Text(Leaf),
}

impl Node {
    /// Unformatted leaf node.
    #[must_use]
    pub fn leaf(text: impl Into<String>) -> Self {
        Self::Text(Leaf::new(text))
    }

    /// Leaf node with no text.
    #[must_use]
    pub fn empty_leaf() -> Self {
        Self::Text(Leaf::empty())
    }

    /// The element, if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// The leaf, if this node is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Element(_) => None,
            Self::Text(leaf) => Some(leaf),
        }
    }

    /// Element kind name, or `"text"` for leaves.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Element(element) => element.kind.name(),
            Self::Text(_) => "text",
        }
    }

    /// Children of an element; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(element) => &element.children,
            Self::Text(_) => &[],
        }
    }

    /// Concatenated text of all leaves below this node.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| {
            if let Self::Text(leaf) = node {
                out.push_str(&leaf.text);
            }
        });
        out
    }

    /// Visit this node and its descendants depth-first, parents first.
    pub fn walk<F: FnMut(&Node)>(&self, visit: &mut F) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Self::Text(leaf)
    }
}
