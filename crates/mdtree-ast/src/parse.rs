//! Tree builder over pulldown-cmark events.
//!
//! pulldown-cmark emits a flat, balanced event stream. This module folds it
//! into an owned [`Node`] tree with mdast semantics: tight list items get an
//! implicit paragraph, adjacent text runs are merged, fenced code info is
//! split into language and meta, and block math is lifted out of its
//! paragraph.

use std::ops::Range;

use pulldown_cmark::{
    Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, MetadataBlockKind, Options,
    Parser, Tag,
};

use crate::node::{AlignKind, Node, NodeKind};
use crate::position::{LineIndex, Position};

/// Markdown extensions enabled when parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Tables and strikethrough.
    pub gfm: bool,
    /// `[^id]` references and definitions.
    pub footnotes: bool,
    /// `$inline$` and `$$display$$` math.
    pub math: bool,
    /// `[[Page]]` and `[[Page|alias]]` links.
    pub wikilinks: bool,
    /// Leading `---` YAML block.
    pub frontmatter: bool,
    /// `- [x]` list items.
    pub tasklists: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            footnotes: true,
            math: true,
            wikilinks: true,
            frontmatter: true,
            tasklists: true,
        }
    }
}

impl ParseOptions {
    /// pulldown-cmark option flags for these settings.
    #[must_use]
    pub fn to_pulldown(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options |= Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        }
        if self.footnotes {
            options |= Options::ENABLE_FOOTNOTES;
        }
        if self.math {
            options |= Options::ENABLE_MATH;
        }
        if self.wikilinks {
            options |= Options::ENABLE_WIKILINKS;
        }
        if self.frontmatter {
            options |= Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        }
        if self.tasklists {
            options |= Options::ENABLE_TASKLISTS;
        }
        options
    }
}

/// Parse markdown text into a `Root` node.
#[must_use]
pub fn parse(markdown: &str, options: &ParseOptions) -> Node {
    let index = LineIndex::new(markdown);
    let mut builder = TreeBuilder::new(markdown, &index);
    for (event, range) in Parser::new_ext(markdown, options.to_pulldown()).into_offset_iter() {
        builder.event(event, range);
    }
    let root = builder.finish();
    tracing::trace!(blocks = root.children().len(), "Parsed markdown");
    root
}

/// Node under construction.
struct Frame {
    kind: NodeKind,
    range: Range<usize>,
    /// Phrasing content of a tight list item, not yet wrapped in a paragraph.
    run: Vec<Node>,
}

impl Frame {
    fn new(kind: NodeKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            run: Vec::new(),
        }
    }

    /// Wrap pending phrasing content in an implicit paragraph.
    fn flush_run(&mut self) {
        if self.run.is_empty() {
            return;
        }
        let run = std::mem::take(&mut self.run);
        let first = run.first().and_then(|n| n.position);
        let last = run.last().and_then(|n| n.position);
        let paragraph = match (first, last) {
            (Some(first), Some(last)) => lift_display_math(run, first.merge(last)),
            _ => Node::new(NodeKind::Paragraph { children: run }),
        };
        if let Some(children) = self.kind.children_mut() {
            children.push(paragraph);
        }
    }
}

struct TreeBuilder<'a> {
    source: &'a str,
    index: &'a LineIndex,
    stack: Vec<Frame>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, index: &'a LineIndex) -> Self {
        Self {
            source,
            index,
            stack: vec![Frame::new(
                NodeKind::Root {
                    children: Vec::new(),
                },
                0..source.len(),
            )],
        }
    }

    fn position(&self, range: Range<usize>) -> Position {
        self.index.position(self.source, range)
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.open(tag, range),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text, range),
            Event::Code(code) => self.leaf(
                NodeKind::InlineCode {
                    value: code.into_string(),
                },
                range,
            ),
            Event::InlineMath(math) => self.leaf(
                NodeKind::InlineMath {
                    value: math.into_string(),
                },
                range,
            ),
            Event::DisplayMath(math) => self.leaf(
                NodeKind::Math {
                    value: math.into_string(),
                },
                range,
            ),
            Event::Html(html) => self.text(&html, range),
            Event::InlineHtml(html) => self.leaf(
                NodeKind::Html {
                    value: html.into_string(),
                },
                range,
            ),
            Event::FootnoteReference(label) => self.leaf(
                NodeKind::FootnoteReference {
                    identifier: label.to_lowercase(),
                    label: Some(label.into_string()),
                },
                range,
            ),
            Event::SoftBreak => self.text("\n", range),
            Event::HardBreak => self.leaf(NodeKind::Break, range),
            Event::Rule => self.leaf(NodeKind::ThematicBreak, range),
            Event::TaskListMarker(checked) => self.task_marker(checked),
        }
    }

    fn open(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph {
                children: Vec::new(),
            },
            Tag::Heading { level, .. } => NodeKind::Heading {
                depth: heading_depth(level),
                children: Vec::new(),
            },
            Tag::BlockQuote(_) => NodeKind::Blockquote {
                children: Vec::new(),
            },
            Tag::CodeBlock(kind) => {
                let (lang, meta) = match kind {
                    CodeBlockKind::Fenced(info) => split_info(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                NodeKind::Code {
                    lang,
                    meta,
                    value: String::new(),
                }
            }
            Tag::HtmlBlock => NodeKind::Html {
                value: String::new(),
            },
            Tag::List(start) => NodeKind::List {
                ordered: start.is_some(),
                start,
                children: Vec::new(),
            },
            Tag::Item => NodeKind::ListItem {
                checked: None,
                children: Vec::new(),
            },
            Tag::FootnoteDefinition(label) => NodeKind::FootnoteDefinition {
                identifier: label.to_lowercase(),
                label: Some(label.into_string()),
                children: Vec::new(),
            },
            Tag::Table(alignments) => NodeKind::Table {
                align: alignments.into_iter().map(align_kind).collect(),
                children: Vec::new(),
            },
            // The head row holds its cells directly.
            Tag::TableHead | Tag::TableRow => NodeKind::TableRow {
                children: Vec::new(),
            },
            Tag::TableCell => NodeKind::TableCell {
                children: Vec::new(),
            },
            Tag::Emphasis => NodeKind::Emphasis {
                children: Vec::new(),
            },
            Tag::Strong => NodeKind::Strong {
                children: Vec::new(),
            },
            Tag::Strikethrough => NodeKind::Delete {
                children: Vec::new(),
            },
            Tag::Link {
                link_type: LinkType::WikiLink { .. },
                dest_url,
                ..
            } => NodeKind::WikiLink {
                value: dest_url.into_string(),
                alias: None,
            },
            Tag::Link {
                dest_url, title, ..
            } => NodeKind::Link {
                url: dest_url.into_string(),
                title: non_empty(title),
                children: Vec::new(),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeKind::Image {
                url: dest_url.into_string(),
                alt: String::new(),
                title: non_empty(title),
            },
            Tag::MetadataBlock(MetadataBlockKind::YamlStyle) => NodeKind::Yaml {
                value: String::new(),
            },
            Tag::MetadataBlock(MetadataBlockKind::PlusesStyle)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => {
                tracing::trace!(?range, "Unsupported markdown construct");
                NodeKind::Unknown
            }
        };
        self.stack.push(Frame::new(kind, range));
    }

    fn close(&mut self) {
        // The root frame is never closed by an event.
        if self.stack.len() < 2 {
            return;
        }
        let Some(mut frame) = self.stack.pop() else {
            return;
        };
        frame.flush_run();
        let position = self.position(frame.range);
        let inline = frame.kind.is_inline();
        let node = finish_node(frame.kind, position);
        self.append(node, inline);
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close();
        }
        let position = self.position(0..self.source.len());
        match self.stack.pop() {
            Some(frame) => Node::with_position(frame.kind, position),
            None => Node::new(NodeKind::Root {
                children: Vec::new(),
            }),
        }
    }

    /// Append an event-level node. Everything but a rule is phrasing
    /// content, raw HTML included: block HTML arrives as a frame instead.
    fn leaf(&mut self, kind: NodeKind, range: Range<usize>) {
        let position = self.position(range);
        let inline = !matches!(kind, NodeKind::ThematicBreak);
        self.append(Node::with_position(kind, position), inline);
    }

    /// Literal text: captured by value-carrying frames, otherwise a text node.
    fn text(&mut self, text: &str, range: Range<usize>) {
        if let Some(frame) = self.stack.last_mut()
            && capture_text(&mut frame.kind, text)
        {
            return;
        }
        self.leaf(
            NodeKind::Text {
                value: text.to_owned(),
            },
            range,
        );
    }

    /// Append a finished node to the innermost frame. Tight list items hold
    /// phrasing content back until a block child or the item's end.
    fn append(&mut self, node: Node, inline: bool) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if matches!(frame.kind, NodeKind::ListItem { .. }) {
            if inline {
                push_merging_text(&mut frame.run, node);
                return;
            }
            frame.flush_run();
        }
        if let Some(children) = frame.kind.children_mut() {
            push_merging_text(children, node);
        } else {
            let text = node.plain_text();
            capture_text(&mut frame.kind, &text);
        }
    }

    fn task_marker(&mut self, checked: bool) {
        let item = self
            .stack
            .iter_mut()
            .rev()
            .find_map(|frame| match &mut frame.kind {
                NodeKind::ListItem { checked: slot, .. } => Some(slot),
                _ => None,
            });
        if let Some(slot) = item {
            *slot = Some(checked);
        }
    }
}

/// Append text to kinds that carry a literal value. Returns false for kinds
/// that hold children instead.
fn capture_text(kind: &mut NodeKind, text: &str) -> bool {
    match kind {
        NodeKind::Code { value, .. } | NodeKind::Html { value } | NodeKind::Yaml { value } => {
            value.push_str(text);
        }
        NodeKind::Image { alt, .. } => alt.push_str(text),
        NodeKind::WikiLink { alias, .. } => alias.get_or_insert_with(String::new).push_str(text),
        NodeKind::Unknown => {}
        _ => return false,
    }
    true
}

/// Push `node`, merging it into a preceding text node.
fn push_merging_text(children: &mut Vec<Node>, node: Node) {
    if let NodeKind::Text { value } = &node.kind
        && let Some(Node {
            kind: NodeKind::Text { value: previous },
            position,
        }) = children.last_mut()
    {
        previous.push_str(value);
        if let (Some(prev), Some(next)) = (*position, node.position) {
            *position = Some(prev.merge(next));
        }
        return;
    }
    children.push(node);
}

/// Apply mdast normalizations once a node's content is complete.
fn finish_node(kind: NodeKind, position: Position) -> Node {
    let kind = match kind {
        NodeKind::Code { lang, meta, value } => NodeKind::Code {
            lang,
            meta,
            value: strip_final_newline(value),
        },
        NodeKind::Html { value } => NodeKind::Html {
            value: value.trim_end_matches(['\n', '\r']).to_owned(),
        },
        NodeKind::Yaml { value } => NodeKind::Yaml {
            value: strip_final_newline(value),
        },
        NodeKind::WikiLink { value, alias } => {
            let alias = alias.filter(|alias| *alias != value);
            NodeKind::WikiLink { value, alias }
        }
        NodeKind::Paragraph { children } => return lift_display_math(children, position),
        kind => kind,
    };
    Node::with_position(kind, position)
}

/// A paragraph holding only display math becomes a block `math` node;
/// display math mixed with text is demoted to inline math.
fn lift_display_math(children: Vec<Node>, position: Position) -> Node {
    let is_math = |node: &Node| matches!(node.kind, NodeKind::Math { .. });
    let is_blank =
        |node: &Node| matches!(&node.kind, NodeKind::Text { value } if value.trim().is_empty());
    let math_count = children.iter().filter(|node| is_math(node)).count();
    if math_count == 1 && children.iter().all(|node| is_blank(node) || is_math(node)) {
        if let Some(Node {
            kind: NodeKind::Math { value },
            ..
        }) = children.into_iter().find(is_math)
        {
            let value = value.trim_matches(|c| c == '\n' || c == '\r').to_owned();
            return Node::with_position(NodeKind::Math { value }, position);
        }
        return Node::with_position(
            NodeKind::Paragraph {
                children: Vec::new(),
            },
            position,
        );
    }
    let children = children
        .into_iter()
        .map(|node| match node.kind {
            NodeKind::Math { value } => Node {
                kind: NodeKind::InlineMath { value },
                position: node.position,
            },
            _ => node,
        })
        .collect();
    Node::with_position(NodeKind::Paragraph { children }, position)
}

fn strip_final_newline(mut value: String) -> String {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
    value
}

/// Split a fence info string into language and meta.
fn split_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_owned()), non_empty_str(meta.trim())),
        None => (non_empty_str(info), None),
    }
}

fn non_empty(value: CowStr<'_>) -> Option<String> {
    non_empty_str(&value)
}

fn non_empty_str(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

fn align_kind(alignment: Alignment) -> Option<AlignKind> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some(AlignKind::Left),
        Alignment::Center => Some(AlignKind::Center),
        Alignment::Right => Some(AlignKind::Right),
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
