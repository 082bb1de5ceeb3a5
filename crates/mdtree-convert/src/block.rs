//! Per-kind dispatch from source nodes to document nodes.

use std::sync::LazyLock;

use mdtree_ast::{Node as SourceNode, NodeKind};
use mdtree_doc::{Element, ElementKind, Leaf, Node};
use regex::Regex;

use crate::Converter;
use crate::html::{TagStack, block_html, inline_html};
use crate::inline::flatten;
use crate::spacing::blank_paragraphs_between;
use crate::util::decode_url;

/// Literal checkbox left at the start of a list item's text.
static TASK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([x\s])\]").expect("invalid task marker regex"));

/// Image alt text naming a media identifier.
static IMAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^id:([\w.]+)$").expect("invalid image id regex"));

/// Whether raw HTML under `parent` is phrasing content.
///
/// Top-level HTML and HTML directly inside list items or block quotes is
/// block content.
fn is_inline_context(parent: Option<&SourceNode>) -> bool {
    parent.is_some_and(|p| {
        !matches!(
            p.kind,
            NodeKind::ListItem { .. } | NodeKind::Blockquote { .. }
        )
    })
}

/// Remove a literal checkbox from the first leaf of a leading paragraph.
///
/// Returns the checkbox state when one was found.
fn strip_task_marker(children: &mut [Node]) -> Option<bool> {
    let Some(Node::Element(first)) = children.first_mut() else {
        return None;
    };
    if first.kind != ElementKind::Paragraph {
        return None;
    }
    let Some(Node::Text(leaf)) = first.children.first_mut() else {
        return None;
    };
    let caps = TASK_MARKER.captures(&leaf.text)?;
    let checked = &caps[1] == "x";
    let marker_len = caps[0].len();
    leaf.text.drain(..marker_len);
    Some(checked)
}

impl Converter {
    /// Convert a sibling sequence.
    ///
    /// `top` marks the document's top level, where blank-line runs between
    /// siblings are reconstructed. `parent` decides whether raw HTML is read
    /// as inline or block content. An empty sequence yields one empty
    /// paragraph.
    #[must_use]
    pub fn convert(
        &self,
        nodes: &[SourceNode],
        top: bool,
        parent: Option<&SourceNode>,
    ) -> Vec<Node> {
        if nodes.is_empty() {
            return vec![Element::empty_paragraph().into()];
        }

        let mut tags = TagStack::default();
        let mut out = Vec::with_capacity(nodes.len());
        let mut previous: Option<&SourceNode> = None;
        for node in nodes {
            if top
                && self.options.reconstruct_blank_lines
                && let Some(previous) = previous
            {
                let count = blank_paragraphs_between(previous, node);
                out.extend((0..count).map(|_| Node::from(Element::empty_paragraph())));
            }
            self.convert_node(node, parent, &mut tags, &mut out);
            previous = Some(node);
        }
        out
    }

    /// Converted children of `node`, or nothing when it has none.
    pub(crate) fn convert_inner(&self, node: &SourceNode) -> Vec<Node> {
        if node.children().is_empty() {
            Vec::new()
        } else {
            self.convert(node.children(), false, Some(node))
        }
    }

    /// Media element for a markdown image.
    pub(crate) fn image_media(&self, url: &str, alt: &str) -> Element {
        Element::void(ElementKind::Media {
            url: decode_url(url, self.options.decode_urls),
            align: None,
            height: None,
            id: IMAGE_ID.captures(alt).map(|c| c[1].to_owned()),
        })
    }

    #[allow(clippy::too_many_lines)]
    fn convert_node(
        &self,
        node: &SourceNode,
        parent: Option<&SourceNode>,
        tags: &mut TagStack,
        out: &mut Vec<Node>,
    ) {
        let decode_urls = self.options.decode_urls;
        match &node.kind {
            NodeKind::Heading { depth, .. } => out.push(
                Element::new(ElementKind::Head { level: *depth }, self.convert_inner(node)).into(),
            ),
            NodeKind::Paragraph { .. } => out.extend(self.split_paragraph(node)),
            NodeKind::Blockquote { children } => out.push(
                Element::new(
                    ElementKind::Blockquote,
                    self.convert(children, false, Some(node)),
                )
                .into(),
            ),
            NodeKind::List {
                ordered,
                start,
                children,
            } => {
                let items = self.convert(children, false, Some(node));
                let task = items.iter().any(|item| {
                    matches!(
                        item.as_element().map(|e| &e.kind),
                        Some(ElementKind::ListItem { checked: Some(_) })
                    )
                });
                let kind = ElementKind::List {
                    ordered: *ordered,
                    start: *start,
                    task,
                };
                out.push(Element::new(kind, items).into());
            }
            NodeKind::ListItem { checked, children } => {
                let mut items = self.convert(children, false, Some(node));
                let checked = strip_task_marker(&mut items).or(*checked);
                out.push(Element::new(ElementKind::ListItem { checked }, items).into());
            }
            NodeKind::Table { align, children } => out.push(self.convert_table(align, children)),
            NodeKind::Code { lang, meta, value } => out.push(
                Element::void(ElementKind::Code {
                    language: lang.clone().unwrap_or_default(),
                    code: value.clone(),
                    render: meta.as_deref().map(str::trim) == Some("render"),
                    frontmatter: false,
                    katex: false,
                })
                .into(),
            ),
            NodeKind::Yaml { value } => out.push(
                Element::void(ElementKind::Code {
                    language: "yaml".to_owned(),
                    code: value.clone(),
                    render: false,
                    frontmatter: true,
                    katex: false,
                })
                .into(),
            ),
            NodeKind::Math { value } => out.push(
                Element::void(ElementKind::Code {
                    language: "latex".to_owned(),
                    code: value.clone(),
                    render: false,
                    frontmatter: false,
                    katex: true,
                })
                .into(),
            ),
            NodeKind::ThematicBreak => out.push(Element::void(ElementKind::Hr).into()),
            NodeKind::Html { value } => {
                if is_inline_context(parent) {
                    out.extend(inline_html(value, tags, decode_urls));
                } else {
                    out.push(block_html(value, decode_urls));
                }
            }
            NodeKind::Image { url, alt, .. } => out.push(self.image_media(url, alt).into()),
            NodeKind::Text { value } => out.push(tags.leaf(value).into()),
            NodeKind::Strong { .. }
            | NodeKind::Emphasis { .. }
            | NodeKind::Delete { .. }
            | NodeKind::Link { .. } => {
                out.extend(flatten(node, decode_urls).into_iter().map(Node::from));
            }
            NodeKind::InlineCode { value } => out.push(
                Leaf {
                    code: true,
                    ..Leaf::new(value.as_str())
                }
                .into(),
            ),
            NodeKind::InlineMath { value } => out.push(
                Element::new(ElementKind::InlineKatex, vec![Node::leaf(value.as_str())]).into(),
            ),
            NodeKind::WikiLink { value, alias } => {
                let text = match alias {
                    Some(alias) => format!("{value}|{alias}"),
                    None => value.clone(),
                };
                out.push(Element::new(ElementKind::WikiLink, vec![Node::leaf(text)]).into());
            }
            NodeKind::Break => out.push(Node::leaf("\n")),
            NodeKind::FootnoteReference { identifier, .. } => {
                out.push(Node::leaf(format!("[^{identifier}]")));
            }
            NodeKind::FootnoteDefinition {
                identifier,
                children,
                ..
            } => {
                let mut content = vec![Node::leaf(format!("[^{identifier}]:"))];
                match self.convert(children, false, Some(node)).into_iter().next() {
                    Some(Node::Element(first)) => content.extend(first.children),
                    Some(leaf @ Node::Text(_)) => content.push(leaf),
                    None => {}
                }
                out.push(Element::paragraph(content).into());
            }
            NodeKind::Root { .. }
            | NodeKind::TableRow { .. }
            | NodeKind::TableCell { .. }
            | NodeKind::Unknown => {
                tracing::debug!(kind = node.kind.name(), "Unsupported node, emitting empty text");
                out.push(Node::empty_leaf());
            }
        }
    }
}
