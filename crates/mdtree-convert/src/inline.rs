//! Flattening of nested inline marks into formatted leaves.

use mdtree_ast::{Node as SourceNode, NodeKind};
use mdtree_doc::Leaf;

use crate::util::decode_url;

/// Leaves for a `strong`, `emphasis`, `delete` or `link` subtree.
///
/// Every text-bearing descendant yields one leaf carrying the union of the
/// marks above it. A subtree with no text still yields one leaf so the mark
/// is not lost.
pub(crate) fn flatten(node: &SourceNode, decode_urls: bool) -> Vec<Leaf> {
    let mut out = Vec::new();
    collect(
        std::slice::from_ref(node),
        &Leaf::empty(),
        decode_urls,
        &mut out,
    );
    if out.is_empty() {
        out.push(mark(&Leaf::empty(), &node.kind, decode_urls));
    }
    out
}

/// Copy of `base` with the mark of a wrapper kind added.
fn mark(base: &Leaf, kind: &NodeKind, decode_urls: bool) -> Leaf {
    let mut leaf = base.clone();
    match kind {
        NodeKind::Strong { .. } => leaf.bold = true,
        NodeKind::Emphasis { .. } => leaf.italic = true,
        NodeKind::Delete { .. } => leaf.strikethrough = true,
        NodeKind::Link { url, .. } if !url.is_empty() => {
            leaf.url = Some(decode_url(url, decode_urls));
        }
        _ => {}
    }
    leaf
}

fn collect(nodes: &[SourceNode], base: &Leaf, decode_urls: bool, out: &mut Vec<Leaf>) {
    for node in nodes {
        match &node.kind {
            NodeKind::Strong { children }
            | NodeKind::Emphasis { children }
            | NodeKind::Delete { children }
            | NodeKind::Link { children, .. } => {
                let leaf = mark(base, &node.kind, decode_urls);
                if children.is_empty() {
                    // A bare link still shows its target.
                    let text = leaf.url.clone().unwrap_or_default();
                    out.push(Leaf { text, ..leaf });
                } else {
                    collect(children, &leaf, decode_urls, out);
                }
            }
            NodeKind::Text { value } | NodeKind::Html { value } | NodeKind::InlineMath { value } => {
                out.push(base.with_text(value.as_str()));
            }
            NodeKind::InlineCode { value } => out.push(Leaf {
                code: true,
                ..base.with_text(value.as_str())
            }),
            NodeKind::Break => out.push(base.with_text("\n")),
            NodeKind::FootnoteReference { identifier, .. } => {
                out.push(base.with_text(format!("[^{identifier}]")));
            }
            NodeKind::WikiLink { value, alias } => {
                out.push(base.with_text(alias.as_deref().unwrap_or(value)));
            }
            other => {
                tracing::trace!(kind = other.name(), "Dropping node inside inline marks");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strong(children: Vec<SourceNode>) -> SourceNode {
        SourceNode::new(NodeKind::Strong { children })
    }

    fn emphasis(children: Vec<SourceNode>) -> SourceNode {
        SourceNode::new(NodeKind::Emphasis { children })
    }

    fn link(url: &str, children: Vec<SourceNode>) -> SourceNode {
        SourceNode::new(NodeKind::Link {
            url: url.to_owned(),
            title: None,
            children,
        })
    }

    #[test]
    fn test_nested_marks_union() {
        let node = strong(vec![
            SourceNode::text("a "),
            emphasis(vec![SourceNode::text("b")]),
        ]);
        assert_eq!(
            flatten(&node, true),
            vec![
                Leaf {
                    bold: true,
                    ..Leaf::new("a ")
                },
                Leaf {
                    bold: true,
                    italic: true,
                    ..Leaf::new("b")
                },
            ]
        );
    }

    #[test]
    fn test_link_carries_decoded_url_into_marks() {
        let node = link(
            "https://x.test/a%20b",
            vec![strong(vec![SourceNode::text("go")])],
        );
        assert_eq!(
            flatten(&node, true),
            vec![Leaf {
                bold: true,
                url: Some("https://x.test/a b".to_owned()),
                ..Leaf::new("go")
            }]
        );
    }

    #[test]
    fn test_inline_code_inside_marks() {
        let node = emphasis(vec![SourceNode::new(NodeKind::InlineCode {
            value: "x".to_owned(),
        })]);
        assert_eq!(
            flatten(&node, true),
            vec![Leaf {
                italic: true,
                code: true,
                ..Leaf::new("x")
            }]
        );
    }

    #[test]
    fn test_empty_link_shows_url() {
        let node = link("https://x.test", vec![]);
        assert_eq!(
            flatten(&node, true),
            vec![Leaf {
                url: Some("https://x.test".to_owned()),
                ..Leaf::new("https://x.test")
            }]
        );
    }

    #[test]
    fn test_mark_without_text_keeps_formatting() {
        let node = strong(vec![SourceNode::new(NodeKind::Image {
            url: "a.png".to_owned(),
            alt: String::new(),
            title: None,
        })]);
        assert_eq!(
            flatten(&node, true),
            vec![Leaf {
                bold: true,
                ..Leaf::empty()
            }]
        );
    }

    #[test]
    fn test_no_spurious_empty_leaves() {
        let node = SourceNode::new(NodeKind::Delete {
            children: vec![SourceNode::text("gone")],
        });
        assert_eq!(
            flatten(&node, true),
            vec![Leaf {
                strikethrough: true,
                ..Leaf::new("gone")
            }]
        );
    }
}
