//! Paragraph splitting around media.
//!
//! The editor cannot hold media inside a paragraph, so a paragraph whose
//! children include images or media HTML becomes a sequence of paragraphs
//! and media elements in source order.

use mdtree_ast::{Node as SourceNode, NodeKind};
use mdtree_doc::{Element, Node};

use crate::Converter;
use crate::html::find_media;

impl Converter {
    pub(crate) fn split_paragraph(&self, paragraph: &SourceNode) -> Vec<Node> {
        let children = paragraph.children();
        if children.is_empty() {
            return vec![Element::empty_paragraph().into()];
        }

        let mut out = Vec::new();
        let mut run_start = 0;
        for (index, child) in children.iter().enumerate() {
            let Some(media) = self.media_of(child) else {
                continue;
            };
            self.flush_run(&children[run_start..index], paragraph, &mut out);
            out.push(media);
            run_start = index + 1;
        }
        self.flush_run(&children[run_start..], paragraph, &mut out);
        out
    }

    /// Emit a paragraph for a run of non-media children, if any.
    fn flush_run(&self, run: &[SourceNode], paragraph: &SourceNode, out: &mut Vec<Node>) {
        if run.is_empty() {
            return;
        }
        let children = self.convert(run, false, Some(paragraph));
        out.push(Element::paragraph(children).into());
    }

    fn media_of(&self, node: &SourceNode) -> Option<Node> {
        match &node.kind {
            NodeKind::Image { url, alt, .. } => Some(self.image_media(url, alt).into()),
            NodeKind::Html { value } => find_media(value)
                .map(|media| media.into_element(self.options.decode_urls).into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdtree_doc::ElementKind;
    use pretty_assertions::assert_eq;

    fn paragraph(children: Vec<SourceNode>) -> SourceNode {
        SourceNode::new(NodeKind::Paragraph { children })
    }

    fn image(url: &str) -> SourceNode {
        SourceNode::new(NodeKind::Image {
            url: url.to_owned(),
            alt: String::new(),
            title: None,
        })
    }

    fn html(value: &str) -> SourceNode {
        SourceNode::new(NodeKind::Html {
            value: value.to_owned(),
        })
    }

    fn media(url: &str) -> Node {
        Element::void(ElementKind::media(url)).into()
    }

    #[test]
    fn test_text_only_paragraph() {
        let node = paragraph(vec![SourceNode::text("plain")]);
        assert_eq!(
            Converter::default().split_paragraph(&node),
            vec![Node::from(Element::paragraph(vec![Node::leaf("plain")]))]
        );
    }

    #[test]
    fn test_media_only_paragraph() {
        let node = paragraph(vec![image("a.png"), image("b.png")]);
        assert_eq!(
            Converter::default().split_paragraph(&node),
            vec![media("a.png"), media("b.png")]
        );
    }

    #[test]
    fn test_html_media_flushes_preceding_text() {
        let node = paragraph(vec![
            SourceNode::text("before "),
            html(r#"<img src="x.png"/>"#),
            SourceNode::text(" after"),
        ]);
        assert_eq!(
            Converter::default().split_paragraph(&node),
            vec![
                Node::from(Element::paragraph(vec![Node::leaf("before ")])),
                media("x.png"),
                Node::from(Element::paragraph(vec![Node::leaf(" after")])),
            ]
        );
    }

    #[test]
    fn test_empty_paragraph() {
        assert_eq!(
            Converter::default().split_paragraph(&paragraph(vec![])),
            vec![Node::from(Element::empty_paragraph())]
        );
    }
}
