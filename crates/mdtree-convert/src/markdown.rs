//! Markdown serialization of document trees.
//!
//! The writer mirrors the converter: converting the written markdown again
//! yields the same tree for paragraphs, headings, marks, links, tables and
//! blank-line runs. Each top-level empty paragraph is written as two extra
//! blank lines, which the converter turns back into one empty paragraph.

use std::fmt::Write;
use std::sync::LazyLock;

use mdtree_doc::{Align, Element, ElementKind, Leaf, Node};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

/// Characters that would end or break a markdown link destination.
const URL_ESCAPE: &AsciiSet = &CONTROLS.add(b' ').add(b'(').add(b')').add(b'<').add(b'>');

/// Punctuation escaped in plain text.
const ESCAPED: &str = "\\`*_[]<>~|$#!&";

/// Line openings that would start a list item or a setext underline.
static BLOCK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)([-+=]|\d+[.)])").expect("invalid block marker regex")
});

/// Write a document tree as markdown.
pub fn to_markdown(nodes: &[Node]) -> String {
    let mut out = blocks(nodes, true);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Blocks separated by blank lines.
///
/// At the top level, empty paragraphs widen the following separator;
/// elsewhere they are dropped.
fn blocks(nodes: &[Node], top: bool) -> String {
    let mut out = String::new();
    let mut pending_blank = 0;
    for node in nodes {
        if let Node::Element(element) = node
            && element.kind == ElementKind::Paragraph
            && element.is_blank()
        {
            if top {
                pending_blank += 1;
            }
            continue;
        }
        let text = block(node);
        if text.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
            out.push_str(&"\n\n".repeat(pending_blank));
        }
        pending_blank = 0;
        out.push_str(&text);
    }
    out
}

fn block(node: &Node) -> String {
    let Node::Element(element) = node else {
        return inline(node);
    };
    let children = &element.children;
    match &element.kind {
        ElementKind::Paragraph => escape_block_markers(&inlines(children)),
        ElementKind::Head { level } => {
            let hashes = "#".repeat(usize::from((*level).clamp(1, 6)));
            let text = inlines(children).replace('\n', " ");
            format!("{hashes} {text}").trim_end().to_owned()
        }
        ElementKind::Blockquote => quote(&blocks(children, false)),
        ElementKind::List { ordered, start, .. } => list(children, *ordered, *start),
        ElementKind::Table => table(children),
        ElementKind::Code {
            language,
            code,
            render,
            frontmatter,
            katex,
        } => {
            if *frontmatter {
                format!("---\n{code}\n---")
            } else if *katex {
                format!("$$\n{code}\n$$")
            } else {
                let fence = "`".repeat(longest_run(code, '`').max(2) + 1);
                let info = if *render {
                    format!("{language} render")
                } else {
                    language.clone()
                };
                format!("{fence}{}\n{code}\n{fence}", info.trim())
            }
        }
        ElementKind::Hr => "---".to_owned(),
        ElementKind::ListItem { .. } | ElementKind::TableRow | ElementKind::TableCell { .. } => {
            blocks(children, false)
        }
        ElementKind::Media { .. }
        | ElementKind::InlineKatex
        | ElementKind::WikiLink
        | ElementKind::Break => inline(node),
    }
}

fn quote(content: &str) -> String {
    if content.is_empty() {
        return ">".to_owned();
    }
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn list(items: &[Node], ordered: bool, start: Option<u64>) -> String {
    let mut lines = Vec::with_capacity(items.len());
    for (number, item) in (start.unwrap_or(1)..).zip(items) {
        let marker = if ordered {
            format!("{number}.")
        } else {
            "-".to_owned()
        };
        let (checked, body) = match item {
            Node::Element(Element {
                kind: ElementKind::ListItem { checked },
                children,
            }) => (*checked, blocks(children, false)),
            other => (None, block(other)),
        };
        let checkbox = match checked {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };
        let indent = " ".repeat(marker.len() + 1);
        let mut body_lines = body.lines();
        let mut text = format!("{marker} {checkbox}{}", body_lines.next().unwrap_or_default());
        for line in body_lines {
            text.push('\n');
            if !line.is_empty() {
                text.push_str(&indent);
                text.push_str(line);
            }
        }
        lines.push(text.trim_end().to_owned());
    }
    lines.join("\n")
}

fn table(rows: &[Node]) -> String {
    let rows: Vec<Vec<(Option<Align>, String)>> = rows
        .iter()
        .map(|row| {
            row.children()
                .iter()
                .map(|cell| {
                    let align = match cell.as_element().map(|e| &e.kind) {
                        Some(ElementKind::TableCell { align, .. }) => *align,
                        _ => None,
                    };
                    (align, inlines(cell.children()).replace('\n', " "))
                })
                .collect()
        })
        .collect();
    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };

    let mut lines = vec![
        table_line(header.iter().map(|(_, text)| text.as_str())),
        table_line(
            header
                .iter()
                .map(|(align, _)| align.map_or("---", Align::delimiter)),
        ),
    ];
    lines.extend(
        body.iter()
            .map(|row| table_line(row.iter().map(|(_, text)| text.as_str()))),
    );
    lines.join("\n")
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push(' ');
        line.push_str(cell);
        line.push_str(" |");
    }
    line
}

fn inlines(nodes: &[Node]) -> String {
    nodes.iter().map(inline).collect()
}

fn inline(node: &Node) -> String {
    let element = match node {
        Node::Text(leaf) => return leaf_markdown(leaf),
        Node::Element(element) => element,
    };
    match &element.kind {
        ElementKind::Break => "<br>".to_owned(),
        ElementKind::InlineKatex => format!("${}$", node.plain_text()),
        ElementKind::WikiLink => format!("[[{}]]", node.plain_text()),
        ElementKind::Media {
            url,
            align,
            height,
            id,
        } => media(url, align.as_deref(), *height, id.as_deref()),
        _ => inlines(&element.children),
    }
}

fn media(url: &str, align: Option<&str>, height: Option<u32>, id: Option<&str>) -> String {
    let url = utf8_percent_encode(url, URL_ESCAPE).to_string();
    if align.is_none() && height.is_none() {
        let alt = id.map(|id| format!("id:{id}")).unwrap_or_default();
        return format!("![{alt}]({url})");
    }
    let mut tag = format!("<img src=\"{url}\"");
    if let Some(id) = id {
        let _ = write!(tag, " alt=\"id:{id}\"");
    }
    if let Some(height) = height {
        let _ = write!(tag, " height=\"{height}\"");
    }
    if let Some(align) = align {
        let _ = write!(tag, " data-align=\"{align}\"");
    }
    tag.push_str("/>");
    tag
}

fn leaf_markdown(leaf: &Leaf) -> String {
    if leaf.text == "\n" && !leaf.is_formatted() {
        return "\\\n".to_owned();
    }
    // Marks must hug non-whitespace, so edge whitespace stays outside them.
    let core = leaf.text.trim();
    if core.is_empty() {
        return escape(&leaf.text);
    }
    let start = leaf.text.len() - leaf.text.trim_start().len();
    let lead = &leaf.text[..start];
    let trail = &leaf.text[start + core.len()..];

    let mut text = if leaf.code {
        code_span(core)
    } else {
        escape(core)
    };
    if leaf.strikethrough {
        text = format!("~~{text}~~");
    }
    if leaf.italic {
        text = format!("*{text}*");
    }
    if leaf.bold {
        text = format!("**{text}**");
    }
    if let Some(color) = &leaf.high_color {
        text = format!("<span style=\"color:{color}\">{text}</span>");
    }
    if let Some(url) = &leaf.url {
        text = format!("[{text}]({})", utf8_percent_encode(url, URL_ESCAPE));
    }
    format!("{}{text}{}", escape(lead), escape(trail))
}

fn code_span(code: &str) -> String {
    let fence = "`".repeat(longest_run(code, '`') + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

/// Escape the last character of a block marker at the start of any line.
fn escape_block_markers(text: &str) -> String {
    BLOCK_MARKER
        .replace_all(text, |caps: &Captures<'_>| {
            let marker = &caps[2];
            let (digits, mark) = marker.split_at(marker.len() - 1);
            format!("{}{digits}\\{mark}", &caps[1])
        })
        .into_owned()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if ESCAPED.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Length of the longest run of `c` in `text`.
fn longest_run(text: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConvertOptions, markdown_to_document};
    use mdtree_ast::ParseOptions;
    use pretty_assertions::assert_eq;

    fn convert(markdown: &str) -> Vec<Node> {
        markdown_to_document(
            markdown,
            &ParseOptions::default(),
            &ConvertOptions::default(),
        )
    }

    fn assert_roundtrip(markdown: &str) {
        let doc = convert(markdown);
        let written = to_markdown(&doc);
        assert_eq!(convert(&written), doc, "written as {written:?}");
    }

    #[test]
    fn test_heading_and_marks() {
        let markdown = "# Title\n\n**bold** and *italic* text.\n";
        assert_eq!(to_markdown(&convert(markdown)), markdown);
        assert_roundtrip(markdown);
    }

    #[test]
    fn test_roundtrip_paragraphs() {
        assert_roundtrip("First paragraph.\n\nSecond one, with a star: a*b.\n");
        assert_roundtrip("## Sub\n\n### Deeper\n\nText\n");
    }

    #[test]
    fn test_roundtrip_escaped_block_markers() {
        for markdown in [
            "1\\. not a list\n",
            "2\\) nor this\n",
            "\\- dash\n",
            "\\+ plus\n",
            "a\n\\===\n",
            "a\n\\- b\n",
            "\\&copy; x\n",
        ] {
            assert_roundtrip(markdown);
            let doc = convert(markdown);
            assert!(
                matches!(&doc[..], [Node::Element(Element { kind: ElementKind::Paragraph, .. })]),
                "{markdown:?} read as {doc:?}"
            );
        }
        assert_eq!(
            to_markdown(&[Node::from(Element::paragraph(vec![Node::leaf("1. x\n- y")]))]),
            "1\\. x\n\\- y\n"
        );
    }

    #[test]
    fn test_roundtrip_bang_before_link() {
        let markdown = "Wow\\![docs](https://x.test)\n";
        assert_eq!(to_markdown(&convert(markdown)), markdown);
        assert_roundtrip(markdown);
        assert_eq!(
            convert(markdown),
            vec![Node::from(Element::paragraph(vec![
                Node::leaf("Wow!"),
                Node::from(Leaf {
                    url: Some("https://x.test".to_owned()),
                    ..Leaf::new("docs")
                }),
            ]))]
        );
    }

    #[test]
    fn test_roundtrip_other_marks() {
        assert_roundtrip("~~gone~~ `code` and [link](https://x.test/a%20b)\n");
        assert_roundtrip("***both*** and `` a`b ``\n");
    }

    #[test]
    fn test_roundtrip_table() {
        let markdown = "| a | b |\n| :--- | ---: |\n| 1 |  |\n";
        assert_eq!(to_markdown(&convert(markdown)), markdown);
        assert_roundtrip("|a|b|\n|---|---|\n|1|\n");
    }

    #[test]
    fn test_roundtrip_blank_lines() {
        let doc = convert("Hello\n\n\n\n\n\n\nWorld\n");
        assert_eq!(to_markdown(&doc), "Hello\n\n\n\n\n\nWorld\n");
        assert_eq!(convert(&to_markdown(&doc)), doc);
    }

    #[test]
    fn test_roundtrip_lists() {
        assert_roundtrip("- [x] done\n- [ ] todo\n");
        assert_roundtrip("3. three\n4. four\n");
    }

    #[test]
    fn test_code_fence_longer_than_content() {
        let doc = vec![Node::from(Element::void(ElementKind::Code {
            language: "md".to_owned(),
            code: "```\nx\n```".to_owned(),
            render: false,
            frontmatter: false,
            katex: false,
        }))];
        assert_eq!(to_markdown(&doc), "````md\n```\nx\n```\n````\n");
        assert_eq!(convert(&to_markdown(&doc)), doc);
    }

    #[test]
    fn test_media() {
        let plain = Element::void(ElementKind::Media {
            url: "a b.png".to_owned(),
            align: None,
            height: None,
            id: Some("x1".to_owned()),
        });
        assert_eq!(to_markdown(&[plain.into()]), "![id:x1](a%20b.png)\n");

        let sized = Element::void(ElementKind::Media {
            url: "a.png".to_owned(),
            align: Some("center".to_owned()),
            height: Some(200),
            id: None,
        });
        let doc = vec![Node::from(sized)];
        assert_eq!(
            to_markdown(&doc),
            "<img src=\"a.png\" height=\"200\" data-align=\"center\"/>\n"
        );
        assert_eq!(convert(&to_markdown(&doc)), doc);
    }

    #[test]
    fn test_blockquote() {
        assert_roundtrip("> quoted\n>\n> twice\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(to_markdown(&convert("")), "");
    }
}
