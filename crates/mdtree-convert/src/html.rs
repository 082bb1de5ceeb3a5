//! Raw HTML recognition.
//!
//! Markdown sources written by the editor embed a small HTML vocabulary:
//! media tags (`img`, `video`, `iframe`), download links, and inline
//! formatting tags (`b`, `i`, `del`, `code`, `span`, `a`). Inline tags arrive
//! from the parser as separate fragments, so opening tags are pushed on a
//! [`TagStack`] and applied to the text nodes that follow.

use std::sync::LazyLock;

use mdtree_doc::{Element, ElementKind, Leaf, Node};
use regex::Regex;

use crate::util::decode_url;

/// A whole fragment consisting of one media tag, optionally closed.
static MEDIA_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<(img|video|iframe)[^>]*/?>(.*</(?:img|video|iframe)>:?)?\s*$")
        .expect("invalid media tag regex")
});
static MEDIA_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="([^"\n]+)""#).expect("invalid src regex"));
static MEDIA_HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"height="(\d+)""#).expect("invalid height regex"));
static MEDIA_ALIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-align="(\w+)""#).expect("invalid align regex"));
static MEDIA_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"alt="id:([\w.]+)""#).expect("invalid media id regex"));

static ATTACHMENT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<a[^>]*download[^>\n]*/?>(.*</a>:?)?\s*$")
        .expect("invalid attachment regex")
});
static ATTACHMENT_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"\n]+)""#).expect("invalid href regex"));
static ATTACHMENT_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-size="(\d+)""#).expect("invalid size regex"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<br\s*/?>\s*$").expect("invalid line break regex"));
static FORMAT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/)?(b|i|del|code|span|a)(\s+[^\n>]+)?>").expect("invalid format tag regex")
});
static STYLE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="([^"\n]+)""#).expect("invalid style regex"));
static LINK_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([\w:./_\-#\\]+)""#).expect("invalid href regex"));

/// Attributes of a recognized media tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaTag {
    /// `img`, `video` or `iframe`.
    pub tag: String,
    pub url: Option<String>,
    pub height: Option<u32>,
    /// Value of `data-align`.
    pub align: Option<String>,
    /// Identifier from an `alt="id:..."` attribute.
    pub id: Option<String>,
}

impl MediaTag {
    /// Media element for this tag.
    pub(crate) fn into_element(self, decode_urls: bool) -> Element {
        let url = self
            .url
            .map(|url| decode_url(&url, decode_urls))
            .unwrap_or_default();
        Element::void(ElementKind::Media {
            url,
            align: self.align,
            height: self.height,
            id: self.id,
        })
    }
}

/// Recognize a fragment that is exactly one media tag.
///
/// A `height` that does not fit in `u32` is treated as absent.
pub fn find_media(html: &str) -> Option<MediaTag> {
    let caps = MEDIA_TAG.captures(html)?;
    Some(MediaTag {
        tag: caps[1].to_owned(),
        url: first_capture(&MEDIA_SRC, html),
        height: first_capture(&MEDIA_HEIGHT, html).and_then(|h| h.parse().ok()),
        align: first_capture(&MEDIA_ALIGN, html),
        id: first_capture(&MEDIA_ID, html),
    })
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html).map(|c| c[1].to_owned())
}

/// A download link (`<a download ...>`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachment {
    pub url: Option<String>,
    /// Value of `data-size` in bytes, 0 when absent.
    pub size: u64,
}

/// Recognize a fragment that is exactly one download link.
///
/// Not used by the converter: download links are left to the general HTML
/// handling.
pub fn find_attachment(html: &str) -> Option<Attachment> {
    if !ATTACHMENT_TAG.is_match(html) {
        return None;
    }
    Some(Attachment {
        url: first_capture(&ATTACHMENT_HREF, html),
        size: ATTACHMENT_SIZE
            .captures(html)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(0),
    })
}

/// Attribute value the converter refuses to interpret.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AttributeError {
    #[error("malformed style declaration: {0}")]
    Style(String),
    #[error("unsupported link target: {0}")]
    Href(String),
}

/// Inline formatting tag names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormatTag {
    Bold,
    Italic,
    Delete,
    Code,
    Span,
    Anchor,
}

impl FormatTag {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "b" => Self::Bold,
            "i" => Self::Italic,
            "del" => Self::Delete,
            "code" => Self::Code,
            "span" => Self::Span,
            "a" => Self::Anchor,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OpenTag {
    tag: FormatTag,
    color: Option<String>,
    url: Option<String>,
}

impl OpenTag {
    fn bare(tag: FormatTag) -> Self {
        Self {
            tag,
            color: None,
            url: None,
        }
    }
}

/// Inline tags opened and not yet closed within one sibling sequence.
#[derive(Debug, Default)]
pub(crate) struct TagStack {
    open: Vec<OpenTag>,
}

impl TagStack {
    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Pop the innermost tag if it matches; stray closing tags are ignored.
    fn close(&mut self, tag: FormatTag) {
        if self.open.last().is_some_and(|open| open.tag == tag) {
            self.open.pop();
        } else {
            tracing::trace!(?tag, "Ignoring closing tag that does not match the innermost open tag");
        }
    }

    /// Leaf for `text` carrying the formatting of every open tag.
    ///
    /// Empty text gets no formatting. The innermost `span` color and `a`
    /// target win.
    pub(crate) fn leaf(&self, text: &str) -> Leaf {
        let mut leaf = Leaf::new(text);
        if text.is_empty() {
            return leaf;
        }
        for open in &self.open {
            match open.tag {
                FormatTag::Bold => leaf.bold = true,
                FormatTag::Italic => leaf.italic = true,
                FormatTag::Delete => leaf.strikethrough = true,
                FormatTag::Code => leaf.code = true,
                FormatTag::Span => {
                    if let Some(color) = &open.color {
                        leaf.high_color = Some(color.clone());
                    }
                }
                FormatTag::Anchor => {
                    if let Some(url) = &open.url {
                        leaf.url = Some(url.clone());
                    }
                }
            }
        }
        leaf
    }
}

/// Split a `style` attribute into trimmed `(property, value)` pairs.
fn parse_style(style: &str) -> Result<Vec<(&str, &str)>, AttributeError> {
    style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .map(|decl| {
            decl.split_once(':')
                .map(|(property, value)| (property.trim(), value.trim()))
                .ok_or_else(|| AttributeError::Style(decl.to_owned()))
        })
        .collect()
}

/// Tag to push for an opening formatting tag, if any.
///
/// A `span` without a color and an `a` without an `href` push nothing.
fn open_tag(tag: FormatTag, attrs: &str) -> Result<Option<OpenTag>, AttributeError> {
    match tag {
        FormatTag::Span => {
            let Some(style) = STYLE_ATTR.captures(attrs) else {
                return Ok(None);
            };
            let color = parse_style(&style[1])?
                .into_iter()
                .find(|(property, value)| *property == "color" && !value.is_empty())
                .map(|(_, value)| value.to_owned());
            Ok(color.map(|color| OpenTag {
                color: Some(color),
                ..OpenTag::bare(tag)
            }))
        }
        FormatTag::Anchor => {
            if let Some(href) = LINK_HREF.captures(attrs) {
                Ok(Some(OpenTag {
                    url: Some(href[1].to_owned()),
                    ..OpenTag::bare(tag)
                }))
            } else if attrs.contains("href=") {
                Err(AttributeError::Href(attrs.trim().to_owned()))
            } else {
                Ok(None)
            }
        }
        _ => Ok(Some(OpenTag::bare(tag))),
    }
}

/// Interpret an HTML fragment found among phrasing content.
///
/// Formatting tags update `tags` and produce nothing themselves.
pub(crate) fn inline_html(value: &str, tags: &mut TagStack, decode_urls: bool) -> Vec<Node> {
    if LINE_BREAK.is_match(value) {
        return vec![Element::void(ElementKind::Break).into()];
    }
    if let Some(caps) = FORMAT_TAG.captures(value)
        && let Some(tag) = FormatTag::from_name(&caps[2])
    {
        if caps.get(1).is_some() {
            tags.close(tag);
            return Vec::new();
        }
        let attrs = caps.get(3).map_or("", |m| m.as_str());
        match open_tag(tag, attrs) {
            Ok(Some(open)) => tags.open.push(open),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Failed to interpret inline tag, keeping it as text");
                return vec![Node::leaf(value)];
            }
        }
        return Vec::new();
    }
    if let Some(media) = find_media(value) {
        return vec![media.into_element(decode_urls).into()];
    }
    vec![Node::leaf(value)]
}

/// Interpret an HTML fragment standing as a block.
pub(crate) fn block_html(value: &str, decode_urls: bool) -> Node {
    if let Some(media) = find_media(value) {
        return media.into_element(decode_urls).into();
    }
    if LINE_BREAK.is_match(value) {
        return Element::empty_paragraph().into();
    }
    Element::void(ElementKind::Code {
        language: "html".to_owned(),
        code: value.to_owned(),
        render: true,
        frontmatter: false,
        katex: false,
    })
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_media_img_attributes() {
        let media = find_media(
            r#"<img src="a%20b.png" alt="id:img.1" height="120" data-align="center"/>"#,
        )
        .unwrap();
        assert_eq!(
            media,
            MediaTag {
                tag: "img".to_owned(),
                url: Some("a%20b.png".to_owned()),
                height: Some(120),
                align: Some("center".to_owned()),
                id: Some("img.1".to_owned()),
            }
        );
    }

    #[test]
    fn test_find_media_video_with_closing_tag() {
        let media = find_media(r#"<video src="clip.mp4"></video>"#).unwrap();
        assert_eq!(media.tag, "video");
        assert_eq!(media.url.as_deref(), Some("clip.mp4"));
        assert_eq!(media.height, None);
    }

    #[test]
    fn test_find_media_rejects_surrounding_text() {
        assert!(find_media(r#"see <img src="a.png"/> here"#).is_none());
        assert!(find_media("<div>x</div>").is_none());
    }

    #[test]
    fn test_find_media_height_overflow_is_absent() {
        let media = find_media(r#"<img src="a.png" height="99999999999"/>"#).unwrap();
        assert_eq!(media.height, None);
    }

    #[test]
    fn test_find_attachment() {
        let attachment =
            find_attachment(r#"<a href="files/report.pdf" download data-size="2048">report</a>"#)
                .unwrap();
        assert_eq!(attachment.url.as_deref(), Some("files/report.pdf"));
        assert_eq!(attachment.size, 2048);

        let unsized_link = find_attachment(r#"<a href="x.zip" download>x</a>"#).unwrap();
        assert_eq!(unsized_link.size, 0);

        assert!(find_attachment(r#"<a href="x.zip">x</a>"#).is_none());
    }

    #[test]
    fn test_inline_break() {
        let mut tags = TagStack::default();
        assert_eq!(
            inline_html("<br>", &mut tags, true),
            vec![Node::from(Element::void(ElementKind::Break))]
        );
        assert_eq!(
            inline_html("<br />", &mut tags, true),
            vec![Node::from(Element::void(ElementKind::Break))]
        );
    }

    #[test]
    fn test_nested_tags_apply_both_flags() {
        let mut tags = TagStack::default();
        assert!(inline_html("<b>", &mut tags, true).is_empty());
        assert!(inline_html("<i>", &mut tags, true).is_empty());
        let leaf = tags.leaf("word");
        assert!(leaf.bold);
        assert!(leaf.italic);
        inline_html("</i>", &mut tags, true);
        inline_html("</b>", &mut tags, true);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_mismatched_close_is_ignored() {
        let mut tags = TagStack::default();
        inline_html("<b>", &mut tags, true);
        inline_html("<i>", &mut tags, true);
        inline_html("</b>", &mut tags, true);
        let leaf = tags.leaf("y");
        assert!(leaf.bold);
        assert!(leaf.italic);
        inline_html("</i>", &mut tags, true);
        assert!(tags.leaf("z").bold);
        assert!(!tags.leaf("z").italic);
    }

    #[test]
    fn test_span_color() {
        let mut tags = TagStack::default();
        inline_html(
            r#"<span style="font-weight: 600; color: #ff0000">"#,
            &mut tags,
            true,
        );
        assert_eq!(tags.leaf("red").high_color.as_deref(), Some("#ff0000"));
        inline_html("</span>", &mut tags, true);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_span_without_color_pushes_nothing() {
        let mut tags = TagStack::default();
        inline_html(r#"<span style="font-size: 12px">"#, &mut tags, true);
        inline_html("<span>", &mut tags, true);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_malformed_style_degrades_to_text() {
        let mut tags = TagStack::default();
        let raw = r#"<span style="color red">"#;
        assert_eq!(inline_html(raw, &mut tags, true), vec![Node::leaf(raw)]);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_anchor_href() {
        let mut tags = TagStack::default();
        inline_html(r#"<a href="https://x.test/a_b#c">"#, &mut tags, true);
        assert_eq!(tags.leaf("go").url.as_deref(), Some("https://x.test/a_b#c"));
    }

    #[test]
    fn test_anchor_unsupported_href_degrades_to_text() {
        let mut tags = TagStack::default();
        let raw = r#"<a href="javascript:alert('x')">"#;
        assert_eq!(inline_html(raw, &mut tags, true), vec![Node::leaf(raw)]);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_empty_text_gets_no_formatting() {
        let mut tags = TagStack::default();
        inline_html("<b>", &mut tags, true);
        assert_eq!(tags.leaf(""), Leaf::empty());
    }

    #[test]
    fn test_unknown_inline_html_is_literal() {
        let mut tags = TagStack::default();
        assert_eq!(
            inline_html("<kbd>", &mut tags, true),
            vec![Node::leaf("<kbd>")]
        );
    }

    #[test]
    fn test_inline_media() {
        let mut tags = TagStack::default();
        assert_eq!(
            inline_html(r#"<img src="a%20b.png"/>"#, &mut tags, true),
            vec![Node::from(Element::void(ElementKind::media("a b.png")))]
        );
    }

    #[test]
    fn test_block_html() {
        assert_eq!(
            block_html(r#"<iframe src="https://x.test/embed" height="300"></iframe>"#, true),
            Node::from(Element::void(ElementKind::Media {
                url: "https://x.test/embed".to_owned(),
                align: None,
                height: Some(300),
                id: None,
            }))
        );
        assert_eq!(block_html("<br/>", true), Node::from(Element::empty_paragraph()));
        assert_eq!(
            block_html("<div>hi</div>", true),
            Node::from(Element::void(ElementKind::Code {
                language: "html".to_owned(),
                code: "<div>hi</div>".to_owned(),
                render: true,
                frontmatter: false,
                katex: false,
            }))
        );
    }
}
