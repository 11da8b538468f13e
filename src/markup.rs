//! Paragraph markup handled by the substitution passes.
//!
//! Documents arrive as flat `<p>` paragraphs with a handful of markers.
//! Nothing here builds a DOM: a tag is `<` up to the next `>` (or the end
//! of input when unterminated) and everything else is text content.

use lazy_static::lazy_static;
use regex::Regex;

/// Marker for an empty (spacing) paragraph.
pub const EMPTY_PARAGRAPH: &str = "<p>&nbsp;</p>";

/// Marker between pages of a multi-page source.
pub const PAGE_BREAK: &str = r#"<div class="page-break"></div>"#;

lazy_static! {
    // `>?` lets an unterminated tag run to end of input
    static ref TAG_PATTERN: Regex = Regex::new(r"<[^>]*>?").unwrap();
}

/// A piece of markup: either a tag span or a run of text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Tag(&'a str),
    Text(&'a str),
}

impl<'a> Segment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::Tag(s) | Segment::Text(s) => s,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }
}

/// Partition markup into alternating tag spans and text regions.
/// Concatenating the segments reproduces the input exactly.
pub fn segments(markup: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;

    for tag in TAG_PATTERN.find_iter(markup) {
        if tag.start() > last {
            out.push(Segment::Text(&markup[last..tag.start()]));
        }
        out.push(Segment::Tag(tag.as_str()));
        last = tag.end();
    }
    if last < markup.len() {
        out.push(Segment::Text(&markup[last..]));
    }

    out
}

/// Drop every tag span, keeping only text content.
pub fn strip_tags(markup: &str) -> String {
    segments(markup)
        .into_iter()
        .filter(Segment::is_text)
        .map(|s| s.as_str())
        .collect()
}

/// Paragraph texts for export, one per `<p>`, tags stripped and trimmed.
/// Spacing paragraphs and page breaks produce nothing.
pub fn export_paragraphs(markup: &str) -> Vec<String> {
    markup
        .split("<p")
        .enumerate()
        .map(|(idx, chunk)| {
            // every chunk after the first starts with the rest of its `<p ...>` tag
            let body = match idx {
                0 => chunk,
                _ => chunk.split_once('>').map_or("", |(_, rest)| rest),
            };
            strip_tags(body).replace("&nbsp;", " ").trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect()
}

/// Normalize plain text into paragraph markup.
///
/// Consecutive non-blank lines are trimmed and joined with single spaces
/// into one `<p>`; every blank line closes the open paragraph and adds an
/// [`EMPTY_PARAGRAPH`].
pub fn paragraphs_from_plain_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_paragraph = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if in_paragraph {
                out.push_str("</p>\n");
                in_paragraph = false;
            }
            out.push_str(EMPTY_PARAGRAPH);
            out.push('\n');
        } else {
            if in_paragraph {
                out.push(' ');
            } else {
                out.push_str("<p>");
                in_paragraph = true;
            }
            out.push_str(line);
        }
    }
    if in_paragraph {
        out.push_str("</p>\n");
    }

    out.trim().to_string()
}

/// Assemble paragraph markup from page texts.
///
/// Each page is split into paragraphs on blank-line separators (`"\n\n"`);
/// non-blank paragraphs are trimmed and wrapped in `<p>`, and a
/// [`PAGE_BREAK`] goes between consecutive pages.
pub fn paragraphs_from_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::new();

    for (idx, page) in pages.iter().enumerate() {
        for paragraph in page.as_ref().split("\n\n") {
            let paragraph = paragraph.trim();
            if !paragraph.is_empty() {
                out.push_str(&Alignment::Left.paragraph(paragraph));
                out.push('\n');
            }
        }
        if idx + 1 < pages.len() {
            out.push_str(PAGE_BREAK);
            out.push('\n');
        }
    }

    out.trim().to_string()
}

/// Paragraph alignment carried as a class on `<p>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS class for the alignment; left is the default and has none.
    pub fn class(&self) -> Option<&'static str> {
        match self {
            Alignment::Left => None,
            Alignment::Center => Some("text-center"),
            Alignment::Right => Some("text-right"),
        }
    }

    pub fn paragraph(&self, text: &str) -> String {
        match self.class() {
            Some(class) => format!(r#"<p class="{class}">{text}</p>"#),
            None => format!("<p>{text}</p>"),
        }
    }
}
