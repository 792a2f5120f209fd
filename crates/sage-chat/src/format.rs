//! Markdown-subset response formatter.
//!
//! Converts the semi-structured text coming back from the backend (or the
//! canned response bank) into a structured [`Document`] tree the rendering
//! layer walks. Formatting is a deterministic pure function; the same input
//! always yields the same tree. Precedence: fenced code blocks are lifted
//! out first and kept verbatim, then lists and paragraphs, then inline
//! spans with `**bold**` consumed before `*italic*`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// =============================================================================
// Document tree
// =============================================================================

/// Inline span inside a paragraph or list item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    LineBreak,
}

/// Block-level element of a formatted reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph(Vec<Inline>),
    CodeBlock(String),
    BulletList(Vec<Vec<Inline>>),
    NumberedList(Vec<Vec<Inline>>),
}

/// Structured form of one reply, ready for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

// =============================================================================
// Line classification
// =============================================================================

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("Invalid bullet regex"));

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("Invalid numbered-list regex"));

static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```").expect("Invalid fence regex"));

// =============================================================================
// Formatting
// =============================================================================

/// Format a raw reply into a [`Document`]. Pure and deterministic.
pub fn format(raw: &str) -> Document {
    let lines: Vec<&str> = raw.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    let flush_paragraph = |paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>| {
        if paragraph.is_empty() {
            return;
        }
        let mut inlines = Vec::new();
        for (idx, line) in paragraph.iter().enumerate() {
            if idx > 0 {
                inlines.push(Inline::LineBreak);
            }
            inlines.extend(parse_inline(line));
        }
        blocks.push(Block::Paragraph(inlines));
        paragraph.clear();
    };

    while i < lines.len() {
        let line = lines[i];

        // Fenced code block: everything up to the closing fence, verbatim.
        if FENCE_LINE.is_match(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut body = Vec::new();
            i += 1;
            while i < lines.len() && !FENCE_LINE.is_match(lines[i]) {
                body.push(lines[i]);
                i += 1;
            }
            // Skip the closing fence if present; an unterminated fence
            // consumes the rest of the input.
            if i < lines.len() {
                i += 1;
            }
            blocks.push(Block::CodeBlock(body.join("\n")));
            continue;
        }

        // Contiguous bullet lines fold into a single list.
        if BULLET_LINE.is_match(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut items = Vec::new();
            while i < lines.len() {
                match BULLET_LINE.captures(lines[i]) {
                    Some(caps) => {
                        items.push(parse_inline(caps.get(1).map_or("", |m| m.as_str())));
                        i += 1;
                    }
                    None => break,
                }
            }
            blocks.push(Block::BulletList(items));
            continue;
        }

        // Contiguous "N." lines fold into a single numbered list.
        if NUMBERED_LINE.is_match(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut items = Vec::new();
            while i < lines.len() {
                match NUMBERED_LINE.captures(lines[i]) {
                    Some(caps) => {
                        items.push(parse_inline(caps.get(1).map_or("", |m| m.as_str())));
                        i += 1;
                    }
                    None => break,
                }
            }
            blocks.push(Block::NumberedList(items));
            continue;
        }

        // Blank line splits paragraphs.
        if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            i += 1;
            continue;
        }

        paragraph.push(line);
        i += 1;
    }
    flush_paragraph(&mut paragraph, &mut blocks);

    Document { blocks }
}

/// Parse one line into inline spans.
///
/// `**bold**` is consumed before `*italic*`; single backticks delimit
/// inline code. An unclosed marker falls through as literal text.
fn parse_inline(line: &str) -> Vec<Inline> {
    let chars: Vec<char> = line.chars().collect();
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    let flush = |text: &mut String, spans: &mut Vec<Inline>| {
        if !text.is_empty() {
            spans.push(Inline::Text(std::mem::take(text)));
        }
    };

    while i < chars.len() {
        if chars[i] == '*' && i + 1 < chars.len() && chars[i + 1] == '*' {
            if let Some(end) = find_marker(&chars, i + 2, &['*', '*']) {
                if end > i + 2 {
                    flush(&mut text, &mut spans);
                    spans.push(Inline::Bold(chars[i + 2..end].iter().collect()));
                    i = end + 2;
                    continue;
                }
            }
        } else if chars[i] == '*' {
            if let Some(end) = find_marker(&chars, i + 1, &['*']) {
                if end > i + 1 {
                    flush(&mut text, &mut spans);
                    spans.push(Inline::Italic(chars[i + 1..end].iter().collect()));
                    i = end + 1;
                    continue;
                }
            }
        } else if chars[i] == '`' {
            if let Some(end) = find_marker(&chars, i + 1, &['`']) {
                if end > i + 1 {
                    flush(&mut text, &mut spans);
                    spans.push(Inline::Code(chars[i + 1..end].iter().collect()));
                    i = end + 1;
                    continue;
                }
            }
        }
        text.push(chars[i]);
        i += 1;
    }
    flush(&mut text, &mut spans);
    spans
}

/// Find the start index of the next occurrence of `marker` at or after `from`.
fn find_marker(chars: &[char], from: usize, marker: &[char]) -> Option<usize> {
    if marker.len() > chars.len() {
        return None;
    }
    (from..=chars.len().saturating_sub(marker.len()))
        .find(|&i| chars[i..i + marker.len()] == *marker)
}

// =============================================================================
// Rendering
// =============================================================================

impl Document {
    /// Render the document as display HTML.
    ///
    /// All text content is escaped here; markup structure comes only from
    /// the tree, so backend text can never smuggle tags into the output.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(inlines) => {
                    html.push_str("<p>");
                    render_inlines(inlines, &mut html);
                    html.push_str("</p>");
                }
                Block::CodeBlock(body) => {
                    html.push_str("<pre><code>");
                    html.push_str(&escape(body));
                    html.push_str("</code></pre>");
                }
                Block::BulletList(items) => {
                    html.push_str("<ul>");
                    for item in items {
                        html.push_str("<li>");
                        render_inlines(item, &mut html);
                        html.push_str("</li>");
                    }
                    html.push_str("</ul>");
                }
                Block::NumberedList(items) => {
                    html.push_str("<ol>");
                    for item in items {
                        html.push_str("<li>");
                        render_inlines(item, &mut html);
                        html.push_str("</li>");
                    }
                    html.push_str("</ol>");
                }
            }
        }
        html
    }

    /// Flatten the document to plain text (markers and markup stripped).
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (idx, block) in self.blocks.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            match block {
                Block::Paragraph(inlines) => push_plain(inlines, &mut out),
                Block::CodeBlock(body) => out.push_str(body),
                Block::BulletList(items) | Block::NumberedList(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push('\n');
                        }
                        push_plain(item, &mut out);
                    }
                }
            }
        }
        out
    }
}

fn render_inlines(inlines: &[Inline], html: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) => html.push_str(&escape(t)),
            Inline::Bold(t) => {
                html.push_str("<strong>");
                html.push_str(&escape(t));
                html.push_str("</strong>");
            }
            Inline::Italic(t) => {
                html.push_str("<em>");
                html.push_str(&escape(t));
                html.push_str("</em>");
            }
            Inline::Code(t) => {
                html.push_str("<code>");
                html.push_str(&escape(t));
                html.push_str("</code>");
            }
            Inline::LineBreak => html.push_str("<br>"),
        }
    }
}

fn push_plain(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Bold(t) | Inline::Italic(t) | Inline::Code(t) => {
                out.push_str(t)
            }
            Inline::LineBreak => out.push('\n'),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// =============================================================================
// Truncation
// =============================================================================

/// Truncate plain text to a display budget, on a character boundary, with
/// a trailing ellipsis marking the cut.
///
/// Returns `None` when the text already fits; the caller keeps the full
/// text and toggles between the two views.
pub fn truncate_plain(text: &str, max_chars: usize) -> Option<String> {
    let mut indices = text.char_indices();
    indices.nth(max_chars).map(|(byte, _)| {
        let mut cut = text[..byte].to_string();
        cut.push_str("...");
        cut
    })
}

// =============================================================================
// Tests
// =============================================================================
