//! Styled word wrapping. Transcript lines are wrapped before they reach the
//! `Paragraph`, so the line count used for scrolling matches what is drawn.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Splits `text` into alternating runs of whitespace and non-whitespace.
fn tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                out.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

struct LineBuilder {
    style: Style,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    width: usize,
}

impl LineBuilder {
    fn push(&mut self, text: &str, style: Style, width: usize) {
        if let Some(last) = self.spans.last_mut() {
            if last.style == style {
                last.content.to_mut().push_str(text);
                self.width += width;
                return;
            }
        }
        self.spans.push(Span::styled(text.to_string(), style));
        self.width += width;
    }

    fn break_line(&mut self) {
        let spans = std::mem::take(&mut self.spans);
        self.lines.push(Line::from(spans).style(self.style));
        self.width = 0;
    }
}

/// Wraps one styled line to `width` columns. Words move to the next line
/// when they do not fit; words wider than a full line are split by
/// character. Span styles are kept.
pub fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line];
    }

    let mut builder = LineBuilder {
        style: line.style,
        lines: Vec::new(),
        spans: Vec::new(),
        width: 0,
    };

    for span in &line.spans {
        for token in tokens(&span.content) {
            let token_width = token.width();
            if builder.width + token_width <= width {
                builder.push(token, span.style, token_width);
                continue;
            }

            if token.chars().all(char::is_whitespace) {
                builder.break_line();
                continue;
            }

            if token_width <= width {
                builder.break_line();
                builder.push(token, span.style, token_width);
                continue;
            }

            for ch in token.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if builder.width + ch_width > width && builder.width > 0 {
                    builder.break_line();
                }
                let mut buf = [0u8; 4];
                builder.push(ch.encode_utf8(&mut buf), span.style, ch_width);
            }
        }
    }

    if !builder.spans.is_empty() || builder.lines.is_empty() {
        builder.break_line();
    }
    builder.lines
}

pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

/// Wraps `lines` to `width - indent` columns and prefixes each result with
/// `indent` spaces.
pub fn wrap_indented(lines: Vec<Line<'static>>, width: usize, indent: usize) -> Vec<Line<'static>> {
    let inner = width.saturating_sub(indent).max(1);
    let pad = " ".repeat(indent);
    wrap_lines(lines, inner)
        .into_iter()
        .map(|mut line| {
            if indent > 0 {
                line.spans.insert(0, Span::raw(pad.clone()));
            }
            line
        })
        .collect()
}
