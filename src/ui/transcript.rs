//! Builds the pre-wrapped lines of the conversation view.

use chrono::{Local, TimeZone};
use ratatui::text::{Line, Span};

use crate::core::attachment::encoded_byte_len;
use crate::core::constants::{ASSISTANT_NAME, BUBBLE_INDENT};
use crate::core::message::Message;
use crate::ui::markdown::{render_markdown, MarkdownOptions};
use crate::ui::theme::Theme;
use crate::utils::wrap::wrap_indented;

const THINKING_FRAMES: [&str; 4] = ["●○○", "○●○", "○○●", "○●○"];

#[derive(Debug, Clone, Copy)]
pub struct TranscriptOptions<'a> {
    pub markdown: bool,
    pub syntax_highlighting: bool,
    pub width: u16,
    /// Placeholder that is still waiting for its first fragment.
    pub thinking_id: Option<&'a str>,
    pub pulse_frame: usize,
}

pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < KB * KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{:.1} MB", value / (KB * KB))
    }
}

/// Local wall-clock time of an epoch-millisecond timestamp as `HH:MM`.
pub fn format_clock(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_default()
}

pub fn thinking_indicator(frame: usize) -> &'static str {
    THINKING_FRAMES[frame % THINKING_FRAMES.len()]
}

fn header_line(message: &Message, theme: &Theme) -> Line<'static> {
    let (label, style) = if message.is_user() {
        ("You".to_string(), theme.user_label_style)
    } else if message.is_error {
        (format!("⚠ {ASSISTANT_NAME}"), theme.error_label_style)
    } else {
        (ASSISTANT_NAME.to_string(), theme.model_label_style)
    };

    let mut spans = vec![Span::styled(label, style)];
    let clock = format_clock(message.timestamp);
    if !clock.is_empty() {
        spans.push(Span::styled(format!(" · {clock}"), theme.timestamp_style));
    }
    Line::from(spans)
}

fn literal_lines(text: &str, style: ratatui::style::Style) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| Line::from(Span::styled(line.replace('\t', "    "), style)))
        .collect()
}

fn body_lines(message: &Message, theme: &Theme, options: &TranscriptOptions<'_>) -> Vec<Line<'static>> {
    if message.is_user() {
        return literal_lines(&message.text, theme.user_text_style);
    }
    if message.is_error {
        return literal_lines(&message.text, theme.error_text_style);
    }
    if message.text.is_empty() {
        let line = if options.thinking_id == Some(message.id.as_str()) {
            Line::from(vec![
                Span::styled(thinking_indicator(options.pulse_frame), theme.thinking_style),
                Span::styled(" thinking", theme.thinking_style),
            ])
        } else {
            Line::from(Span::styled("(no reply)", theme.empty_reply_style))
        };
        return vec![line];
    }
    if options.markdown {
        let inner_width = options.width.saturating_sub(BUBBLE_INDENT) as usize;
        render_markdown(
            &message.text,
            theme,
            MarkdownOptions {
                syntax_highlighting: options.syntax_highlighting,
                width: inner_width,
            },
        )
    } else {
        literal_lines(&message.text, theme.model_text_style)
    }
}

fn attachment_lines(message: &Message, theme: &Theme) -> Vec<Line<'static>> {
    message
        .images
        .iter()
        .enumerate()
        .map(|(index, data)| {
            Line::from(Span::styled(
                format!("▣ image {} · {}", index + 1, format_size(encoded_byte_len(data))),
                theme.attachment_chip_style,
            ))
        })
        .collect()
}

/// One header line per message, then its image chips and its body, indented
/// and wrapped to `options.width`. Messages are separated by a blank line.
pub fn build_transcript_lines(
    messages: &[Message],
    theme: &Theme,
    options: &TranscriptOptions<'_>,
) -> Vec<Line<'static>> {
    let width = options.width as usize;
    let indent = BUBBLE_INDENT as usize;
    let mut lines = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        if index > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(wrap_indented(vec![header_line(message, theme)], width, 0));

        let mut body = attachment_lines(message, theme);
        let has_images = !body.is_empty();
        let text_lines = if message.is_user() && message.text.is_empty() && has_images {
            Vec::new()
        } else {
            body_lines(message, theme, options)
        };
        body.extend(text_lines);
        lines.extend(wrap_indented(body, width, indent));
    }

    lines
}
