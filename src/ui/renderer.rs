use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::commands::all_commands;
use crate::core::app::{App, Overlay, SendPhase};
use crate::core::constants::{
    ASSISTANT_NAME, CLEAR_CONFIRMATION, DISCLAIMER, SUGGESTIONS, WELCOME_HEADLINE,
};
use crate::ui::transcript::{build_transcript_lines, format_size, TranscriptOptions};

const MAX_INPUT_LINES: u16 = 6;

const KEY_HELP: &[(&str, &str)] = &[
    ("Enter", "send"),
    ("Alt+Enter", "new line"),
    ("Up/Down, PgUp/PgDn", "scroll"),
    ("Tab", "try a suggestion (empty chat)"),
    ("Ctrl+L", "new chat"),
    ("Esc", "close / dismiss"),
    ("Ctrl+C", "quit"),
];

pub fn max_scroll(total_lines: usize, visible_height: u16) -> u16 {
    let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
    total.saturating_sub(visible_height)
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let has_chips = !app.ui.composer.attachments().is_empty();
    let input_lines = (app.ui.composer.line_count() as u16).clamp(1, MAX_INPUT_LINES);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(u16::from(has_chips)),
            Constraint::Length(input_lines + 2), // +2 for borders
            Constraint::Length(1),
        ])
        .split(f.area());

    render_title(f, app, chunks[0]);
    if app.store.is_empty() {
        app.ui.reset_scroll();
        render_welcome(f, app, chunks[1]);
    } else {
        render_transcript(f, app, chunks[1]);
    }
    if has_chips {
        render_chips(f, app, chunks[2]);
    }
    render_input(f, app, chunks[3]);
    render_status(f, app, chunks[4]);

    match app.ui.overlay {
        Some(Overlay::ConfirmClear) => render_confirm_clear(f, app),
        Some(Overlay::Help) => render_help(f, app),
        None => {}
    }
}

fn render_title(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let state = match app.phase() {
        SendPhase::Idle => None,
        SendPhase::AwaitingFirstFragment => Some("thinking…"),
        SendPhase::Streaming => Some("replying…"),
    };
    let mut spans = vec![
        Span::styled(ASSISTANT_NAME, theme.title_style),
        Span::styled(format!(" · {}", app.model()), theme.status_style),
    ];
    if let Some(state) = state {
        spans.push(Span::styled(format!(" · {state}"), theme.thinking_style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_welcome(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(WELCOME_HEADLINE, theme.welcome_headline_style)),
        Line::from(""),
    ];
    for (icon, prompt) in SUGGESTIONS {
        lines.push(Line::from(Span::styled(
            format!("{icon}  {prompt}"),
            theme.suggestion_style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Tab to try a suggestion",
        theme.hint_style,
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_transcript(f: &mut Frame, app: &mut App, area: Rect) {
    let pulse_frame = app.ui.pulse_frame(Instant::now());
    let lines = build_transcript_lines(
        app.store.messages(),
        &app.ui.theme,
        &TranscriptOptions {
            markdown: app.ui.markdown_enabled,
            syntax_highlighting: app.ui.syntax_enabled,
            width: area.width,
            thinking_id: app.stream.awaiting_placeholder_id(),
            pulse_frame,
        },
    );

    app.ui.set_max_scroll(max_scroll(lines.len(), area.height));
    let paragraph = Paragraph::new(lines).scroll((app.ui.scroll_offset(), 0));
    f.render_widget(paragraph, area);
}

fn render_chips(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let mut spans = Vec::new();
    for (index, attachment) in app.ui.composer.attachments().iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("▣ image {} · {}", index + 1, format_size(attachment.byte_len())),
            theme.attachment_chip_style,
        ));
    }
    spans.push(Span::styled("  (/detach to remove)", theme.hint_style));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(f: &mut Frame, app: &mut App, area: Rect) {
    let (title, border_style) = if app.is_busy() {
        (
            format!(" Waiting for {ASSISTANT_NAME}… (commands still work) "),
            app.ui.theme.input_border_busy_style,
        )
    } else {
        (
            " Message (Enter to send, Alt+Enter for new line, /help) ".to_string(),
            app.ui.theme.input_border_style,
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, app.ui.theme.input_title_style));

    let textarea = app.ui.composer.textarea_mut();
    textarea.set_block(block);
    f.render_widget(&*textarea, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let line = match app.ui.status() {
        Some(status) => Line::from(Span::styled(status.to_string(), theme.status_style)),
        None => Line::from(Span::styled(DISCLAIMER, theme.hint_style)),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn overlay_block(title: &str, style: Style) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn render_confirm_clear(f: &mut Frame, app: &App) {
    let theme = &app.ui.theme;
    let area = centered_rect(56, 6, f.area());
    let lines = vec![
        Line::from(CLEAR_CONFIRMATION),
        Line::from(""),
        Line::from(Span::styled("[y] yes    [n] no", theme.hint_style)),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(overlay_block(" New chat ", theme.overlay_border_style));
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn render_help(f: &mut Frame, app: &App) {
    let theme = &app.ui.theme;
    let mut lines = vec![Line::from(Span::styled("Commands", theme.title_style))];
    for command in all_commands() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<20}", command.usage), theme.md_inline_code_style),
            Span::raw(command.help),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Keys", theme.title_style)));
    for (keys, action) in KEY_HELP {
        lines.push(Line::from(vec![
            Span::styled(format!("  {keys:<20}"), theme.md_inline_code_style),
            Span::raw(*action),
        ]));
    }

    let height = lines.len() as u16 + 2;
    let area = centered_rect(72, height, f.area());
    let paragraph = Paragraph::new(lines)
        .block(overlay_block(" Help (Esc to close) ", theme.overlay_border_style));
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use crate::utils::test_utils::create_test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn max_scroll_is_overflow_past_the_viewport() {
        assert_eq!(max_scroll(5, 10), 0);
        assert_eq!(max_scroll(25, 10), 15);
    }

    #[test]
    fn empty_conversation_shows_welcome_and_disclaimer() {
        let mut app = create_test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains(WELCOME_HEADLINE));
        assert!(text.contains("Press Tab to try a suggestion"));
        assert!(text.contains(DISCLAIMER));
    }

    #[test]
    fn long_transcript_scrolls_to_the_latest_line() {
        let mut app = create_test_app();
        for i in 0..30 {
            let id = app.store.next_id(0);
            app.store
                .append(Message::user(id, format!("message number {i}"), 0, Vec::new()))
                .unwrap();
        }

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        assert!(app.ui.scroll_offset() > 0);
        let text = screen_text(&terminal);
        assert!(text.contains("message number 29"));
        assert!(!text.contains("message number 0 "));
    }

    #[test]
    fn confirm_overlay_draws_the_question() {
        let mut app = create_test_app();
        app.ui.overlay = Some(Overlay::ConfirmClear);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        assert!(screen_text(&terminal).contains("[y] yes"));
    }
}
