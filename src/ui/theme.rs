use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,

    // Transcript
    pub user_label_style: Style,
    pub user_text_style: Style,
    pub model_label_style: Style,
    pub model_text_style: Style,
    pub timestamp_style: Style,
    pub error_label_style: Style,
    pub error_text_style: Style,
    pub attachment_chip_style: Style,
    pub thinking_style: Style,
    pub empty_reply_style: Style,

    // Chrome
    pub title_style: Style,
    pub status_style: Style,
    pub hint_style: Style,
    pub welcome_headline_style: Style,
    pub suggestion_style: Style,
    pub overlay_border_style: Style,

    // Input area
    pub input_border_style: Style,
    pub input_border_busy_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub input_placeholder_style: Style,

    // Markdown
    pub md_heading_color: Color,
    pub md_inline_code_style: Style,
    pub md_codeblock_text_style: Style,
    pub md_codeblock_bg: Option<Color>,
    pub md_code_label_style: Style,
    pub md_blockquote_style: Style,
    pub md_list_marker_style: Style,
    pub md_link_style: Style,
    pub md_link_url_style: Style,
    pub md_rule_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        let accent = Color::Rgb(96, 165, 250);
        let muted = Color::Rgb(148, 163, 184);
        let faint = Color::Rgb(100, 116, 139);
        let text = Color::Rgb(226, 232, 240);
        let code_bg = Color::Rgb(30, 41, 59);

        Theme {
            background_color: Color::Rgb(15, 23, 42),

            user_label_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(191, 219, 254)),
            model_label_style: Style::default()
                .fg(Color::Rgb(52, 211, 153))
                .add_modifier(Modifier::BOLD),
            model_text_style: Style::default().fg(text),
            timestamp_style: Style::default().fg(faint),
            error_label_style: Style::default()
                .fg(Color::Rgb(248, 113, 113))
                .add_modifier(Modifier::BOLD),
            error_text_style: Style::default().fg(Color::Rgb(252, 165, 165)),
            attachment_chip_style: Style::default().fg(Color::Rgb(196, 181, 253)),
            thinking_style: Style::default().fg(muted),
            empty_reply_style: Style::default().fg(faint).add_modifier(Modifier::ITALIC),

            title_style: Style::default().fg(text).add_modifier(Modifier::BOLD),
            status_style: Style::default().fg(Color::Rgb(250, 204, 21)),
            hint_style: Style::default().fg(faint),
            welcome_headline_style: Style::default().fg(text).add_modifier(Modifier::BOLD),
            suggestion_style: Style::default().fg(muted),
            overlay_border_style: Style::default().fg(accent),

            input_border_style: Style::default().fg(muted),
            input_border_busy_style: Style::default().fg(faint),
            input_title_style: Style::default().fg(muted),
            input_text_style: Style::default().fg(text),
            input_placeholder_style: Style::default().fg(faint),

            md_heading_color: Color::Rgb(125, 211, 252),
            md_inline_code_style: Style::default().fg(Color::Rgb(251, 191, 36)).bg(code_bg),
            md_codeblock_text_style: Style::default().fg(text),
            md_codeblock_bg: Some(code_bg),
            md_code_label_style: Style::default()
                .fg(muted)
                .bg(Color::Rgb(51, 65, 85))
                .add_modifier(Modifier::BOLD),
            md_blockquote_style: Style::default().fg(muted).add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default().fg(accent),
            md_link_style: Style::default()
                .fg(accent)
                .add_modifier(Modifier::UNDERLINED),
            md_link_url_style: Style::default().fg(faint),
            md_rule_style: Style::default().fg(faint),
        }
    }

    pub fn md_heading_style(&self, level: u8) -> Style {
        let base = Style::default()
            .fg(self.md_heading_color)
            .add_modifier(Modifier::BOLD);
        match level {
            1 => base.add_modifier(Modifier::UNDERLINED),
            2 => base,
            _ => base.remove_modifier(Modifier::BOLD).add_modifier(Modifier::ITALIC),
        }
    }

    pub fn md_codeblock_style(&self) -> Style {
        match self.md_codeblock_bg {
            Some(bg) => self.md_codeblock_text_style.bg(bg),
            None => self.md_codeblock_text_style,
        }
    }
}
