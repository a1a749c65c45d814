use ratatui::style::Style;
use tui_textarea::{Input, TextArea};

use crate::core::attachment::Attachment;
use crate::ui::theme::Theme;

/// Pending input: the text being typed plus any images queued with it.
pub struct Composer {
    textarea: TextArea<'static>,
    attachments: Vec<Attachment>,
    text_style: Style,
    placeholder_style: Style,
}

const PLACEHOLDER: &str = "Ask TimmGPT anything...";

impl Composer {
    pub fn new(theme: &Theme) -> Self {
        let mut composer = Self {
            textarea: TextArea::default(),
            attachments: Vec::new(),
            text_style: theme.input_text_style,
            placeholder_style: theme.input_placeholder_style,
        };
        composer.reset_textarea();
        composer
    }

    fn reset_textarea(&mut self) {
        let mut textarea = TextArea::default();
        textarea.set_style(self.text_style);
        textarea.set_cursor_line_style(Style::default());
        textarea.set_placeholder_text(PLACEHOLDER);
        textarea.set_placeholder_style(self.placeholder_style);
        self.textarea = textarea;
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.textarea
            .lines()
            .iter()
            .all(|line| line.trim().is_empty())
    }

    pub fn can_send(&self) -> bool {
        !self.is_blank() || !self.attachments.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.textarea.lines().len().max(1)
    }

    pub fn set_text(&mut self, text: &str) {
        self.reset_textarea();
        self.insert_str(text);
    }

    pub fn clear_text(&mut self) {
        self.reset_textarea();
    }

    pub fn insert_str(&mut self, text: &str) {
        for (index, piece) in text.split('\n').enumerate() {
            if index > 0 {
                self.textarea.insert_newline();
            }
            self.textarea.insert_str(piece);
        }
    }

    pub fn insert_newline(&mut self) {
        self.textarea.insert_newline();
    }

    pub fn input(&mut self, input: impl Into<Input>) -> bool {
        self.textarea.input(input)
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Removes the attachment at a 1-based position.
    pub fn detach(&mut self, position: usize) -> Option<Attachment> {
        if position == 0 || position > self.attachments.len() {
            return None;
        }
        Some(self.attachments.remove(position - 1))
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Empties the composer and hands back what it held.
    pub fn take(&mut self) -> (String, Vec<Attachment>) {
        let text = self.text();
        self.reset_textarea();
        (text, std::mem::take(&mut self.attachments))
    }

    pub fn textarea_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.textarea
    }
}
