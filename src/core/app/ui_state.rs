use std::time::{Duration, Instant};

use crate::core::app::composer::Composer;
use crate::core::constants::SUGGESTIONS;
use crate::ui::theme::Theme;

const STATUS_TTL: Duration = Duration::from_secs(4);

/// Overlay drawn on top of the conversation, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    ConfirmClear,
    Help,
}

pub struct UiState {
    pub theme: Theme,
    pub markdown_enabled: bool,
    pub syntax_enabled: bool,
    pub composer: Composer,
    pub overlay: Option<Overlay>,
    pub exit_requested: bool,
    pub pulse_start: Instant,
    status: Option<String>,
    status_set_at: Option<Instant>,
    scroll_offset: u16,
    max_scroll: u16,
    auto_scroll: bool,
    suggestion_cursor: usize,
}

impl UiState {
    pub fn new(theme: Theme, markdown_enabled: bool, syntax_enabled: bool) -> Self {
        Self {
            composer: Composer::new(&theme),
            theme,
            markdown_enabled,
            syntax_enabled,
            overlay: None,
            exit_requested: false,
            pulse_start: Instant::now(),
            status: None,
            status_set_at: None,
            scroll_offset: 0,
            max_scroll: 0,
            auto_scroll: true,
            suggestion_cursor: 0,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.status_set_at = None;
    }

    /// Drops a status message once it has been visible long enough.
    /// Returns whether anything changed.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        match self.status_set_at {
            Some(set_at) if now.duration_since(set_at) >= STATUS_TTL => {
                self.clear_status();
                true
            }
            _ => false,
        }
    }

    pub fn pulse_frame(&self, now: Instant) -> usize {
        (now.duration_since(self.pulse_start).as_millis() / 300) as usize
    }

    /// Scroll position actually drawn, given the latest layout.
    pub fn scroll_offset(&self) -> u16 {
        if self.auto_scroll {
            self.max_scroll
        } else {
            self.scroll_offset.min(self.max_scroll)
        }
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll
    }

    /// Records how far the transcript can scroll at the current size.
    pub fn set_max_scroll(&mut self, max_scroll: u16) {
        self.max_scroll = max_scroll;
        if self.scroll_offset >= max_scroll {
            self.scroll_offset = max_scroll;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        let current = self.scroll_offset();
        self.auto_scroll = false;
        self.scroll_offset = current.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let target = self.scroll_offset().saturating_add(lines);
        if target >= self.max_scroll {
            self.scroll_to_bottom();
        } else {
            self.scroll_offset = target;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
        self.scroll_offset = self.max_scroll;
    }

    pub fn reset_scroll(&mut self) {
        self.max_scroll = 0;
        self.scroll_to_bottom();
    }

    /// Puts the next suggestion prompt into the composer.
    pub fn cycle_suggestion(&mut self) {
        let (_, prompt) = SUGGESTIONS[self.suggestion_cursor % SUGGESTIONS.len()];
        self.suggestion_cursor += 1;
        self.composer.set_text(prompt);
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Some(Overlay::Help) => None,
            _ => Some(Overlay::Help),
        };
    }
}
