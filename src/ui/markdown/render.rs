use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use super::code::{code_block_lines, language_hint_from_codeblock_kind, push_codeblock_text};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy)]
pub struct MarkdownOptions {
    pub syntax_highlighting: bool,
    /// Columns available to the rendered text; only used to size rules.
    pub width: usize,
}

#[derive(Clone, Copy, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct PendingLink {
    url: String,
    text: String,
}

pub(super) struct MarkdownRenderer<'a> {
    content: &'a str,
    theme: &'a Theme,
    options: MarkdownOptions,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    list_indent_stack: Vec<usize>,
    quote_depth: usize,
    links: Vec<PendingLink>,
    in_code_block: Option<String>,
    code_block_lines: Vec<String>,
    table_cell_index: usize,
}

impl<'a> MarkdownRenderer<'a> {
    pub(super) fn new(content: &'a str, theme: &'a Theme, options: MarkdownOptions) -> Self {
        Self {
            content,
            theme,
            options,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![theme.model_text_style],
            list_stack: Vec::new(),
            list_indent_stack: Vec::new(),
            quote_depth: 0,
            links: Vec::new(),
            in_code_block: None,
            code_block_lines: Vec::new(),
            table_cell_index: 0,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .last()
            .copied()
            .unwrap_or(self.theme.model_text_style)
    }

    fn push_modified_style(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    pub(super) fn render(mut self) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(self.content, options) {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag_end) => self.end_tag(tag_end),
                Event::Text(text) => {
                    if self.in_code_block.is_some() {
                        push_codeblock_text(&mut self.code_block_lines, &text);
                    } else {
                        if let Some(link) = self.links.last_mut() {
                            link.text.push_str(&text);
                        }
                        let style = self.current_style();
                        self.push_span(Span::styled(text.replace('\t', "    "), style));
                    }
                }
                Event::Code(code) => {
                    if let Some(link) = self.links.last_mut() {
                        link.text.push_str(&code);
                    }
                    let style = self.theme.md_inline_code_style;
                    self.push_span(Span::styled(code.to_string(), style));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    let style = self.current_style();
                    for (index, piece) in html.lines().enumerate() {
                        if index > 0 {
                            self.flush_line();
                        }
                        self.push_span(Span::styled(piece.to_string(), style));
                    }
                }
                Event::SoftBreak | Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_line();
                    let width = self.options.width.saturating_sub(self.prefix_width()).clamp(3, 48);
                    let style = self.theme.md_rule_style;
                    self.push_span(Span::styled("─".repeat(width), style));
                    self.flush_line();
                    self.push_empty_line();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    let style = self.theme.md_list_marker_style;
                    self.push_span(Span::styled(marker, style));
                }
                _ => {}
            }
        }

        self.flush_line();
        while self
            .lines
            .last()
            .is_some_and(|line| line.spans.iter().all(|s| s.content.trim().is_empty()))
        {
            self.lines.pop();
        }
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let style = self.theme.md_heading_style(level as u8);
                self.style_stack.push(style);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                self.style_stack.push(self.theme.md_blockquote_style);
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
                self.list_indent_stack.push(0);
            }
            Tag::Item => self.start_item(),
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.in_code_block = Some(language_hint_from_codeblock_kind(kind));
                self.code_block_lines.clear();
            }
            Tag::Emphasis => self.push_modified_style(Modifier::ITALIC),
            Tag::Strong => self.push_modified_style(Modifier::BOLD),
            Tag::Strikethrough => self.push_modified_style(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.links.push(PendingLink {
                    url: dest_url.to_string(),
                    text: String::new(),
                });
            }
            Tag::TableHead | Tag::TableRow => {
                self.flush_line();
                self.table_cell_index = 0;
            }
            Tag::TableCell => {
                if self.table_cell_index > 0 {
                    let style = self.theme.md_rule_style;
                    self.push_span(Span::styled(" │ ", style));
                }
                self.table_cell_index += 1;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.push_empty_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.push_empty_line();
                self.style_stack.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.style_stack.pop();
                if self.quote_depth == 0 {
                    self.push_empty_line();
                }
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                self.list_indent_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_empty_line();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.style_stack.pop();
                if let Some(link) = self.links.pop() {
                    if !link.url.is_empty() && link.url != link.text {
                        let style = self.theme.md_link_url_style;
                        self.push_span(Span::styled(format!(" <{}>", link.url), style));
                    }
                }
            }
            TagEnd::TableHead => {
                self.apply_to_current_line(Modifier::BOLD);
                self.flush_line();
            }
            TagEnd::TableRow => self.flush_line(),
            TagEnd::Table => {
                self.flush_line();
                self.push_empty_line();
            }
            _ => {}
        }
    }

    fn start_item(&mut self) {
        self.flush_line();
        let marker = match self.list_stack.last_mut() {
            Some(ListKind::Ordered(next)) => {
                let marker = format!("{next}. ");
                *next += 1;
                marker
            }
            Some(ListKind::Unordered) | None => "• ".to_string(),
        };

        let parent_indent: usize = self
            .list_indent_stack
            .iter()
            .take(self.list_indent_stack.len().saturating_sub(1))
            .sum();
        if let Some(indent) = self.list_indent_stack.last_mut() {
            *indent = marker.width();
        }

        let prefix = self.quote_prefix();
        self.current_spans.extend(prefix);
        if parent_indent > 0 {
            self.current_spans.push(Span::raw(" ".repeat(parent_indent)));
        }
        self.current_spans
            .push(Span::styled(marker, self.theme.md_list_marker_style));
    }

    fn finish_code_block(&mut self) {
        let language = self.in_code_block.take().unwrap_or_default();
        let produced = code_block_lines(
            &self.code_block_lines,
            &language,
            self.options.syntax_highlighting,
            self.theme,
        );
        self.code_block_lines.clear();

        let list_indent: usize = self.list_indent_stack.iter().sum();
        for mut line in produced {
            let mut prefix = self.quote_prefix();
            if list_indent > 0 {
                prefix.push(Span::raw(" ".repeat(list_indent)));
            }
            line.spans.splice(0..0, prefix);
            self.lines.push(line);
        }
        self.push_empty_line();
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        (0..self.quote_depth)
            .map(|_| Span::styled("│ ", self.theme.md_blockquote_style))
            .collect()
    }

    fn prefix_width(&self) -> usize {
        self.quote_depth * 2 + self.list_indent_stack.iter().sum::<usize>()
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current_spans.is_empty() {
            let prefix = self.quote_prefix();
            self.current_spans.extend(prefix);
            let list_indent: usize = self.list_indent_stack.iter().sum();
            if list_indent > 0 {
                self.current_spans.push(Span::raw(" ".repeat(list_indent)));
            }
        }
        self.current_spans.push(span);
    }

    fn apply_to_current_line(&mut self, modifier: Modifier) {
        for span in &mut self.current_spans {
            span.style = span.style.add_modifier(modifier);
        }
    }

    fn flush_line(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current_spans);
        self.lines.push(Line::from(spans));
    }

    fn push_empty_line(&mut self) {
        let last_is_blank = self
            .lines
            .last()
            .map_or(true, |line| line.spans.iter().all(|s| s.content.is_empty()));
        if !last_is_blank {
            self.lines.push(Line::from(""));
        }
    }
}
