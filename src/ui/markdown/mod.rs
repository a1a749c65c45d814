//! Markdown to ratatui lines for model replies.

mod code;
mod render;

use ratatui::text::Line;

pub use render::MarkdownOptions;

use crate::ui::theme::Theme;

pub fn render_markdown(content: &str, theme: &Theme, options: MarkdownOptions) -> Vec<Line<'static>> {
    render::MarkdownRenderer::new(content, theme, options).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn render(content: &str) -> Vec<Line<'static>> {
        render_markdown(
            content,
            &Theme::dark_default(),
            MarkdownOptions {
                syntax_highlighting: false,
                width: 40,
            },
        )
    }

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        let lines = render("First paragraph.\n\nSecond paragraph.");
        assert_eq!(texts(&lines), vec!["First paragraph.", "", "Second paragraph."]);
    }

    #[test]
    fn emphasis_and_strong_set_modifiers() {
        let lines = render("plain *soft* **loud** ~~gone~~");
        let spans = &lines[0].spans;
        let find = |needle: &str| {
            spans
                .iter()
                .find(|s| s.content == needle)
                .unwrap_or_else(|| panic!("missing span {needle}"))
                .style
        };
        assert!(find("soft").add_modifier.contains(Modifier::ITALIC));
        assert!(find("loud").add_modifier.contains(Modifier::BOLD));
        assert!(find("gone").add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn headings_use_heading_style() {
        let theme = Theme::dark_default();
        let lines = render("# Title\nbody");
        assert_eq!(texts(&lines), vec!["Title", "", "body"]);
        assert_eq!(lines[0].spans[0].style, theme.md_heading_style(1));
    }

    #[test]
    fn lists_render_markers_and_nesting() {
        let lines = render("- one\n- two\n  - nested\n\n1. first\n2. second");
        assert_eq!(
            texts(&lines),
            vec!["• one", "• two", "  • nested", "", "1. first", "2. second"]
        );
    }

    #[test]
    fn ordered_lists_honor_start_number() {
        let lines = render("3. three\n4. four");
        assert_eq!(texts(&lines), vec!["3. three", "4. four"]);
    }

    #[test]
    fn fenced_code_gets_language_label_and_verbatim_lines() {
        let lines = render("Look:\n\n```rust\nfn main() {\n\tlet x = 1;\n}\n```\nafter");
        assert_eq!(
            texts(&lines),
            vec![
                "Look:",
                "",
                " rust ",
                "fn main() {",
                "    let x = 1;",
                "}",
                "",
                "after"
            ]
        );
    }

    #[test]
    fn code_without_language_has_no_label() {
        let lines = render("```\nraw text\n```");
        assert_eq!(texts(&lines), vec!["raw text"]);
    }

    #[test]
    fn links_show_destination_after_text() {
        let lines = render("see [docs](https://example.com) or <https://example.org>");
        assert_eq!(
            texts(&lines),
            vec!["see docs <https://example.com> or https://example.org"]
        );
    }

    #[test]
    fn blockquotes_get_a_bar_prefix() {
        let lines = render("> quoted\n> text");
        assert_eq!(texts(&lines), vec!["│ quoted", "│ text"]);
    }

    #[test]
    fn inline_code_keeps_its_own_style() {
        let theme = Theme::dark_default();
        let lines = render("run `cargo fmt` now");
        let code = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "cargo fmt")
            .expect("code span");
        assert_eq!(code.style, theme.md_inline_code_style);
    }

    #[test]
    fn tables_join_cells_with_separators() {
        let lines = render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(texts(&lines), vec!["a │ b", "1 │ 2"]);
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }
}
