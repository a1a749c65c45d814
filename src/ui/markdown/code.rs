use pulldown_cmark::CodeBlockKind;
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

pub(super) fn language_hint_from_codeblock_kind(kind: CodeBlockKind) -> String {
    match kind {
        CodeBlockKind::Indented => String::new(),
        CodeBlockKind::Fenced(info) => info.split_ascii_whitespace().next().unwrap_or("").into(),
    }
}

pub(super) fn push_codeblock_text(code_block_lines: &mut Vec<String>, text: &str) {
    for line in text.lines() {
        code_block_lines.push(line.replace('\t', "    "));
    }
}

fn plain_codeblock_lines(code_block_lines: &[String], theme: &Theme) -> Vec<Line<'static>> {
    let style = theme.md_codeblock_style();
    code_block_lines
        .iter()
        .map(|line| Line::from(Span::styled(line.clone(), style)))
        .collect()
}

/// Emits a finished code block: a label line naming the language (when one
/// was given) followed by the code, highlighted if possible.
pub(super) fn code_block_lines(
    code_block_lines: &[String],
    language: &str,
    syntax_enabled: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut out = Vec::with_capacity(code_block_lines.len() + 1);
    if !language.is_empty() {
        out.push(Line::from(Span::styled(
            format!(" {language} "),
            theme.md_code_label_style,
        )));
    }

    if code_block_lines.is_empty() {
        return out;
    }

    let highlighted = if syntax_enabled {
        crate::utils::syntax::highlight_code_block(language, &code_block_lines.join("\n"), theme)
    } else {
        None
    };
    out.extend(highlighted.unwrap_or_else(|| plain_codeblock_lines(code_block_lines, theme)));
    out
}
