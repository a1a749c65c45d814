use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::ui::theme::Theme;

const CACHE_CAPACITY: usize = 64;
const SYNTECT_THEME: &str = "base16-ocean.dark";

// Replies are re-rendered on every frame while streaming, so finished code
// blocks are memoized. Bounded FIFO keyed by (language, content hash).
struct HighlightCache {
    map: HashMap<(String, u64), Vec<Line<'static>>>,
    order: VecDeque<(String, u64)>,
}

impl HighlightCache {
    fn get(&self, key: &(String, u64)) -> Option<Vec<Line<'static>>> {
        self.map.get(key).cloned()
    }

    fn put(&mut self, key: (String, u64), lines: Vec<Line<'static>>) {
        if self.map.insert(key.clone(), lines).is_none() {
            self.order.push_back(key);
        }
        while self.map.len() > CACHE_CAPACITY {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
    }
}

static CACHE: OnceLock<Mutex<HighlightCache>> = OnceLock::new();

fn cache() -> MutexGuard<'static, HighlightCache> {
    CACHE
        .get_or_init(|| {
            Mutex::new(HighlightCache {
                map: HashMap::new(),
                order: VecDeque::new(),
            })
        })
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

pub(crate) fn normalize_lang_hint(hint: &str) -> String {
    let lower = hint.trim().to_ascii_lowercase();
    match lower.as_str() {
        "py" | "python3" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" | "console" => "bash".into(),
        "js" | "jsx" | "javascript" | "mjs" => "js".into(),
        "ts" | "tsx" | "typescript" => "ts".into(),
        "yml" | "yaml" => "yaml".into(),
        "rs" | "rust" => "rust".into(),
        "c++" | "cpp" | "cc" | "cxx" | "hpp" => "cpp".into(),
        "kt" | "kotlin" => "kotlin".into(),
        "golang" | "go" => "go".into(),
        "htm" | "html" => "html".into(),
        other => other.into(),
    }
}

fn content_hash(lang: &str, code: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    hasher.finish()
}

/// Highlights `code` for a known language. Returns `None` when the language
/// is missing or unknown so callers can fall back to plain styling.
pub fn highlight_code_block(lang_hint: &str, code: &str, theme: &Theme) -> Option<Vec<Line<'static>>> {
    let lang = normalize_lang_hint(lang_hint);
    if lang.is_empty() {
        return None;
    }

    let syntaxes = syntax_set();
    let syntax = syntaxes.find_syntax_by_token(&lang)?;
    let syntect_theme = theme_set().themes.get(SYNTECT_THEME)?;

    let key = (lang.clone(), content_hash(&lang, code));
    if let Some(lines) = cache().get(&key) {
        return Some(lines);
    }

    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    let mut out = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, syntaxes).ok()?;
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .filter_map(|(style, fragment)| {
                let fragment = fragment.trim_end_matches(['\n', '\r']);
                if fragment.is_empty() {
                    return None;
                }
                let fg = style.foreground;
                let mut span_style = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
                if let Some(bg) = theme.md_codeblock_bg {
                    span_style = span_style.bg(bg);
                }
                Some(Span::styled(fragment.to_string(), span_style))
            })
            .collect();
        out.push(Line::from(spans));
    }

    cache().put(key, out.clone());
    Some(out)
}
