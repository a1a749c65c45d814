use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::constants::{API_KEY_ENV_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gemini model used for new sessions (e.g., "gemini-2.5-flash")
    pub model: Option<String>,
    /// API root; the model path is appended to it
    pub base_url: Option<String>,
    /// Render replies as markdown
    pub markdown: Option<bool>,
    /// Highlight fenced code blocks when markdown is enabled
    pub syntax: Option<bool>,
}

impl Config {
    /// Explicit flag first, then the file, then the built-in default.
    pub fn resolve_model(&self, cli_model: Option<&str>) -> String {
        cli_model
            .map(str::to_string)
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn resolve_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.model {
            Some(model) => println!("  model: {model}"),
            None => println!("  model: (unset, using {DEFAULT_MODEL})"),
        }
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        match self.markdown_enabled() {
            true => println!("  markdown: on"),
            false => println!("  markdown: off"),
        }
        match self.syntax_enabled() {
            true => println!("  syntax: on"),
            false => println!("  syntax: off"),
        }
    }
}

/// First non-empty credential among the supported environment variables.
pub fn api_key_from_env() -> Option<String> {
    api_key_from(|name| std::env::var(name).ok())
}

pub(crate) fn api_key_from<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(*name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_model_beats_file_beats_default() {
        let mut config = Config::default();
        assert_eq!(config.resolve_model(None), DEFAULT_MODEL);

        config.model = Some("gemini-file".to_string());
        assert_eq!(config.resolve_model(None), "gemini-file");
        assert_eq!(config.resolve_model(Some("gemini-flag")), "gemini-flag");
    }

    #[test]
    fn rendering_flags_default_on() {
        let config = Config::default();
        assert!(config.markdown_enabled());
        assert!(config.syntax_enabled());
        assert_eq!(config.resolve_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn api_key_prefers_gemini_variable_and_skips_blanks() {
        let key = api_key_from(|name| match name {
            "GEMINI_API_KEY" => Some("  ".to_string()),
            "API_KEY" => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("fallback"));

        let key = api_key_from(|name| Some(format!("{name}-value")));
        assert_eq!(key.as_deref(), Some("GEMINI_API_KEY-value"));

        assert_eq!(api_key_from(|_| None), None);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str("model = \"gemini-pro\"\nsyntax = false\n").unwrap();
        assert_eq!(config.model.as_deref(), Some("gemini-pro"));
        assert!(!config.syntax_enabled());
        assert!(config.markdown_enabled());
    }
}
