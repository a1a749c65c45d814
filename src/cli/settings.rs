//! `timmgpt set` / `timmgpt unset` handling.

use std::fmt;

use crate::core::config::Config;

#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidBoolean(String),
    MissingValue {
        key: &'static str,
        example: &'static str,
    },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (expected one of: {})",
                SETTINGS
                    .iter()
                    .map(|s| s.key)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            SettingError::InvalidBoolean(input) => {
                write!(f, "Expected on or off, got '{input}'")
            }
            SettingError::MissingValue { key, example } => {
                write!(f, "Missing value for {key}. Example: {example}")
            }
        }
    }
}

impl std::error::Error for SettingError {}

enum SettingKind {
    Text {
        get: fn(&Config) -> Option<&String>,
        set: fn(&mut Config, Option<String>),
    },
    Toggle {
        get: fn(&Config) -> Option<bool>,
        set: fn(&mut Config, Option<bool>),
    },
}

struct Setting {
    key: &'static str,
    example: &'static str,
    kind: SettingKind,
}

const SETTINGS: &[Setting] = &[
    Setting {
        key: "model",
        example: "timmgpt set model gemini-2.5-pro",
        kind: SettingKind::Text {
            get: |c| c.model.as_ref(),
            set: |c, v| c.model = v,
        },
    },
    Setting {
        key: "base-url",
        example: "timmgpt set base-url https://generativelanguage.googleapis.com/v1beta",
        kind: SettingKind::Text {
            get: |c| c.base_url.as_ref(),
            set: |c, v| c.base_url = v,
        },
    },
    Setting {
        key: "markdown",
        example: "timmgpt set markdown off",
        kind: SettingKind::Toggle {
            get: |c| c.markdown,
            set: |c, v| c.markdown = v,
        },
    },
    Setting {
        key: "syntax",
        example: "timmgpt set syntax off",
        kind: SettingKind::Toggle {
            get: |c| c.syntax,
            set: |c, v| c.syntax = v,
        },
    },
];

fn find_setting(key: &str) -> Result<&'static Setting, SettingError> {
    SETTINGS
        .iter()
        .find(|setting| setting.key == key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
}

pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Applies `set` to an in-memory config and returns the confirmation line.
pub fn apply_set(config: &mut Config, key: &str, value: &[String]) -> Result<String, SettingError> {
    let setting = find_setting(key)?;
    let input = value.join(" ");
    let input = input.trim();
    if input.is_empty() {
        return Err(SettingError::MissingValue {
            key: setting.key,
            example: setting.example,
        });
    }

    match setting.kind {
        SettingKind::Text { set, .. } => {
            set(config, Some(input.to_string()));
            Ok(format!("✅ Set {} to: {input}", setting.key))
        }
        SettingKind::Toggle { set, .. } => {
            let value =
                parse_bool(input).ok_or_else(|| SettingError::InvalidBoolean(input.to_string()))?;
            set(config, Some(value));
            Ok(format!("✅ Set {} to: {}", setting.key, format_bool(value)))
        }
    }
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    let setting = find_setting(key)?;
    match setting.kind {
        SettingKind::Text { set, .. } => set(config, None),
        SettingKind::Toggle { set, .. } => set(config, None),
    }
    Ok(format!("✅ Unset {} (default restored)", setting.key))
}

/// Whether the key currently holds an explicit value.
pub fn is_set(config: &Config, key: &str) -> Result<bool, SettingError> {
    let setting = find_setting(key)?;
    Ok(match setting.kind {
        SettingKind::Text { get, .. } => get(config).is_some(),
        SettingKind::Toggle { get, .. } => get(config).is_some(),
    })
}
