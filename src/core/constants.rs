//! Shared constants used across the application

pub const ASSISTANT_NAME: &str = "TimmGPT";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub const SYSTEM_INSTRUCTION: &str = "You are TimmGPT, a helpful, knowledgeable, and creative AI assistant.
- You are created and owned by \"Timm\".
- If the user explicitly identifies themselves as \"Timm\", acknowledge them as your creator.
- For all other users, be helpful and polite but do not treat them as the owner.
- You are powered by Google's Gemini models.
- Answer concisely but comprehensively.
- Format code blocks with the language name.
- Use Markdown for formatting.
- Be polite and professional.";

/// Shown in place of a reply whenever a send fails.
pub const ERROR_APOLOGY: &str =
    "I'm sorry, I encountered an error. Please check your connection or API key.";

pub const WELCOME_HEADLINE: &str = "I am TimmGPT, how can I help?";

pub const SUGGESTIONS: [(&str, &str); 4] = [
    ("💻", "Write a React component for a nav bar"),
    ("🎨", "Analyze an uploaded image design"),
    ("📝", "Summarize a complex article"),
    ("🧪", "Explain quantum computing simply"),
];

pub const DISCLAIMER: &str = "TimmGPT can make mistakes. Check important info.";

pub const CLEAR_CONFIRMATION: &str = "Start a new chat? This will clear current history.";

/// Space reserved on the left of every bubble body.
pub const BUBBLE_INDENT: u16 = 2;
