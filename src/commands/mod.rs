mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation};

use std::path::PathBuf;

use crate::core::app::{App, Overlay};

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    /// Read and encode the file at this path off the event loop.
    Attach(PathBuf),
}

/// Splits `/name args` into the registered command and its arguments.
fn parse_command(input: &str) -> Option<(&'static Command, &str)> {
    let rest = input.trim().strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let name = parts.next().filter(|name| !name.is_empty())?;
    let command = registry::find_command(name)?;
    Some((command, parts.next().unwrap_or("").trim()))
}

/// Whether the input names a registered command. Other `/...` text is a
/// normal message.
pub fn is_registered_command(input: &str) -> bool {
    parse_command(input).is_some()
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    match parse_command(input) {
        Some((command, args)) => (command.handler)(app, CommandInvocation { args }),
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

pub(super) fn handle_attach(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        app.ui.set_status("Usage: /attach <path>");
        return CommandResult::Continue;
    }
    CommandResult::Attach(PathBuf::from(expand_home(invocation.args)))
}

pub(super) fn handle_detach(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let count = app.ui.composer.attachments().len();
    if count == 0 {
        app.ui.set_status("No images attached");
        return CommandResult::Continue;
    }

    let position = if invocation.args.is_empty() {
        Some(count)
    } else {
        invocation.args.parse::<usize>().ok()
    };
    match position.and_then(|n| app.ui.composer.detach(n).map(|_| n)) {
        Some(n) => app.ui.set_status(format!("Removed image {n}")),
        None => app.ui.set_status(format!("Usage: /detach [1-{count}]")),
    }
    CommandResult::Continue
}

pub(super) fn handle_clear(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.ui.overlay = Some(Overlay::ConfirmClear);
    CommandResult::Continue
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.ui.toggle_help();
    CommandResult::Continue
}

pub(super) fn handle_quit(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.ui.exit_requested = true;
    CommandResult::Continue
}

fn parse_toggle(arg: &str, current: bool) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" => Some(true),
        "off" => Some(false),
        "toggle" | "" => Some(!current),
        _ => None,
    }
}

pub(super) fn handle_markdown(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    match parse_toggle(invocation.args, app.ui.markdown_enabled) {
        Some(state) => {
            app.ui.markdown_enabled = state;
            app.ui.set_status(format!(
                "Markdown {}",
                if state { "enabled" } else { "disabled" }
            ));
        }
        None => app.ui.set_status("Usage: /markdown [on|off|toggle]"),
    }
    CommandResult::Continue
}

pub(super) fn handle_syntax(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    match parse_toggle(invocation.args, app.ui.syntax_enabled) {
        Some(state) => {
            app.ui.syntax_enabled = state;
            app.ui
                .set_status(format!("Syntax {}", if state { "on" } else { "off" }));
        }
        None => app.ui.set_status("Usage: /syntax [on|off|toggle]"),
    }
    CommandResult::Continue
}

fn expand_home(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => match directories::BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest).to_string_lossy().into_owned(),
            None => path.to_string(),
        },
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attachment::Attachment;
    use crate::utils::test_utils::create_test_app;

    fn image(data: &str) -> Attachment {
        Attachment {
            data: data.to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    #[test]
    fn plain_text_is_a_message() {
        let mut app = create_test_app();
        match process_input(&mut app, "hello there") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "hello there"),
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn unknown_command_is_sent_as_a_message() {
        let mut app = create_test_app();
        match process_input(&mut app, "/shrug ok") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "/shrug ok"),
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn only_registered_names_count_as_commands() {
        assert!(is_registered_command("/attach a.png"));
        assert!(is_registered_command("  /Detach"));
        assert!(!is_registered_command("/shrug ok"));
        assert!(!is_registered_command("/"));
        assert!(!is_registered_command("attach a.png"));
    }

    #[test]
    fn attach_returns_the_path() {
        let mut app = create_test_app();
        match process_input(&mut app, "/attach /tmp/cat.png") {
            CommandResult::Attach(path) => assert_eq!(path, PathBuf::from("/tmp/cat.png")),
            _ => panic!("expected attach"),
        }
    }

    #[test]
    fn attach_without_path_shows_usage() {
        let mut app = create_test_app();
        assert!(matches!(
            process_input(&mut app, "/attach"),
            CommandResult::Continue
        ));
        assert_eq!(app.ui.status(), Some("Usage: /attach <path>"));
    }

    #[test]
    fn detach_defaults_to_last_image() {
        let mut app = create_test_app();
        app.ui.composer.attach(image("a"));
        app.ui.composer.attach(image("b"));

        process_input(&mut app, "/detach");
        assert_eq!(app.ui.composer.attachments(), &[image("a")]);

        process_input(&mut app, "/detach 5");
        assert_eq!(app.ui.composer.attachments().len(), 1);
        assert_eq!(app.ui.status(), Some("Usage: /detach [1-1]"));

        process_input(&mut app, "/DETACH 1");
        assert!(app.ui.composer.attachments().is_empty());
    }

    #[test]
    fn clear_opens_confirmation() {
        let mut app = create_test_app();
        process_input(&mut app, "/clear");
        assert_eq!(app.ui.overlay, Some(Overlay::ConfirmClear));
    }

    #[test]
    fn markdown_toggle_accepts_on_off() {
        let mut app = create_test_app();
        process_input(&mut app, "/markdown off");
        assert!(!app.ui.markdown_enabled);
        process_input(&mut app, "/markdown");
        assert!(app.ui.markdown_enabled);
        process_input(&mut app, "/markdown sideways");
        assert_eq!(app.ui.status(), Some("Usage: /markdown [on|off|toggle]"));
    }

    #[test]
    fn quit_requests_exit() {
        let mut app = create_test_app();
        process_input(&mut app, "/quit");
        assert!(app.ui.exit_requested);
    }
}
