use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "attach",
        usage: "/attach <path>",
        help: "Queue an image to send with the next message.",
        handler: super::handle_attach,
    },
    Command {
        name: "detach",
        usage: "/detach [n]",
        help: "Remove a queued image (the last one by default).",
        handler: super::handle_detach,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Start a new chat.",
        handler: super::handle_clear,
    },
    Command {
        name: "markdown",
        usage: "/markdown [on|off]",
        help: "Toggle markdown rendering for replies.",
        handler: super::handle_markdown,
    },
    Command {
        name: "syntax",
        usage: "/syntax [on|off]",
        help: "Toggle syntax highlighting for code blocks.",
        handler: super::handle_syntax,
    },
    Command {
        name: "help",
        usage: "/help",
        help: "Show commands and key bindings.",
        handler: super::handle_help,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave TimmGPT.",
        handler: super::handle_quit,
    },
];
