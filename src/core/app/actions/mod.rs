mod input;
mod streaming;

use std::path::PathBuf;

use tokio::sync::mpsc;

use super::App;
use crate::core::attachment::Attachment;
use crate::core::chat_stream::StreamParams;

#[derive(Debug)]
pub enum AppAction {
    AppendResponseChunk {
        content: String,
        stream_id: u64,
    },
    StreamErrored {
        message: String,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    /// Send whatever the composer holds, or run it as a command.
    SubmitComposer,
    ProcessCommand {
        input: String,
    },
    AttachmentEncoded {
        path: PathBuf,
        result: Result<Option<Attachment>, String>,
    },
    RequestClear,
    ConfirmClear,
    CancelClear,
    ClearStatus,
    SetStatus {
        message: String,
    },
    InsertIntoInput {
        text: String,
    },
    CycleSuggestion,
    ToggleHelp,
    Quit,
    ScrollUp {
        lines: u16,
    },
    ScrollDown {
        lines: u16,
    },
    PageUp,
    PageDown,
    ScrollToBottom,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) {
        self.dispatch_many([action], ctx);
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

#[derive(Debug)]
pub enum AppCommand {
    SpawnStream(StreamParams),
    EncodeAttachment(PathBuf),
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::AppendResponseChunk { .. }
        | AppAction::StreamErrored { .. }
        | AppAction::StreamCompleted { .. }
        | AppAction::RequestClear
        | AppAction::ConfirmClear
        | AppAction::CancelClear => streaming::handle_streaming_action(app, action, ctx),

        AppAction::SubmitComposer
        | AppAction::ProcessCommand { .. }
        | AppAction::AttachmentEncoded { .. }
        | AppAction::ClearStatus
        | AppAction::SetStatus { .. }
        | AppAction::InsertIntoInput { .. }
        | AppAction::CycleSuggestion
        | AppAction::ToggleHelp
        | AppAction::Quit
        | AppAction::ScrollUp { .. }
        | AppAction::ScrollDown { .. }
        | AppAction::PageUp
        | AppAction::PageDown
        | AppAction::ScrollToBottom => input::handle_input_action(app, action, ctx),
    }
}
