use std::sync::Arc;

use crate::api::client::ModelClient;
use crate::core::chat_stream::StreamMessage;
use crate::core::constants::SYSTEM_INSTRUCTION;
use crate::core::conversation::ConversationStore;
use crate::core::session::{SessionSettings, SessionSlot};
use crate::ui::theme::Theme;

pub mod actions;
pub mod composer;
pub mod conversation;
pub mod ui_state;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand,
};
pub use composer::Composer;
pub use conversation::{ConversationController, LastOutcome, SendPhase, StreamState, SubmitOutcome};
pub use ui_state::{Overlay, UiState};

/// Startup parameters for an [`App`].
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub model: String,
    pub api_key: Option<String>,
    pub markdown: bool,
    pub syntax: bool,
}

pub struct App {
    pub store: ConversationStore,
    pub sessions: SessionSlot,
    pub stream: StreamState,
    pub client: Arc<dyn ModelClient>,
    pub ui: UiState,
}

impl App {
    pub fn new(settings: AppSettings, client: Arc<dyn ModelClient>) -> Self {
        let sessions = SessionSlot::new(SessionSettings {
            model: settings.model,
            api_key: settings.api_key,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        });
        Self {
            store: ConversationStore::new(),
            sessions,
            stream: StreamState::default(),
            client,
            ui: UiState::new(Theme::dark_default(), settings.markdown, settings.syntax),
        }
    }

    pub fn conversation(&mut self) -> ConversationController<'_> {
        ConversationController::new(
            &mut self.store,
            &mut self.sessions,
            &mut self.stream,
            &self.client,
        )
    }

    /// Applies one message from the stream service. Messages from streams
    /// other than the one in flight are dropped.
    pub fn handle_stream_message(&mut self, message: StreamMessage, stream_id: u64) {
        let mut conversation = self.conversation();
        match message {
            StreamMessage::Chunk(text) => conversation.append_fragment(stream_id, &text),
            StreamMessage::Error(detail) => conversation.fail_stream(stream_id, &detail),
            StreamMessage::End => conversation.finish_stream(stream_id),
        }
    }

    pub fn phase(&self) -> SendPhase {
        self.stream.phase()
    }

    pub fn is_busy(&self) -> bool {
        self.stream.is_busy()
    }

    pub fn model(&self) -> &str {
        self.sessions.model()
    }
}
