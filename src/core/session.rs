//! Remote chat sessions: one live session per conversation, recreated after
//! the history is cleared.

use std::fmt;

use tracing::info;

use crate::api::{Content, GenerateContentRequest, Part};
use crate::core::attachment::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    MissingCredential,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MissingCredential => {
                write!(f, "GEMINI_API_KEY environment variable is not set.")
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub api_key: Option<String>,
    pub system_instruction: String,
}

impl SessionSettings {
    fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Everything needed to run one turn against the remote model.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub session_id: SessionId,
    pub model: String,
    pub user_turn: Content,
    pub request: GenerateContentRequest,
}

/// A conversation with the remote model. The REST API is stateless, so the
/// session carries the accepted history itself.
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    model: String,
    system_instruction: Content,
    history: Vec<Content>,
}

impl ChatSession {
    fn new(id: SessionId, model: &str, system_instruction: &str) -> Self {
        Self {
            id,
            model: model.to_string(),
            system_instruction: Content::instruction(system_instruction),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    pub fn begin_turn(&self, text: &str, attachments: &[Attachment]) -> TurnRequest {
        let user_turn = compose_turn(text, attachments);
        let mut contents = self.history.clone();
        contents.push(user_turn.clone());
        TurnRequest {
            session_id: self.id,
            model: self.model.clone(),
            user_turn,
            request: GenerateContentRequest {
                contents,
                system_instruction: Some(self.system_instruction.clone()),
            },
        }
    }

    /// Records a completed exchange. Only successful turns are committed.
    pub fn commit_turn(&mut self, user_turn: Content, model_text: String) {
        self.history.push(user_turn);
        self.history.push(Content::model_text(model_text));
    }
}

/// Image parts in attach order, then the text part when there is any text.
/// A text-only turn always carries its text.
pub fn compose_turn(text: &str, attachments: &[Attachment]) -> Content {
    if attachments.is_empty() {
        return Content::user(vec![Part::text(text)]);
    }

    let mut parts: Vec<Part> = attachments.iter().map(Part::inline).collect();
    if !text.trim().is_empty() {
        parts.push(Part::text(text));
    }
    Content::user(parts)
}

#[derive(Debug)]
pub struct SessionSlot {
    settings: SessionSettings,
    current: Option<ChatSession>,
    last_id: u64,
}

impl SessionSlot {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            current: None,
            last_id: 0,
        }
    }

    pub fn get_or_create(&mut self) -> Result<&mut ChatSession, SessionError> {
        if !self.settings.has_credential() {
            return Err(SessionError::MissingCredential);
        }

        let settings = &self.settings;
        let last_id = &mut self.last_id;
        Ok(self.current.get_or_insert_with(|| {
            *last_id += 1;
            let id = SessionId(*last_id);
            info!(session = %id, model = %settings.model, "chat session created");
            ChatSession::new(id, &settings.model, &settings.system_instruction)
        }))
    }

    pub fn reset(&mut self) {
        if let Some(session) = self.current.take() {
            info!(
                session = %session.id(),
                turns = session.history().len() / 2,
                "chat session reset"
            );
        }
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.current.as_ref()
    }

    /// The live session, provided it is still the one with `id`.
    pub fn live_mut(&mut self, id: SessionId) -> Option<&mut ChatSession> {
        self.current
            .as_mut()
            .filter(|session| session.id() == id)
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ContentRole;

    fn settings(api_key: Option<&str>) -> SessionSettings {
        SessionSettings {
            model: "gemini-test".to_string(),
            api_key: api_key.map(str::to_string),
            system_instruction: "be nice".to_string(),
        }
    }

    fn image(data: &str) -> Attachment {
        Attachment {
            data: data.to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn compose_turn_with_image_only_has_single_part() {
        let turn = compose_turn("", &[image("AAAA")]);
        assert_eq!(turn.role, Some(ContentRole::User));
        assert_eq!(turn.parts.len(), 1);
        assert!(turn.parts[0].inline_data.is_some());
        assert!(turn.parts[0].text.is_none());
    }

    #[test]
    fn compose_turn_puts_images_before_text() {
        let turn = compose_turn("describe", &[image("A"), image("B")]);
        let datas: Vec<_> = turn
            .parts
            .iter()
            .filter_map(|part| part.inline_data.as_ref().map(|d| d.data.as_str()))
            .collect();
        assert_eq!(datas, vec!["A", "B"]);
        assert_eq!(turn.parts[2].text.as_deref(), Some("describe"));
    }

    #[test]
    fn compose_turn_drops_blank_text_next_to_images() {
        let turn = compose_turn("   \n", &[image("A")]);
        assert_eq!(turn.parts.len(), 1);

        let text_only = compose_turn("hi", &[]);
        assert_eq!(text_only.parts, vec![Part::text("hi")]);
    }

    #[test]
    fn get_or_create_requires_credential() {
        let mut slot = SessionSlot::new(settings(None));
        assert_eq!(
            slot.get_or_create().map(|s| s.id()),
            Err(SessionError::MissingCredential)
        );

        let mut blank = SessionSlot::new(settings(Some("  ")));
        assert!(blank.get_or_create().is_err());
        assert_eq!(
            SessionError::MissingCredential.to_string(),
            "GEMINI_API_KEY environment variable is not set."
        );
    }

    #[test]
    fn get_or_create_reuses_live_session_until_reset() {
        let mut slot = SessionSlot::new(settings(Some("key")));
        let first = slot.get_or_create().expect("session").id();
        let again = slot.get_or_create().expect("session").id();
        assert_eq!(first, again);

        slot.reset();
        assert!(slot.current().is_none());
        let fresh = slot.get_or_create().expect("session");
        assert_ne!(fresh.id(), first);
        assert!(fresh.history().is_empty());
    }

    #[test]
    fn begin_turn_sends_history_and_instruction() {
        let mut slot = SessionSlot::new(settings(Some("key")));
        let session = slot.get_or_create().expect("session");

        let first = session.begin_turn("Hello", &[]);
        assert_eq!(first.request.contents.len(), 1);
        assert_eq!(first.model, "gemini-test");
        assert_eq!(
            first.request.system_instruction,
            Some(Content::instruction("be nice"))
        );

        session.commit_turn(first.user_turn.clone(), "Hi there".to_string());
        let second = session.begin_turn("And again", &[]);
        assert_eq!(second.request.contents.len(), 3);
        assert_eq!(second.request.contents[0], first.user_turn);
        assert_eq!(
            second.request.contents[1],
            Content::model_text("Hi there")
        );
        // Building a request does not commit it.
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn live_mut_rejects_stale_session_ids() {
        let mut slot = SessionSlot::new(settings(Some("key")));
        let old = slot.get_or_create().expect("session").id();
        slot.reset();
        let new = slot.get_or_create().expect("session").id();

        assert!(slot.live_mut(old).is_none());
        assert!(slot.live_mut(new).is_some());
    }
}
