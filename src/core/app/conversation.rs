use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::api::client::ModelClient;
use crate::api::Content;
use crate::core::attachment::Attachment;
use crate::core::chat_stream::StreamParams;
use crate::core::constants::ERROR_APOLOGY;
use crate::core::conversation::{ConversationStore, StoreAction};
use crate::core::message::{now_millis, Message};
use crate::core::session::{SessionId, SessionSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPhase {
    Idle,
    AwaitingFirstFragment,
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastOutcome {
    Success,
    Error,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing to send.
    Empty,
    /// A reply is still in flight; nothing was appended.
    Busy,
    /// The turn was recorded but settled as an error before any request.
    Failed,
    Started(StreamParams),
}

#[derive(Debug)]
struct InFlight {
    stream_id: u64,
    placeholder_id: String,
    session_id: SessionId,
    user_turn: Content,
    accumulated: String,
}

/// Bookkeeping for the single send that may be in flight.
#[derive(Debug, Default)]
pub struct StreamState {
    current_stream_id: u64,
    in_flight: Option<InFlight>,
    last_outcome: Option<LastOutcome>,
}

impl StreamState {
    pub fn phase(&self) -> SendPhase {
        match &self.in_flight {
            None => SendPhase::Idle,
            Some(in_flight) if in_flight.accumulated.is_empty() => {
                SendPhase::AwaitingFirstFragment
            }
            Some(_) => SendPhase::Streaming,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.stream_id == stream_id)
    }

    pub fn current_stream_id(&self) -> u64 {
        self.current_stream_id
    }

    pub fn last_outcome(&self) -> Option<LastOutcome> {
        self.last_outcome
    }

    /// Id of the placeholder still waiting for its first fragment.
    pub fn awaiting_placeholder_id(&self) -> Option<&str> {
        self.in_flight
            .as_ref()
            .filter(|in_flight| in_flight.accumulated.is_empty())
            .map(|in_flight| in_flight.placeholder_id.as_str())
    }
}

pub struct ConversationController<'a> {
    store: &'a mut ConversationStore,
    sessions: &'a mut SessionSlot,
    stream: &'a mut StreamState,
    client: &'a Arc<dyn ModelClient>,
}

impl<'a> ConversationController<'a> {
    pub fn new(
        store: &'a mut ConversationStore,
        sessions: &'a mut SessionSlot,
        stream: &'a mut StreamState,
        client: &'a Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            store,
            sessions,
            stream,
            client,
        }
    }

    fn apply(&mut self, action: StoreAction) {
        if let Err(err) = self.store.apply(action) {
            warn!(error = %err, "conversation update rejected");
        }
    }

    /// Appends the user turn and an empty reply placeholder, then prepares
    /// the request for the remote session.
    pub fn submit(&mut self, text: String, attachments: Vec<Attachment>) -> SubmitOutcome {
        if text.trim().is_empty() && attachments.is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.stream.is_busy() {
            debug!("send refused while a reply is in flight");
            return SubmitOutcome::Busy;
        }

        let now = now_millis();
        let user_id = self.store.next_id(now);
        let placeholder_id = self.store.next_id(now);
        let images = attachments.iter().map(|a| a.data.clone()).collect();
        self.apply(StoreAction::Append(Message::user(
            user_id,
            text.clone(),
            now,
            images,
        )));
        self.apply(StoreAction::Append(Message::model_placeholder(
            placeholder_id.clone(),
            now,
        )));
        self.stream.last_outcome = None;

        let turn = match self.sessions.get_or_create() {
            Ok(session) => session.begin_turn(&text, &attachments),
            Err(err) => {
                error!(error = %err, "unable to start chat session");
                self.settle_error(&placeholder_id);
                return SubmitOutcome::Failed;
            }
        };

        self.stream.current_stream_id += 1;
        let stream_id = self.stream.current_stream_id;
        debug!(
            stream_id,
            session = %turn.session_id,
            parts = turn.user_turn.parts.len(),
            history = turn.request.contents.len() - 1,
            "turn submitted"
        );

        self.stream.in_flight = Some(InFlight {
            stream_id,
            placeholder_id,
            session_id: turn.session_id,
            user_turn: turn.user_turn.clone(),
            accumulated: String::new(),
        });

        SubmitOutcome::Started(StreamParams {
            client: Arc::clone(self.client),
            turn,
            stream_id,
        })
    }

    /// Folds one fragment into the open placeholder.
    pub fn append_fragment(&mut self, stream_id: u64, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        let Some(in_flight) = self
            .stream
            .in_flight
            .as_mut()
            .filter(|in_flight| in_flight.stream_id == stream_id)
        else {
            return;
        };

        in_flight.accumulated.push_str(fragment);
        let action = StoreAction::SetText {
            id: in_flight.placeholder_id.clone(),
            text: in_flight.accumulated.clone(),
        };
        self.apply(action);
    }

    pub fn finish_stream(&mut self, stream_id: u64) {
        let Some(in_flight) = self.take_in_flight(stream_id) else {
            return;
        };

        match self.sessions.live_mut(in_flight.session_id) {
            Some(session) if !in_flight.accumulated.is_empty() => {
                session.commit_turn(in_flight.user_turn, in_flight.accumulated);
            }
            Some(_) => debug!(stream_id, "empty reply; turn not recorded"),
            None => debug!(stream_id, "session was reset mid-stream; turn not recorded"),
        }
        self.stream.last_outcome = Some(LastOutcome::Success);
        debug!(stream_id, "stream settled");
    }

    pub fn fail_stream(&mut self, stream_id: u64, detail: &str) {
        let Some(in_flight) = self.take_in_flight(stream_id) else {
            return;
        };
        error!(stream_id, error = %detail, "chat request failed");
        self.settle_error(&in_flight.placeholder_id);
    }

    /// Empties the transcript and drops the remote session. A reply still
    /// in flight keeps the send guard until its stream ends.
    pub fn clear(&mut self) {
        if self.stream.is_busy() {
            debug!("clearing while a reply is in flight");
        }
        self.apply(StoreAction::Clear);
        self.sessions.reset();
    }

    fn settle_error(&mut self, placeholder_id: &str) {
        self.apply(StoreAction::MarkError {
            id: placeholder_id.to_string(),
            text: ERROR_APOLOGY.to_string(),
        });
        self.stream.last_outcome = Some(LastOutcome::Error);
    }

    fn take_in_flight(&mut self, stream_id: u64) -> Option<InFlight> {
        if self.stream.is_current_stream(stream_id) {
            self.stream.in_flight.take()
        } else {
            debug!(stream_id, "ignoring message from stale stream");
            None
        }
    }
}
