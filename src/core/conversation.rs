//! Ordered transcript of the current chat and the reducer that mutates it.

use std::fmt;

use crate::core::message::Message;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    Append(Message),
    SetText { id: String, text: String },
    MarkError { id: String, text: String },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    EmptyId,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::EmptyId => write!(f, "message id must not be empty"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
    // Survives `clear` so ids from an abandoned conversation never match new ones.
    next_seq: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id of the form `<timestamp>-<seq>`.
    pub fn next_id(&mut self, timestamp: i64) -> String {
        self.next_seq += 1;
        format!("{timestamp}-{}", self.next_seq)
    }

    pub fn append(&mut self, message: Message) -> Result<(), StoreError> {
        if message.id.is_empty() {
            return Err(StoreError::EmptyId);
        }
        self.messages.push(message);
        Ok(())
    }

    /// Replaces the message with `id` by the mutator's result. Returns
    /// `false` when no message matched.
    pub fn update_by_id<F>(&mut self, id: &str, mutator: F) -> bool
    where
        F: FnOnce(&Message) -> Message,
    {
        match self.messages.iter_mut().find(|message| message.id == id) {
            Some(slot) => {
                *slot = mutator(slot);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Applies one action. Returns whether the transcript changed.
    pub fn apply(&mut self, action: StoreAction) -> Result<bool, StoreError> {
        match action {
            StoreAction::Append(message) => self.append(message).map(|_| true),
            StoreAction::SetText { id, text } => {
                Ok(self.update_by_id(&id, |message| message.with_text(text)))
            }
            StoreAction::MarkError { id, text } => {
                Ok(self.update_by_id(&id, |message| message.clone().into_error(text)))
            }
            StoreAction::Clear => {
                let changed = !self.messages.is_empty();
                self.clear();
                Ok(changed)
            }
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    fn user(store: &mut ConversationStore, text: &str) -> Message {
        let id = store.next_id(1_000);
        Message::user(id, text, 1_000, Vec::new())
    }

    #[test]
    fn next_id_is_unique_within_one_millisecond() {
        let mut store = ConversationStore::new();
        let first = store.next_id(5);
        let second = store.next_id(5);
        assert_ne!(first, second);
        assert_eq!(first, "5-1");
        assert_eq!(second, "5-2");
    }

    #[test]
    fn append_preserves_order_and_rejects_empty_ids() {
        let mut store = ConversationStore::new();
        let first = user(&mut store, "one");
        let second = user(&mut store, "two");
        store.append(first.clone()).expect("append");
        store.append(second.clone()).expect("append");

        assert_eq!(
            store.append(Message::user("", "nameless", 0, Vec::new())),
            Err(StoreError::EmptyId)
        );
        assert_eq!(store.messages(), &[first, second]);
    }

    #[test]
    fn update_by_id_touches_only_the_matching_message() {
        let mut store = ConversationStore::new();
        let first = user(&mut store, "hello");
        let placeholder = Message::model_placeholder(store.next_id(1_000), 1_000);
        store.append(first.clone()).expect("append");
        store.append(placeholder.clone()).expect("append");

        assert!(store.update_by_id(&placeholder.id, |m| m.with_text("Hi")));
        assert!(!store.update_by_id("missing", |m| m.with_text("nope")));

        assert_eq!(store.get(&first.id), Some(&first));
        let updated = store.get(&placeholder.id).expect("placeholder");
        assert_eq!(updated.text, "Hi");
        assert_eq!(updated.role, Role::Model);
    }

    #[test]
    fn reducer_marks_errors_and_clears() {
        let mut store = ConversationStore::new();
        let id = store.next_id(1);
        store
            .apply(StoreAction::Append(Message::model_placeholder(id.clone(), 1)))
            .expect("append");

        let changed = store
            .apply(StoreAction::MarkError {
                id: id.clone(),
                text: "sorry".to_string(),
            })
            .expect("mark");
        assert!(changed);
        let message = store.last().expect("message");
        assert!(message.is_error);
        assert_eq!(message.text, "sorry");

        assert_eq!(store.apply(StoreAction::Clear), Ok(true));
        assert!(store.is_empty());
        assert_eq!(store.apply(StoreAction::Clear), Ok(false));

        // Folding into a cleared message is a no-op.
        assert_eq!(
            store.apply(StoreAction::SetText {
                id,
                text: "late".to_string()
            }),
            Ok(false)
        );
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn ids_keep_increasing_across_clears() {
        let mut store = ConversationStore::new();
        let before = store.next_id(9);
        store.clear();
        let after = store.next_id(9);
        assert_ne!(before, after);
    }
}
