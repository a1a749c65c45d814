use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_model(self) -> bool {
        self == Role::Model
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<&str> for Role {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// One entry of the transcript.
///
/// `images` holds base64 payloads exactly as they were sent, so the
/// transcript can show what accompanied a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl Message {
    pub fn user(
        id: impl Into<String>,
        text: impl Into<String>,
        timestamp: i64,
        images: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            timestamp,
            is_error: false,
            images,
        }
    }

    /// Empty model message that a stream fills in.
    pub fn model_placeholder(id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            role: Role::Model,
            text: String::new(),
            timestamp,
            is_error: false,
            images: Vec::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_model(&self) -> bool {
        self.role.is_model()
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn into_error(self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            ..self
        }
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::try_from("user"), Ok(Role::User));
        assert_eq!(Role::try_from("model"), Ok(Role::Model));
        assert!(Role::try_from("assistant").is_err());
        assert_eq!(String::from(Role::Model), "model");
        assert!(Role::User == "user");
    }

    #[test]
    fn message_serializes_with_optional_fields_omitted() {
        let message = Message::user("1-1", "hi", 42, Vec::new());
        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"id": "1-1", "role": "user", "text": "hi", "timestamp": 42})
        );

        let parsed: Message = serde_json::from_value(serde_json::json!({
            "id": "1-2", "role": "model", "text": "oops", "timestamp": 43, "isError": true
        }))
        .expect("parse");
        assert!(parsed.is_error);
        assert!(parsed.is_model());
        assert!(parsed.images.is_empty());
    }

    #[test]
    fn into_error_keeps_identity_and_flags_message() {
        let placeholder = Message::model_placeholder("7-2", 7);
        let failed = placeholder.clone().into_error("sorry");
        assert_eq!(failed.id, placeholder.id);
        assert_eq!(failed.timestamp, 7);
        assert_eq!(failed.text, "sorry");
        assert!(failed.is_error);
    }
}
