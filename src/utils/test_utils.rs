use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use crate::api::client::{ApiError, FragmentStream, ModelClient};
use crate::api::GenerateContentRequest;
use crate::core::app::{App, AppSettings};

/// What a [`ScriptedClient`] does for one request.
#[derive(Debug, Clone)]
pub enum Script {
    Fragments(Vec<String>),
    FailAfter { fragments: Vec<String>, message: String },
    FailOnStart(String),
}

impl Script {
    pub fn fragments(fragments: &[&str]) -> Self {
        Script::Fragments(fragments.iter().map(|s| s.to_string()).collect())
    }

    pub fn fail_after(fragments: &[&str], message: &str) -> Self {
        Script::FailAfter {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            message: message.to_string(),
        }
    }

    pub fn fail_on_start(message: &str) -> Self {
        Script::FailOnStart(message.to_string())
    }
}

fn remote_error(message: String) -> ApiError {
    ApiError::Remote {
        payload: String::new(),
        message,
    }
}

/// Model client that replays canned replies and records every request.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl ScriptedClient {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn stream_generate(
        &self,
        _model: &str,
        request: &GenerateContentRequest,
    ) -> Result<FragmentStream, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Fragments(Vec::new()));

        match script {
            Script::Fragments(fragments) => {
                Ok(stream::iter(fragments.into_iter().map(Ok)).boxed())
            }
            Script::FailAfter { fragments, message } => {
                let items = fragments
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(remote_error(message))));
                Ok(stream::iter(items).boxed())
            }
            Script::FailOnStart(message) => Err(remote_error(message)),
        }
    }
}

fn settings(api_key: Option<&str>) -> AppSettings {
    AppSettings {
        model: "gemini-test".to_string(),
        api_key: api_key.map(str::to_string),
        markdown: true,
        syntax: false,
    }
}

pub fn create_test_app() -> App {
    create_test_app_with_client(Arc::new(ScriptedClient::default()))
}

pub fn create_test_app_with_client(client: Arc<ScriptedClient>) -> App {
    App::new(settings(Some("test-key")), client)
}

pub fn create_test_app_without_key() -> App {
    App::new(settings(None), Arc::new(ScriptedClient::default()))
}
