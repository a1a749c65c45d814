use std::collections::VecDeque;
use std::fmt;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, Stream};
use futures_util::StreamExt;
use memchr::memchr;
use tracing::{debug, warn};

use super::{GenerateContentRequest, GenerateContentResponse};
use crate::utils::url::model_endpoint_url;

/// Text fragments of one streamed reply, in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String, ApiError>>;

#[derive(Debug)]
pub enum ApiError {
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Remote { message: String, payload: String },
    Decode {
        payload: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "request failed: {err}"),
            ApiError::Status { status, body } => {
                let summary = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|value| extract_error_summary(&value))
                    .unwrap_or_else(|| collapse_whitespace(body));
                if summary.is_empty() {
                    write!(f, "API returned HTTP {status}")
                } else {
                    write!(f, "API returned HTTP {status}: {summary}")
                }
            }
            ApiError::Remote { message, .. } => write!(f, "API error: {message}"),
            ApiError::Decode { source, payload } => {
                write!(f, "failed to decode stream event ({source}): {payload}")
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            ApiError::Decode { source, .. } => Some(source),
            ApiError::Status { .. } | ApiError::Remote { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

/// Anything that can turn one request into a stream of reply fragments.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn stream_generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<FragmentStream, ApiError>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn stream_generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<FragmentStream, ApiError> {
        let url = model_endpoint_url(&self.base_url, model, "streamGenerateContent");
        debug!(%url, turns = request.contents.len(), "posting streamGenerateContent");

        let response = self
            .http
            .post(url)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(sse_fragments(response.bytes_stream()))
    }
}

/// Splits a byte stream into SSE lines and decodes each `data:` payload.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, ApiError>> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            if let Some(event) = decode_line(&line[..newline_pos]) {
                events.push(event);
            }
        }
        events
    }

    /// Flushes a final line that arrived without a trailing newline.
    pub(crate) fn finish(&mut self) -> Vec<Result<String, ApiError>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest).into_iter().collect()
    }
}

fn decode_line(raw: &[u8]) -> Option<Result<String, ApiError>> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(err) => {
            warn!(error = %err, "dropping SSE line with invalid UTF-8");
            return None;
        }
    };
    let payload = line.strip_prefix("data:").map(str::trim_start)?;
    decode_data_payload(payload)
}

pub(crate) fn decode_data_payload(payload: &str) -> Option<Result<String, ApiError>> {
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(source) => {
            return Some(Err(ApiError::Decode {
                payload: payload.to_string(),
                source,
            }))
        }
    };

    if value.get("error").is_some() {
        let message =
            extract_error_summary(&value).unwrap_or_else(|| "unknown error".to_string());
        return Some(Err(ApiError::Remote {
            message,
            payload: payload.to_string(),
        }));
    }

    match serde_json::from_value::<GenerateContentResponse>(value) {
        Ok(response) => response.text().filter(|text| !text.is_empty()).map(Ok),
        Err(source) => Some(Err(ApiError::Decode {
            payload: payload.to_string(),
            source,
        })),
    }
}

pub(crate) fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        })?;

    Some(collapse_whitespace(&summary))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct SseState<S> {
    inner: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, ApiError>>,
    finished: bool,
}

/// Adapts a response body into a [`FragmentStream`]. The first error ends
/// the stream.
pub(crate) fn sse_fragments<S, B>(inner: S) -> FragmentStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = SseState {
        inner,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.pending.clear();
                    state.finished = true;
                }
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.inner.next().await {
                Some(Ok(bytes)) => {
                    let events = state.decoder.push(bytes.as_ref());
                    state.pending.extend(events);
                }
                Some(Err(err)) => state.pending.push_back(Err(ApiError::Transport(err))),
                None => {
                    let events = state.decoder.finish();
                    state.pending.extend(events);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> String {
        format!(
            "data: {}\r\n\r\n",
            serde_json::json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
        )
    }

    #[test]
    fn decode_data_payload_handles_spacing_variants() {
        let with_space = r#" {"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#;
        let decoder_line = format!("data:{with_space}");
        let mut decoder = SseDecoder::default();
        let events = decoder.push(format!("{decoder_line}\n").as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().expect("text"), "Hello");

        let tight = r#"data:{"candidates":[{"content":{"parts":[{"text":"World"}]}}]}"#;
        let events = decoder.push(format!("{tight}\n").as_bytes());
        assert_eq!(events[0].as_ref().expect("text"), "World");
    }

    #[test]
    fn decoder_reassembles_lines_split_across_chunks() {
        let raw = event("split me");
        let (head, tail) = raw.split_at(17);
        let mut decoder = SseDecoder::default();

        assert!(decoder.push(head.as_bytes()).is_empty());
        let events = decoder.push(tail.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().expect("text"), "split me");
    }

    #[test]
    fn decoder_flushes_unterminated_final_line() {
        let mut decoder = SseDecoder::default();
        let raw = event("tail");
        let unterminated = raw.trim_end();
        assert!(decoder.push(unterminated.as_bytes()).is_empty());
        let events = decoder.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().expect("text"), "tail");
    }

    #[test]
    fn non_data_lines_and_textless_events_are_skipped() {
        assert!(decode_data_payload("").is_none());
        assert!(decode_data_payload("[DONE]").is_none());
        assert!(decode_data_payload(r#"{"candidates":[{"finishReason":"STOP"}]}"#).is_none());

        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b": keep-alive\nevent: message\n\n").is_empty());
    }

    #[test]
    fn error_object_in_stream_becomes_remote_error() {
        let payload = r#"{"error":{"code":429,"message":"Resource   has been\nexhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        match decode_data_payload(payload) {
            Some(Err(ApiError::Remote { message, payload: raw })) => {
                assert_eq!(message, "Resource has been exhausted");
                assert_eq!(raw, payload);
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_payload_becomes_decode_error() {
        match decode_data_payload("{not json") {
            Some(Err(ApiError::Decode { payload, .. })) => assert_eq!(payload, "{not json"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn status_error_display_prefers_json_summary() {
        let err = ApiError::Status {
            status: 400,
            body: r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API returned HTTP 400: API key not valid. Please pass a valid API key."
        );

        let plain = ApiError::Status {
            status: 502,
            body: "  Bad\n gateway ".to_string(),
        };
        assert_eq!(plain.to_string(), "API returned HTTP 502: Bad gateway");
    }

    #[tokio::test]
    async fn sse_fragments_yields_texts_in_order_and_stops_after_error() {
        let body = format!(
            "{}{}data: {{\"error\":{{\"message\":\"boom\"}}}}\n\n{}",
            event("Hi"),
            event(" there"),
            event("never delivered")
        );
        let chunks: Vec<Result<Vec<u8>, reqwest::Error>> = body
            .as_bytes()
            .chunks(7)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();

        let items: Vec<_> = sse_fragments(stream::iter(chunks)).collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().expect("first"), "Hi");
        assert_eq!(items[1].as_ref().expect("second"), " there");
        assert!(matches!(items[2], Err(ApiError::Remote { .. })));
    }
}
