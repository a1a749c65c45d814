use std::fmt;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::client::ModelClient;
use crate::core::session::TurnRequest;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

pub type StreamSender = mpsc::UnboundedSender<(StreamMessage, u64)>;
pub type StreamReceiver = mpsc::UnboundedReceiver<(StreamMessage, u64)>;

pub struct StreamParams {
    pub client: Arc<dyn ModelClient>,
    pub turn: TurnRequest,
    pub stream_id: u64,
}

impl fmt::Debug for StreamParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamParams")
            .field("turn", &self.turn)
            .field("stream_id", &self.stream_id)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: StreamSender,
}

impl ChatStreamService {
    pub fn new() -> (Self, StreamReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(forward_fragments(params, tx));
    }
}

/// Pulls one reply and forwards it as `Chunk*` followed by `End`, or by
/// `Error` then `End` on failure. Stops early once the receiver is gone.
pub async fn forward_fragments(params: StreamParams, tx: StreamSender) {
    let StreamParams {
        client,
        turn,
        stream_id,
    } = params;

    debug!(stream_id, session = %turn.session_id, model = %turn.model, "stream starting");

    let mut fragments = match client.stream_generate(&turn.model, &turn.request).await {
        Ok(fragments) => fragments,
        Err(err) => {
            let _ = tx.send((StreamMessage::Error(err.to_string()), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            return;
        }
    };

    let mut forwarded = 0usize;
    while let Some(item) = fragments.next().await {
        match item {
            Ok(text) => {
                if text.is_empty() {
                    continue;
                }
                if tx.send((StreamMessage::Chunk(text), stream_id)).is_err() {
                    debug!(stream_id, "receiver dropped; abandoning stream");
                    return;
                }
                forwarded += 1;
            }
            Err(err) => {
                let _ = tx.send((StreamMessage::Error(err.to_string()), stream_id));
                let _ = tx.send((StreamMessage::End, stream_id));
                return;
            }
        }
    }

    debug!(stream_id, fragments = forwarded, "stream finished");
    let _ = tx.send((StreamMessage::End, stream_id));
}
