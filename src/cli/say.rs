//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::core::app::{App, LastOutcome, SubmitOutcome};
use crate::core::attachment::encode_file;
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::constants::ERROR_APOLOGY;

/// Runs a single turn and streams the reply to stdout. Returns whether the
/// reply arrived without error.
pub async fn run_say(
    mut app: App,
    prompt: Vec<String>,
    images: Vec<PathBuf>,
) -> Result<bool, Box<dyn Error>> {
    let prompt = prompt.join(" ");

    let mut attachments = Vec::new();
    for path in images {
        match encode_file(&path).await {
            Ok(Some(attachment)) => attachments.push(attachment),
            Ok(None) => warn!(path = %path.display(), "not an image; skipping"),
            Err(err) => warn!(error = %err, "attachment dropped"),
        }
    }

    let params = match app.conversation().submit(prompt, attachments) {
        SubmitOutcome::Started(params) => params,
        SubmitOutcome::Empty => {
            eprintln!("Usage: timmgpt say [--image PATH]... <prompt>");
            return Ok(false);
        }
        SubmitOutcome::Failed | SubmitOutcome::Busy => {
            eprintln!("❌ {ERROR_APOLOGY}");
            return Ok(false);
        }
    };

    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(params);

    let mut stdout = io::stdout();
    while let Some((message, stream_id)) = rx.recv().await {
        let done = message == StreamMessage::End;
        if let StreamMessage::Chunk(content) = &message {
            print!("{content}");
            stdout.flush()?;
        }
        app.handle_stream_message(message, stream_id);
        if done {
            break;
        }
    }
    println!();

    if app.stream.last_outcome() == Some(LastOutcome::Error) {
        eprintln!("❌ {ERROR_APOLOGY}");
        return Ok(false);
    }
    Ok(true)
}
