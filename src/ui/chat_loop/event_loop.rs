use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::prelude::Size;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::keybindings::{route_key, route_mouse, KeyRoute};
use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope,
    AppCommand, SendPhase,
};
use crate::core::attachment::encode_file;
use crate::core::chat_stream::{ChatStreamService, StreamMessage, StreamReceiver};
use crate::ui::renderer::ui;

const PULSE_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn context_for(size: Size) -> AppActionContext {
    AppActionContext {
        term_width: size.width,
        term_height: size.height,
    }
}

fn try_draw_frame(
    app: &mut App,
    terminal: &mut ChatTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    terminal.draw(|f| ui(f, app))?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

/// Applies terminal input. Returns whether anything was handled.
fn process_ui_events(
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
    ctx: AppActionContext,
) -> bool {
    let mut events_processed = false;

    while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
        events_processed = true;
        match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => match route_key(app, key) {
                KeyRoute::Dispatch(actions) => dispatcher.dispatch_many(actions, ctx),
                KeyRoute::Edit => {
                    app.ui.composer.input(tui_textarea::Input::from(key));
                }
                KeyRoute::Ignore => {}
            },
            Event::Mouse(mouse) => {
                if let Some(action) = route_mouse(mouse) {
                    dispatcher.dispatch(action, ctx);
                }
            }
            Event::Paste(text) => {
                let text = sanitize_pasted_text(&text);
                if !text.is_empty() {
                    dispatcher.dispatch(AppAction::InsertIntoInput { text }, ctx);
                }
            }
            _ => {}
        }
    }

    events_processed
}

/// Turns queued stream messages into actions. Adjacent chunks are joined so a
/// burst of fragments costs one fold and one redraw.
fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut StreamReceiver,
    ctx: AppActionContext,
    current_stream_id: u64,
) -> bool {
    let mut received_any = false;
    let mut actions = Vec::new();
    let mut coalesced_chunks = String::new();

    let flush = |chunks: &mut String, actions: &mut Vec<AppAction>| {
        if !chunks.is_empty() {
            actions.push(AppAction::AppendResponseChunk {
                content: std::mem::take(chunks),
                stream_id: current_stream_id,
            });
        }
    };

    while let Ok((message, msg_stream_id)) = rx.try_recv() {
        if msg_stream_id != current_stream_id {
            debug!(stream_id = msg_stream_id, "dropping message from stale stream");
            continue;
        }
        received_any = true;

        match message {
            StreamMessage::Chunk(content) => coalesced_chunks.push_str(&content),
            StreamMessage::Error(err) => {
                flush(&mut coalesced_chunks, &mut actions);
                actions.push(AppAction::StreamErrored {
                    message: err,
                    stream_id: msg_stream_id,
                });
            }
            StreamMessage::End => {
                flush(&mut coalesced_chunks, &mut actions);
                actions.push(AppAction::StreamCompleted {
                    stream_id: msg_stream_id,
                });
            }
        }
    }
    flush(&mut coalesced_chunks, &mut actions);

    if !actions.is_empty() {
        dispatcher.dispatch_many(actions, ctx);
    }

    received_any
}

fn spawn_attachment_encoder(dispatcher: AppActionDispatcher, path: std::path::PathBuf) {
    tokio::spawn(async move {
        let result = encode_file(&path).await.map_err(|err| err.to_string());
        dispatcher.dispatch(
            AppAction::AttachmentEncoded { path, result },
            AppActionContext::default(),
        );
    });
}

fn drain_action_queue(
    app: &mut App,
    dispatcher: &AppActionDispatcher,
    stream_service: &ChatStreamService,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = apply_actions(app, pending);
    for cmd in commands {
        match cmd {
            AppCommand::SpawnStream(params) => stream_service.spawn_stream(params),
            AppCommand::EncodeAttachment(path) => {
                spawn_attachment_encoder(dispatcher.clone(), path)
            }
        }
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(mut app: App) -> Result<(), Box<dyn Error>> {
    info!(model = %app.model(), "chat started");

    let mut terminal = setup_terminal()?;

    let (stream_service, mut stream_rx) = ChatStreamService::new();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;
    let mut last_pulse = Instant::now();

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if app.ui.exit_requested {
            break 'main_loop Ok(());
        }

        if let Err(err) = try_draw_frame(
            &mut app,
            &mut terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        ) {
            break 'main_loop Err(err.into());
        }

        let ctx = context_for(terminal.size().unwrap_or_default());

        let events_processed = process_ui_events(&mut app, &mut event_rx, &dispatcher, ctx);
        let received_any = process_stream_updates(
            &dispatcher,
            &mut stream_rx,
            ctx,
            app.stream.current_stream_id(),
        );
        let actions_applied =
            drain_action_queue(&mut app, &dispatcher, &stream_service, &mut action_rx);

        if events_processed || received_any || actions_applied {
            request_redraw = true;
        }

        let now = Instant::now();
        if app.ui.expire_status(now) {
            request_redraw = true;
        }
        if app.phase() == SendPhase::AwaitingFirstFragment
            && now.duration_since(last_pulse) >= PULSE_INTERVAL
        {
            last_pulse = now;
            request_redraw = true;
        }

        if !events_processed && !received_any && !actions_applied {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    info!("chat ended");

    result
}
