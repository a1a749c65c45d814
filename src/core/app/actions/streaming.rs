use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::app::{Overlay, SubmitOutcome};
use crate::core::attachment::Attachment;
use crate::core::chat_stream::StreamMessage;

pub(super) fn handle_streaming_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::AppendResponseChunk { content, stream_id } => {
            app.handle_stream_message(StreamMessage::Chunk(content), stream_id);
            None
        }
        AppAction::StreamErrored { message, stream_id } => {
            app.handle_stream_message(StreamMessage::Error(message), stream_id);
            None
        }
        AppAction::StreamCompleted { stream_id } => {
            app.handle_stream_message(StreamMessage::End, stream_id);
            None
        }
        AppAction::RequestClear => {
            app.ui.overlay = Some(Overlay::ConfirmClear);
            None
        }
        AppAction::ConfirmClear => {
            app.ui.overlay = None;
            app.conversation().clear();
            app.ui.reset_scroll();
            app.ui.set_status("Started a new chat");
            None
        }
        AppAction::CancelClear => {
            if app.ui.overlay == Some(Overlay::ConfirmClear) {
                app.ui.overlay = None;
            }
            None
        }
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

pub(super) fn submit(
    app: &mut App,
    text: String,
    attachments: Vec<Attachment>,
) -> Option<AppCommand> {
    match app.conversation().submit(text, attachments) {
        SubmitOutcome::Started(params) => {
            app.ui.scroll_to_bottom();
            Some(AppCommand::SpawnStream(params))
        }
        SubmitOutcome::Failed => {
            app.ui.scroll_to_bottom();
            None
        }
        SubmitOutcome::Busy => {
            app.ui.set_status("Wait for the current reply to finish");
            None
        }
        SubmitOutcome::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    fn default_ctx() -> AppActionContext {
        AppActionContext {
            term_width: 80,
            term_height: 24,
        }
    }

    fn spawn_stream_id(command: Option<AppCommand>) -> u64 {
        match command {
            Some(AppCommand::SpawnStream(params)) => params.stream_id,
            Some(other) => panic!("unexpected app command: {other:?}"),
            None => panic!("expected spawn stream command"),
        }
    }

    #[test]
    fn chunks_fold_into_the_placeholder_and_completion_settles() {
        let mut app = create_test_app();
        let ctx = default_ctx();

        let stream_id = spawn_stream_id(submit(&mut app, "Hello".into(), Vec::new()));
        assert!(app.is_busy());

        for content in ["Hi", " there"] {
            handle_streaming_action(
                &mut app,
                AppAction::AppendResponseChunk {
                    content: content.into(),
                    stream_id,
                },
                ctx,
            );
        }
        handle_streaming_action(&mut app, AppAction::StreamCompleted { stream_id }, ctx);

        assert!(!app.is_busy());
        assert_eq!(app.store.last().map(|m| m.text.as_str()), Some("Hi there"));
    }

    #[test]
    fn stream_error_turns_placeholder_into_apology() {
        let mut app = create_test_app();
        let ctx = default_ctx();

        let stream_id = spawn_stream_id(submit(&mut app, "Hello".into(), Vec::new()));
        handle_streaming_action(
            &mut app,
            AppAction::StreamErrored {
                message: "API returned HTTP 403: denied".into(),
                stream_id,
            },
            ctx,
        );
        handle_streaming_action(&mut app, AppAction::StreamCompleted { stream_id }, ctx);

        let reply = app.store.last().expect("reply");
        assert!(reply.is_error);
        assert_eq!(app.store.len(), 2);
        assert!(!app.is_busy());
    }

    #[test]
    fn busy_submit_sets_status_and_appends_nothing() {
        let mut app = create_test_app();

        spawn_stream_id(submit(&mut app, "one".into(), Vec::new()));
        let command = submit(&mut app, "two".into(), Vec::new());

        assert!(command.is_none());
        assert_eq!(app.store.len(), 2);
        assert!(app.ui.status().is_some());
    }

    #[test]
    fn clear_needs_confirmation() {
        let mut app = create_test_app();
        let ctx = default_ctx();
        spawn_stream_id(submit(&mut app, "hello".into(), Vec::new()));

        handle_streaming_action(&mut app, AppAction::RequestClear, ctx);
        assert_eq!(app.ui.overlay, Some(Overlay::ConfirmClear));
        handle_streaming_action(&mut app, AppAction::CancelClear, ctx);
        assert_eq!(app.ui.overlay, None);
        assert_eq!(app.store.len(), 2);

        handle_streaming_action(&mut app, AppAction::RequestClear, ctx);
        handle_streaming_action(&mut app, AppAction::ConfirmClear, ctx);
        assert!(app.store.is_empty());
        assert!(app.sessions.current().is_none());
        assert_eq!(app.ui.overlay, None);
    }
}
