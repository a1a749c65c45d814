use tracing::{debug, warn};

use super::{streaming, App, AppAction, AppActionContext, AppCommand};
use crate::commands::{is_registered_command, process_input, CommandResult};

pub(super) fn handle_input_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::SubmitComposer => submit_composer(app, ctx),
        AppAction::ProcessCommand { input } => handle_process_command(app, input, ctx),
        AppAction::AttachmentEncoded { path, result } => {
            match result {
                Ok(Some(attachment)) => {
                    debug!(path = %path.display(), bytes = attachment.byte_len(), "image attached");
                    app.ui.composer.attach(attachment);
                }
                Ok(None) => warn!(path = %path.display(), "attachment ignored: not an image"),
                Err(err) => warn!(path = %path.display(), error = %err, "attachment dropped"),
            }
            None
        }
        AppAction::ClearStatus => {
            app.ui.clear_status();
            None
        }
        AppAction::SetStatus { message } => {
            app.ui.set_status(message);
            None
        }
        AppAction::InsertIntoInput { text } => {
            if !text.is_empty() {
                app.ui.composer.insert_str(&text);
            }
            None
        }
        AppAction::CycleSuggestion => {
            app.ui.cycle_suggestion();
            None
        }
        AppAction::ToggleHelp => {
            app.ui.toggle_help();
            None
        }
        AppAction::Quit => {
            app.ui.exit_requested = true;
            None
        }
        AppAction::ScrollUp { lines } => {
            app.ui.scroll_up(lines);
            None
        }
        AppAction::ScrollDown { lines } => {
            app.ui.scroll_down(lines);
            None
        }
        AppAction::PageUp => {
            app.ui.scroll_up(page_size(ctx));
            None
        }
        AppAction::PageDown => {
            app.ui.scroll_down(page_size(ctx));
            None
        }
        AppAction::ScrollToBottom => {
            app.ui.scroll_to_bottom();
            None
        }
        _ => unreachable!("non-input action routed to input handler"),
    }
}

fn page_size(ctx: AppActionContext) -> u16 {
    ctx.term_height.saturating_sub(8).max(1)
}

/// Registered commands run at any time and leave queued images alone; a
/// message is only taken from the composer when no reply is in flight, so a
/// refused send keeps what was typed.
fn submit_composer(app: &mut App, ctx: AppActionContext) -> Option<AppCommand> {
    let text = app.ui.composer.text();
    if is_registered_command(&text) {
        app.ui.composer.clear_text();
        return handle_process_command(app, text, ctx);
    }
    if !app.ui.composer.can_send() {
        return None;
    }
    if app.is_busy() {
        app.ui.set_status("Wait for the current reply to finish");
        return None;
    }

    let (text, attachments) = app.ui.composer.take();
    streaming::submit(app, text, attachments)
}

fn handle_process_command(
    app: &mut App,
    input: String,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    if input.trim().is_empty() {
        return None;
    }

    match process_input(app, &input) {
        CommandResult::Continue => None,
        CommandResult::ProcessAsMessage(message) => {
            if app.is_busy() {
                app.ui.composer.set_text(&message);
                app.ui.set_status("Wait for the current reply to finish");
                return None;
            }
            streaming::submit(app, message, Vec::new())
        }
        CommandResult::Attach(path) => Some(AppCommand::EncodeAttachment(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::Overlay;
    use crate::core::attachment::Attachment;
    use crate::utils::test_utils::create_test_app;
    use std::path::PathBuf;

    fn default_ctx() -> AppActionContext {
        AppActionContext {
            term_width: 80,
            term_height: 24,
        }
    }

    fn image() -> Attachment {
        Attachment {
            data: "iVBORw0K".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    #[test]
    fn submit_takes_text_and_images_from_composer() {
        let mut app = create_test_app();
        app.ui.composer.set_text("What is this?");
        app.ui.composer.attach(image());

        let command = handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        let Some(AppCommand::SpawnStream(params)) = command else {
            panic!("expected spawn stream command");
        };
        assert_eq!(params.turn.user_turn.parts.len(), 2);
        assert!(app.ui.composer.is_blank());
        assert!(app.ui.composer.attachments().is_empty());
        assert_eq!(app.store.messages()[0].images.len(), 1);
    }

    #[test]
    fn blank_composer_submits_nothing() {
        let mut app = create_test_app();
        app.ui.composer.set_text("  ");
        assert!(handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx()).is_none());
        assert!(app.store.is_empty());
    }

    #[test]
    fn busy_submit_keeps_the_draft() {
        let mut app = create_test_app();
        app.ui.composer.set_text("first");
        handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        app.ui.composer.set_text("second");
        let command = handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        assert!(command.is_none());
        assert_eq!(app.ui.composer.text(), "second");
        assert_eq!(app.store.len(), 2);
        assert!(app.ui.status().is_some());
    }

    #[test]
    fn commands_run_while_busy() {
        let mut app = create_test_app();
        app.ui.composer.set_text("first");
        handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        app.ui.composer.set_text("/clear");
        handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        assert_eq!(app.ui.overlay, Some(Overlay::ConfirmClear));
        assert!(app.ui.composer.is_blank());
    }

    #[test]
    fn attach_command_asks_for_encoding() {
        let mut app = create_test_app();
        app.ui.composer.set_text("/attach photo.jpg");
        let command = handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());
        match command {
            Some(AppCommand::EncodeAttachment(path)) => {
                assert_eq!(path, PathBuf::from("photo.jpg"))
            }
            _ => panic!("expected encode command"),
        }
    }

    #[test]
    fn second_attach_with_an_image_queued_is_still_a_command() {
        let mut app = create_test_app();
        app.ui.composer.attach(image());
        app.ui.composer.set_text("/attach second.png");

        let command = handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        match command {
            Some(AppCommand::EncodeAttachment(path)) => {
                assert_eq!(path, PathBuf::from("second.png"))
            }
            _ => panic!("expected encode command"),
        }
        assert!(app.store.is_empty());
        assert_eq!(app.ui.composer.attachments().len(), 1);
        assert!(app.ui.composer.is_blank());
    }

    #[test]
    fn detach_with_images_queued_removes_one_and_sends_nothing() {
        let mut app = create_test_app();
        app.ui.composer.attach(image());
        app.ui.composer.attach(image());
        app.ui.composer.set_text("/detach");

        let command = handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        assert!(command.is_none());
        assert!(app.store.is_empty());
        assert_eq!(app.ui.composer.attachments().len(), 1);
        assert_eq!(app.ui.status(), Some("Removed image 2"));
    }

    #[test]
    fn unknown_slash_text_with_an_image_is_sent_as_a_message() {
        let mut app = create_test_app();
        app.ui.composer.attach(image());
        app.ui.composer.set_text("/shrug");

        let command = handle_input_action(&mut app, AppAction::SubmitComposer, default_ctx());

        assert!(matches!(command, Some(AppCommand::SpawnStream(_))));
        assert_eq!(app.store.messages()[0].text, "/shrug");
        assert_eq!(app.store.messages()[0].images.len(), 1);
        assert!(app.ui.composer.attachments().is_empty());
    }

    #[test]
    fn encoded_attachment_lands_in_composer_and_failures_are_dropped() {
        let mut app = create_test_app();
        let ctx = default_ctx();
        handle_input_action(
            &mut app,
            AppAction::AttachmentEncoded {
                path: PathBuf::from("a.png"),
                result: Ok(Some(image())),
            },
            ctx,
        );
        handle_input_action(
            &mut app,
            AppAction::AttachmentEncoded {
                path: PathBuf::from("missing.png"),
                result: Err("not found".into()),
            },
            ctx,
        );
        handle_input_action(
            &mut app,
            AppAction::AttachmentEncoded {
                path: PathBuf::from("notes.txt"),
                result: Ok(None),
            },
            ctx,
        );

        assert_eq!(app.ui.composer.attachments().len(), 1);
        assert!(app.ui.status().is_none());
    }

    #[test]
    fn paging_uses_terminal_height() {
        let mut app = create_test_app();
        app.ui.set_max_scroll(100);
        handle_input_action(&mut app, AppAction::PageUp, default_ctx());
        assert_eq!(app.ui.scroll_offset(), 84);
        handle_input_action(&mut app, AppAction::PageDown, default_ctx());
        assert!(app.ui.is_auto_scrolling());
    }
}
