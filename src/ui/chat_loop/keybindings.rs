use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::core::app::{App, AppAction, Overlay};
use crate::core::constants::SUGGESTIONS;

const WHEEL_LINES: u16 = 3;

/// Where a key press goes.
#[derive(Debug)]
pub(super) enum KeyRoute {
    Dispatch(Vec<AppAction>),
    /// Hand the key to the composer's text area.
    Edit,
    Ignore,
}

fn dispatch(action: AppAction) -> KeyRoute {
    KeyRoute::Dispatch(vec![action])
}

fn suggestion_slot_open(app: &App) -> bool {
    if !app.store.is_empty() || !app.ui.composer.attachments().is_empty() {
        return false;
    }
    let text = app.ui.composer.text();
    app.ui.composer.is_blank() || SUGGESTIONS.iter().any(|(_, prompt)| *prompt == text)
}

pub(super) fn route_key(app: &App, key: KeyEvent) -> KeyRoute {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')) {
        return dispatch(AppAction::Quit);
    }

    match app.ui.overlay {
        Some(Overlay::ConfirmClear) => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    dispatch(AppAction::ConfirmClear)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    dispatch(AppAction::CancelClear)
                }
                _ => KeyRoute::Ignore,
            };
        }
        Some(Overlay::Help) => {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                    dispatch(AppAction::ToggleHelp)
                }
                _ => KeyRoute::Ignore,
            };
        }
        None => {}
    }

    let single_line = app.ui.composer.line_count() <= 1;
    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
        {
            dispatch(AppAction::InsertIntoInput {
                text: "\n".to_string(),
            })
        }
        KeyCode::Enter => dispatch(AppAction::SubmitComposer),
        KeyCode::Char('l') | KeyCode::Char('L') if ctrl => dispatch(AppAction::RequestClear),
        KeyCode::Esc => {
            if app.ui.status().is_some() {
                dispatch(AppAction::ClearStatus)
            } else {
                KeyRoute::Ignore
            }
        }
        KeyCode::Tab if suggestion_slot_open(app) => dispatch(AppAction::CycleSuggestion),
        KeyCode::Tab => KeyRoute::Ignore,
        KeyCode::PageUp => dispatch(AppAction::PageUp),
        KeyCode::PageDown => dispatch(AppAction::PageDown),
        KeyCode::End if ctrl => dispatch(AppAction::ScrollToBottom),
        KeyCode::Up if single_line => dispatch(AppAction::ScrollUp { lines: 1 }),
        KeyCode::Down if single_line => dispatch(AppAction::ScrollDown { lines: 1 }),
        _ => KeyRoute::Edit,
    }
}

pub(super) fn route_mouse(event: MouseEvent) -> Option<AppAction> {
    match event.kind {
        MouseEventKind::ScrollUp => Some(AppAction::ScrollUp { lines: WHEEL_LINES }),
        MouseEventKind::ScrollDown => Some(AppAction::ScrollDown { lines: WHEEL_LINES }),
        _ => None,
    }
}
