//! Maps key presses to app actions for the current screen and overlay.
//!
//! Resolution is pure: it reads the app and returns what should happen,
//! leaving the caller to dispatch the action or feed the key to a text area.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::app::{App, AppAction, Overlay, Screen};

#[derive(Debug)]
pub enum KeyResult {
    /// Dispatch this action.
    Action(AppAction),
    /// Feed the key to the focused text area.
    Edit,
    /// Insert a newline into the focused text area.
    Newline,
    /// Nothing to do.
    Ignored,
}

pub fn resolve_key(app: &App, key: &KeyEvent) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return KeyResult::Action(AppAction::Quit);
    }

    match (app.ui.screen, &app.ui.overlay) {
        (Screen::Login, _) => resolve_login_key(app, key),
        (Screen::Chat, Some(Overlay::ModelPicker { .. })) => resolve_picker_key(key),
        (Screen::Chat, Some(Overlay::Profile)) => resolve_profile_key(app, key),
        (Screen::Chat, None) => resolve_chat_key(app, key),
    }
}

fn resolve_login_key(app: &App, key: &KeyEvent) -> KeyResult {
    match key.code {
        KeyCode::Enter => KeyResult::Action(AppAction::Login {
            name: app.ui.login_name(),
        }),
        KeyCode::Esc => KeyResult::Action(AppAction::Quit),
        _ => KeyResult::Edit,
    }
}

fn resolve_picker_key(key: &KeyEvent) -> KeyResult {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => KeyResult::Action(AppAction::PickerMove { delta: -1 }),
        KeyCode::Down | KeyCode::Char('j') => KeyResult::Action(AppAction::PickerMove { delta: 1 }),
        KeyCode::Enter => KeyResult::Action(AppAction::PickerConfirm),
        KeyCode::Esc => KeyResult::Action(AppAction::CloseOverlay),
        _ => KeyResult::Ignored,
    }
}

fn resolve_profile_key(app: &App, key: &KeyEvent) -> KeyResult {
    match key.code {
        KeyCode::Enter => KeyResult::Action(AppAction::UpdateProfile {
            name: app.ui.profile_name(),
        }),
        KeyCode::Esc => KeyResult::Action(AppAction::CloseOverlay),
        _ => KeyResult::Edit,
    }
}

fn resolve_chat_key(app: &App, key: &KeyEvent) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl {
        let action = match key.code {
            KeyCode::Char('n') => AppAction::NewChat,
            KeyCode::Char('d') => match app.sessions.active_id() {
                Some(id) => AppAction::DeleteSession {
                    session_id: id.to_string(),
                },
                None => return KeyResult::Ignored,
            },
            KeyCode::Char('e') => AppAction::EnhancePrompt,
            KeyCode::Char('g') => AppAction::ToggleImageMode,
            KeyCode::Char('o') => AppAction::OpenModelPicker,
            KeyCode::Char('p') => AppAction::OpenProfile,
            KeyCode::Char('l') => AppAction::Logout,
            KeyCode::Char('b') => AppAction::ToggleSidebar,
            KeyCode::Char('s') => AppAction::SaveImages,
            _ => return KeyResult::Edit,
        };
        return KeyResult::Action(action);
    }

    if alt {
        return match key.code {
            KeyCode::Enter => KeyResult::Newline,
            KeyCode::Up => switch_session(app, -1),
            KeyCode::Down => switch_session(app, 1),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                KeyResult::Action(AppAction::UseSuggestion { index })
            }
            _ => KeyResult::Edit,
        };
    }

    match key.code {
        KeyCode::Enter => KeyResult::Action(AppAction::SendMessage),
        KeyCode::Esc if app.is_sending() => KeyResult::Action(AppAction::CancelRequest),
        KeyCode::Esc if app.error.is_some() => KeyResult::Action(AppAction::DismissError),
        KeyCode::Esc => KeyResult::Ignored,
        KeyCode::PageUp => KeyResult::Action(AppAction::ScrollPage { up: true }),
        KeyCode::PageDown => KeyResult::Action(AppAction::ScrollPage { up: false }),
        _ => KeyResult::Edit,
    }
}

fn switch_session(app: &App, offset: isize) -> KeyResult {
    match app.sessions.neighbor_of_active(offset) {
        Some(id) => KeyResult::Action(AppAction::SelectSession {
            session_id: id.to_string(),
        }),
        None => KeyResult::Ignored,
    }
}
