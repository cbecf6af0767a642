use chrono::Utc;
use tracing::debug;

use super::{App, AppAction, AppCommand};
use crate::core::app::Screen;
use crate::core::user::User;

pub(super) fn handle_session_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Login { name } => {
            login(app, &name);
            None
        }
        AppAction::Logout => {
            logout(app);
            None
        }
        AppAction::UpdateProfile { name } => {
            let renamed = app.user.as_mut().is_some_and(|user| user.rename(&name));
            if renamed {
                app.ui.overlay = None;
                app.ui.set_status("Profile updated");
            }
            None
        }
        AppAction::NewChat => {
            new_chat(app);
            None
        }
        AppAction::SelectSession { session_id } => {
            if app.sessions.select(&session_id) {
                app.ui.scroll_from_bottom = 0;
            }
            None
        }
        AppAction::DeleteSession { session_id } => {
            delete_session(app, &session_id);
            None
        }
        _ => unreachable!("non-session action routed to session handler"),
    }
}

fn login(app: &mut App, name: &str) {
    if app.user.is_some() {
        return;
    }
    let Some(user) = User::login(name) else {
        return;
    };
    debug!(user = %user.id, "logged in");
    app.user = Some(user);
    app.ui.screen = Screen::Chat;
    if app.sessions.is_empty() {
        new_chat(app);
    }
}

fn logout(app: &mut App) {
    if app.user.take().is_none() {
        return;
    }
    app.shutdown();
    app.sessions.clear();
    app.error = None;
    app.image_mode = false;
    app.selected_model = app.default_model;
    app.ui.reset_for_login();
    debug!("logged out");
}

fn new_chat(app: &mut App) {
    if app.user.is_none() {
        return;
    }
    app.sessions.create(Utc::now());
    app.image_mode = false;
    app.selected_model = app.default_model;
    app.ui.scroll_from_bottom = 0;
}

fn delete_session(app: &mut App, session_id: &str) {
    if app
        .pending()
        .is_some_and(|pending| pending.session_id == session_id)
    {
        app.settle_request();
    }
    if app.sessions.delete(session_id).is_some() {
        debug!(session = session_id, "session deleted");
    }
    // A signed-in user always has somewhere to type.
    if app.user.is_some() && app.sessions.is_empty() {
        new_chat(app);
    }
}
