#[cfg(test)]
use crate::core::app::{apply_action, App, AppAction, AppActionContext, UiState};
#[cfg(test)]
use crate::core::models::{ModelCatalog, ModelKind};
#[cfg(test)]
use crate::ui::theme::Theme;

#[cfg(test)]
pub fn create_test_app() -> App {
    App::new(
        ModelCatalog::default(),
        ModelKind::Pro,
        UiState::new(Theme::basic(), true),
    )
}

/// A test app with a logged-in user and the automatically created chat.
#[cfg(test)]
pub fn create_logged_in_app() -> App {
    let mut app = create_test_app();
    apply_action(
        &mut app,
        AppAction::Login {
            name: "Ada Lovelace".to_string(),
        },
        AppActionContext::default(),
    );
    app
}
