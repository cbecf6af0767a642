use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::app::{Overlay, SUGGESTIONS};
use crate::core::models::ModelKind;

pub(super) fn handle_input_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::SelectModel { kind } => {
            select_model(app, kind);
            None
        }
        AppAction::ToggleImageMode => {
            if app.is_sending() {
                return None;
            }
            app.image_mode = !app.image_mode;
            app.selected_model = if app.image_mode {
                ModelKind::Image
            } else {
                app.default_model
            };
            None
        }
        AppAction::DismissError => {
            app.error = None;
            None
        }
        AppAction::UseSuggestion { index } => {
            if let Some(suggestion) = SUGGESTIONS.get(index) {
                app.ui.set_input_text(suggestion);
            }
            None
        }
        AppAction::SaveImages => save_images(app),
        AppAction::ImagesSaved { result } => {
            match result {
                Ok(paths) if paths.is_empty() => app.ui.set_status("No images written"),
                Ok(paths) => {
                    let location = paths
                        .first()
                        .and_then(|path| path.parent())
                        .map(|dir| dir.display().to_string())
                        .filter(|dir| !dir.is_empty())
                        .unwrap_or_else(|| ".".to_string());
                    app.ui
                        .set_status(format!("Saved {} image(s) to {location}", paths.len()));
                }
                Err(err) => app.ui.set_status(format!("Failed to save images: {err}")),
            }
            None
        }
        AppAction::OpenModelPicker => {
            if !app.image_mode && app.user.is_some() {
                app.ui.open_model_picker(app.selected_model);
            }
            None
        }
        AppAction::OpenProfile => {
            if let Some(name) = app.user.as_ref().map(|user| user.name.clone()) {
                app.ui.open_profile(&name);
            }
            None
        }
        AppAction::CloseOverlay => {
            app.ui.overlay = None;
            None
        }
        AppAction::PickerMove { delta } => {
            if let Some(Overlay::ModelPicker { selected }) = app.ui.overlay.as_mut() {
                let last = ModelKind::TEXT_MODELS.len() - 1;
                *selected = selected.saturating_add_signed(delta).min(last);
            }
            None
        }
        AppAction::PickerConfirm => {
            if let Some(Overlay::ModelPicker { selected }) = app.ui.overlay.clone() {
                if let Some(kind) = ModelKind::TEXT_MODELS.get(selected) {
                    select_model(app, *kind);
                }
            }
            None
        }
        AppAction::ToggleSidebar => {
            app.ui.sidebar_open = !app.ui.sidebar_open;
            None
        }
        AppAction::ScrollTranscript { lines } => {
            scroll_by(app, lines);
            None
        }
        AppAction::ScrollPage { up } => {
            let page = i32::from(ctx.term_height.saturating_sub(8).max(1));
            scroll_by(app, if up { page } else { -page });
            None
        }
        AppAction::Quit => {
            app.ui.exit_requested = true;
            None
        }
        _ => unreachable!("non-input action routed to input handler"),
    }
}

fn select_model(app: &mut App, kind: ModelKind) {
    if app.image_mode || kind == ModelKind::Image {
        return;
    }
    app.selected_model = kind;
    app.ui.overlay = None;
}

fn scroll_by(app: &mut App, lines: i32) {
    let current = i32::from(app.ui.scroll_from_bottom);
    app.ui.scroll_from_bottom = (current + lines).clamp(0, i32::from(u16::MAX)) as u16;
}

fn save_images(app: &mut App) -> Option<AppCommand> {
    let session = app.sessions.active()?;
    let images = session
        .messages
        .iter()
        .rev()
        .filter(|message| message.is_assistant())
        .find_map(|message| message.images.clone().filter(|parts| !parts.is_empty()));
    match images {
        Some(images) => Some(AppCommand::SaveImages {
            session_id: session.id.clone(),
            images,
        }),
        None => {
            app.ui.set_status("No generated images in this chat");
            None
        }
    }
}
