use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{App, AppAction, AppCommand, Delivery};
use crate::core::app::{
    PendingEnhance, PendingRequest, RequestKind, AUTH_ERROR_BANNER, ENHANCE_ERROR_BANNER,
    GENERIC_ERROR_BANNER, IMAGE_FAILED, IMAGE_GENERATED, IMAGE_PLACEHOLDER,
};
use crate::core::chat_stream::RequestJob;
use crate::core::message::Message;
use crate::core::vendor::VendorErrorKind;

pub(super) fn handle_conversation_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SendMessage => send_message(app),
        AppAction::ResponseFragment { request_id, text } => {
            if let Some(pending) = app
                .pending_mut()
                .filter(|pending| pending.request_id == request_id)
            {
                pending.preview.push_str(&text);
            }
            None
        }
        AppAction::DeliverResponse {
            request_id,
            delivery,
        } => {
            deliver_response(app, request_id, delivery);
            None
        }
        AppAction::FailMessage { request_id, kind } => {
            if app.is_current_request(request_id) {
                fail_pending(app, kind);
            }
            None
        }
        AppAction::CancelRequest => {
            if app.is_sending() {
                fail_pending(app, VendorErrorKind::Cancelled);
            }
            None
        }
        AppAction::LoadTick { request_id } => {
            if app.is_current_request(request_id) && !app.load.tick() {
                app.stop_ticker();
            }
            None
        }
        AppAction::EnhancePrompt => enhance_prompt(app),
        AppAction::EnhanceCompleted { request_id, text } => {
            if app.take_enhance(request_id).is_some() {
                app.ui.set_input_text(&text);
            }
            None
        }
        AppAction::EnhanceFailed { request_id } => {
            if app.take_enhance(request_id).is_some() {
                app.error = Some(ENHANCE_ERROR_BANNER.to_string());
            }
            None
        }
        _ => unreachable!("non-conversation action routed to conversation handler"),
    }
}

fn send_message(app: &mut App) -> Option<AppCommand> {
    if app.is_sending() {
        return None;
    }
    let text = app.ui.input_text();
    if text.trim().is_empty() {
        return None;
    }
    let session_id = app.sessions.active_id()?.to_string();
    let kind = if app.image_mode {
        RequestKind::Image
    } else {
        RequestKind::Text
    };

    let now = Utc::now();
    let placeholder = Message::assistant(match kind {
        RequestKind::Image => IMAGE_PLACEHOLDER,
        RequestKind::Text => "",
    });
    let placeholder_id = placeholder.id.clone();
    let history = {
        let session = app.sessions.get_mut(&session_id)?;
        session.push_user_message(Message::user(text.as_str()), now);
        let history = session.messages.clone();
        session.push_message(placeholder);
        history
    };

    app.error = None;
    app.ui.clear_input();
    app.ui.scroll_from_bottom = 0;
    // The composer text was consumed; a late rewrite would clobber the next draft.
    app.enhancing = None;

    let ramp = app.load.start(&text);
    let request_id = app.allocate_request_id();
    let cancel_token = CancellationToken::new();
    let job = match kind {
        RequestKind::Text => RequestJob::Chat {
            history,
            model: app.selected_model_id().to_string(),
        },
        RequestKind::Image => RequestJob::Image { prompt: text },
    };
    debug!(request_id, session = %session_id, ?kind, "sending message");

    app.begin_request(PendingRequest::new(
        request_id,
        session_id,
        placeholder_id,
        kind,
        cancel_token.clone().drop_guard(),
    ));
    Some(AppCommand::SpawnRequest {
        job,
        cancel_token,
        request_id,
        ramp,
    })
}

fn deliver_response(app: &mut App, request_id: u64, delivery: Delivery) {
    if !app.is_current_request(request_id) {
        return;
    }
    if matches!(&delivery, Delivery::Text(text) if text.trim().is_empty()) {
        debug!(request_id, "empty reply treated as failure");
        fail_pending(app, VendorErrorKind::Transient);
        return;
    }
    let Some(pending) = app.settle_request() else {
        return;
    };

    let now = Utc::now();
    let Some(session) = app.sessions.get_mut(&pending.session_id) else {
        debug!(request_id, "session gone before delivery; dropping reply");
        return;
    };
    let Some(message) = session.message_mut(&pending.placeholder_id) else {
        return;
    };
    match delivery {
        Delivery::Text(text) => message.content = text,
        Delivery::Images(Some(parts)) => {
            message.content = IMAGE_GENERATED.to_string();
            message.images = Some(parts);
        }
        Delivery::Images(None) => message.content = IMAGE_FAILED.to_string(),
    }
    session.touch(now);
}

/// Settles the pending request without a reply: the placeholder goes away
/// and the banner reflects why.
fn fail_pending(app: &mut App, kind: VendorErrorKind) {
    let Some(pending) = app.settle_request() else {
        return;
    };
    if let Some(session) = app.sessions.get_mut(&pending.session_id) {
        session.remove_message(&pending.placeholder_id);
    }
    debug!(request_id = pending.request_id, ?kind, "request settled without reply");
    app.error = match kind {
        VendorErrorKind::AuthConfiguration => Some(AUTH_ERROR_BANNER.to_string()),
        VendorErrorKind::Transient => Some(GENERIC_ERROR_BANNER.to_string()),
        VendorErrorKind::Cancelled => app.error.take(),
    };
}

fn enhance_prompt(app: &mut App) -> Option<AppCommand> {
    if app.is_enhancing() || app.is_sending() || app.image_mode {
        return None;
    }
    let input = app.ui.input_text();
    let prompt = input.trim();
    if prompt.is_empty() {
        return None;
    }

    app.error = None;
    let request_id = app.allocate_request_id();
    let cancel_token = CancellationToken::new();
    app.begin_enhance(PendingEnhance::new(
        request_id,
        cancel_token.clone().drop_guard(),
    ));
    Some(AppCommand::SpawnRequest {
        job: RequestJob::Enhance {
            prompt: prompt.to_string(),
        },
        cancel_token,
        request_id,
        ramp: false,
    })
}
