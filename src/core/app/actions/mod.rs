mod conversation;
mod input;
mod sessions;

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::App;
use crate::core::chat_stream::{RequestEvent, RequestJob};
use crate::core::message::ImagePart;
use crate::core::models::ModelKind;
use crate::core::vendor::VendorErrorKind;

/// Final result of a chat or image request.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Text(String),
    Images(Option<Vec<ImagePart>>),
}

#[derive(Debug)]
pub enum AppAction {
    Login {
        name: String,
    },
    Logout,
    UpdateProfile {
        name: String,
    },
    NewChat,
    SelectSession {
        session_id: String,
    },
    DeleteSession {
        session_id: String,
    },
    SendMessage,
    ResponseFragment {
        request_id: u64,
        text: String,
    },
    DeliverResponse {
        request_id: u64,
        delivery: Delivery,
    },
    FailMessage {
        request_id: u64,
        kind: VendorErrorKind,
    },
    CancelRequest,
    LoadTick {
        request_id: u64,
    },
    EnhancePrompt,
    EnhanceCompleted {
        request_id: u64,
        text: String,
    },
    EnhanceFailed {
        request_id: u64,
    },
    SelectModel {
        kind: ModelKind,
    },
    ToggleImageMode,
    DismissError,
    UseSuggestion {
        index: usize,
    },
    SaveImages,
    ImagesSaved {
        result: Result<Vec<PathBuf>, String>,
    },
    OpenModelPicker,
    OpenProfile,
    CloseOverlay,
    PickerMove {
        delta: isize,
    },
    PickerConfirm,
    ToggleSidebar,
    ScrollTranscript {
        lines: i32,
    },
    ScrollPage {
        up: bool,
    },
    Quit,
}

impl AppAction {
    /// Translates a background request event into the action that applies it.
    pub fn from_request_event(event: RequestEvent, request_id: u64) -> Self {
        match event {
            RequestEvent::Fragment(text) => AppAction::ResponseFragment { request_id, text },
            RequestEvent::Text(text) => AppAction::DeliverResponse {
                request_id,
                delivery: Delivery::Text(text),
            },
            RequestEvent::Images(parts) => AppAction::DeliverResponse {
                request_id,
                delivery: Delivery::Images(parts),
            },
            RequestEvent::Enhanced(text) => AppAction::EnhanceCompleted { request_id, text },
            RequestEvent::EnhanceFailed(_) => AppAction::EnhanceFailed { request_id },
            RequestEvent::Failed(err) => AppAction::FailMessage {
                request_id,
                kind: err.kind(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    /// Queues one action. Returns `false` once the receiver is gone.
    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) -> bool {
        self.tx
            .send(AppActionEnvelope {
                action,
                context: ctx,
            })
            .is_ok()
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            self.dispatch(action, ctx);
        }
    }
}

/// Side effects the reducer asks the event loop to perform.
#[derive(Debug)]
pub enum AppCommand {
    SpawnRequest {
        job: RequestJob,
        cancel_token: CancellationToken,
        request_id: u64,
        ramp: bool,
    },
    SaveImages {
        session_id: String,
        images: Vec<ImagePart>,
    },
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::SendMessage
        | AppAction::ResponseFragment { .. }
        | AppAction::DeliverResponse { .. }
        | AppAction::FailMessage { .. }
        | AppAction::CancelRequest
        | AppAction::LoadTick { .. }
        | AppAction::EnhancePrompt
        | AppAction::EnhanceCompleted { .. }
        | AppAction::EnhanceFailed { .. } => conversation::handle_conversation_action(app, action),

        AppAction::Login { .. }
        | AppAction::Logout
        | AppAction::UpdateProfile { .. }
        | AppAction::NewChat
        | AppAction::SelectSession { .. }
        | AppAction::DeleteSession { .. } => sessions::handle_session_action(app, action),

        AppAction::SelectModel { .. }
        | AppAction::ToggleImageMode
        | AppAction::DismissError
        | AppAction::UseSuggestion { .. }
        | AppAction::SaveImages
        | AppAction::ImagesSaved { .. }
        | AppAction::OpenModelPicker
        | AppAction::OpenProfile
        | AppAction::CloseOverlay
        | AppAction::PickerMove { .. }
        | AppAction::PickerConfirm
        | AppAction::ToggleSidebar
        | AppAction::ScrollTranscript { .. }
        | AppAction::ScrollPage { .. }
        | AppAction::Quit => input::handle_input_action(app, action, ctx),
    }
}
