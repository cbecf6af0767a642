use std::time::Instant;

use tokio_util::sync::DropGuard;

use crate::core::load_indicator::LoadIndicator;
use crate::core::models::{ModelCatalog, ModelKind};
use crate::core::session::{ChatSession, SessionStore};
use crate::core::user::User;

pub mod actions;
pub mod ui_state;

#[cfg(test)]
mod tests;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand, Delivery,
};
pub use ui_state::{Overlay, Screen, UiState};

pub const AUTH_ERROR_BANNER: &str = "Authentication error: Please ensure your API key is correctly configured and has access to the model.";
pub const GENERIC_ERROR_BANNER: &str = "System overhead exceeded. Please retry your request.";
pub const ENHANCE_ERROR_BANNER: &str = "Failed to enhance prompt. Please try again.";

pub const IMAGE_PLACEHOLDER: &str = "Generating image...";
pub const IMAGE_GENERATED: &str = "Image generated:";
pub const IMAGE_FAILED: &str = "Failed to generate image.";

pub const SUGGESTIONS: [&str; 4] = [
    "Explain React Concurrent Mode architecture.",
    "Audit these smart contracts for vulnerabilities.",
    "Design a high-availability Kafka cluster.",
    "Optimize a PostgreSQL query for 10M rows.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Text,
    Image,
}

/// The one vendor request allowed in flight. Dropping it cancels the
/// request task and the load ticker.
#[derive(Debug)]
pub struct PendingRequest {
    pub request_id: u64,
    pub session_id: String,
    pub placeholder_id: String,
    pub kind: RequestKind,
    /// Text streamed so far, shown as a live preview of the pending turn.
    pub preview: String,
    _cancel: DropGuard,
    ticker: Option<DropGuard>,
}

#[derive(Debug)]
pub struct PendingEnhance {
    pub request_id: u64,
    _cancel: DropGuard,
}

pub struct App {
    pub user: Option<User>,
    pub sessions: SessionStore,
    pub catalog: ModelCatalog,
    pub default_model: ModelKind,
    pub selected_model: ModelKind,
    pub image_mode: bool,
    pub error: Option<String>,
    pub load: LoadIndicator,
    pub ui: UiState,
    pending: Option<PendingRequest>,
    enhancing: Option<PendingEnhance>,
    next_request_id: u64,
}

impl App {
    pub fn new(catalog: ModelCatalog, default_model: ModelKind, ui: UiState) -> Self {
        // The image model is only reachable through image mode.
        let default_model = if default_model == ModelKind::Image {
            ModelKind::Pro
        } else {
            default_model
        };
        Self {
            user: None,
            sessions: SessionStore::new(),
            catalog,
            default_model,
            selected_model: default_model,
            image_mode: false,
            error: None,
            load: LoadIndicator::default(),
            ui,
            pending: None,
            enhancing: None,
            next_request_id: 0,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_enhancing(&self) -> bool {
        self.enhancing.is_some()
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    pub fn is_current_request(&self, request_id: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.request_id == request_id)
    }

    pub fn selected_model_id(&self) -> &str {
        self.catalog.id(self.selected_model)
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.sessions.active()
    }

    /// Preview text for the pending turn if it belongs to `session_id`.
    pub fn preview_for(&self, session_id: &str) -> Option<(&str, &str)> {
        self.pending
            .as_ref()
            .filter(|pending| pending.session_id == session_id)
            .map(|pending| (pending.placeholder_id.as_str(), pending.preview.as_str()))
    }

    /// Hands the ramp ticker's guard to the request it belongs to. A guard
    /// for a request that already settled is dropped on the spot.
    pub fn attach_ticker(&mut self, request_id: u64, guard: DropGuard) {
        if let Some(pending) = self
            .pending
            .as_mut()
            .filter(|pending| pending.request_id == request_id)
        {
            pending.ticker = Some(guard);
        }
    }

    /// Stops background work. Called on logout and when the UI exits.
    pub fn shutdown(&mut self) {
        self.settle_request();
        self.enhancing = None;
    }

    fn allocate_request_id(&mut self) -> u64 {
        self.next_request_id += 1;
        self.next_request_id
    }

    fn begin_request(&mut self, pending: PendingRequest) {
        self.pending = Some(pending);
    }

    fn settle_request(&mut self) -> Option<PendingRequest> {
        let pending = self.pending.take()?;
        self.load.settle(Instant::now());
        Some(pending)
    }

    fn pending_mut(&mut self) -> Option<&mut PendingRequest> {
        self.pending.as_mut()
    }

    fn stop_ticker(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.ticker = None;
        }
    }

    fn begin_enhance(&mut self, enhance: PendingEnhance) {
        self.enhancing = Some(enhance);
    }

    fn take_enhance(&mut self, request_id: u64) -> Option<PendingEnhance> {
        match &self.enhancing {
            Some(current) if current.request_id == request_id => self.enhancing.take(),
            _ => None,
        }
    }
}

impl PendingRequest {
    fn new(
        request_id: u64,
        session_id: String,
        placeholder_id: String,
        kind: RequestKind,
        cancel: DropGuard,
    ) -> Self {
        Self {
            request_id,
            session_id,
            placeholder_id,
            kind,
            preview: String::new(),
            _cancel: cancel,
            ticker: None,
        }
    }

    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }
}

impl PendingEnhance {
    fn new(request_id: u64, cancel: DropGuard) -> Self {
        Self {
            request_id,
            _cancel: cancel,
        }
    }
}
