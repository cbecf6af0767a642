use std::time::{Duration, Instant};

use tui_textarea::{CursorMove, TextArea};

use crate::core::models::ModelKind;
use crate::ui::theme::Theme;

const STATUS_TTL: Duration = Duration::from_secs(4);

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Name prompt shown until a user logs in.
    Login,

    /// Sidebar, transcript and composer.
    Chat,
}

/// Popup drawn above the chat screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Text-model picker with the highlighted row.
    ModelPicker { selected: usize },

    /// Profile editor; the name field is `profile_input`.
    Profile,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub screen: Screen,
    pub overlay: Option<Overlay>,
    pub sidebar_open: bool,
    pub theme: Theme,
    pub markdown_enabled: bool,
    pub status: Option<String>,
    pub status_set_at: Option<Instant>,
    pub exit_requested: bool,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_from_bottom: u16,
    textarea: TextArea<'static>,
    login_input: TextArea<'static>,
    profile_input: TextArea<'static>,
}

impl UiState {
    pub fn new(theme: Theme, markdown_enabled: bool) -> Self {
        let mut ui = Self {
            screen: Screen::Login,
            overlay: None,
            sidebar_open: true,
            theme,
            markdown_enabled,
            status: None,
            status_set_at: None,
            exit_requested: false,
            scroll_from_bottom: 0,
            textarea: TextArea::default(),
            login_input: TextArea::default(),
            profile_input: TextArea::default(),
        };
        ui.configure_textareas();
        ui
    }

    fn configure_textareas(&mut self) {
        let style = self
            .theme
            .input_text_style
            .patch(ratatui::style::Style::default().bg(self.theme.background_color));
        for area in [
            &mut self.textarea,
            &mut self.login_input,
            &mut self.profile_input,
        ] {
            area.set_style(style);
            area.set_cursor_style(self.theme.input_cursor_style);
            area.set_cursor_line_style(self.theme.input_cursor_line_style);
        }
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn login_input(&self) -> &TextArea<'static> {
        &self.login_input
    }

    pub fn profile_input(&self) -> &TextArea<'static> {
        &self.profile_input
    }

    /// The text area that receives plain keystrokes in the current mode.
    pub fn focused_input_mut(&mut self) -> Option<&mut TextArea<'static>> {
        match (self.screen, &self.overlay) {
            (Screen::Login, _) => Some(&mut self.login_input),
            (Screen::Chat, Some(Overlay::Profile)) => Some(&mut self.profile_input),
            (Screen::Chat, Some(Overlay::ModelPicker { .. })) => None,
            (Screen::Chat, None) => Some(&mut self.textarea),
        }
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn login_name(&self) -> String {
        self.login_input.lines().join(" ")
    }

    pub fn profile_name(&self) -> String {
        self.profile_input.lines().join(" ")
    }

    pub fn set_input_text(&mut self, text: &str) {
        self.textarea = filled_textarea(text);
        self.configure_textareas();
    }

    pub fn clear_input(&mut self) {
        self.set_input_text("");
    }

    pub fn set_login_name(&mut self, name: &str) {
        self.login_input = filled_textarea(name);
        self.configure_textareas();
    }

    pub fn open_profile(&mut self, current_name: &str) {
        self.profile_input = filled_textarea(current_name);
        self.configure_textareas();
        self.overlay = Some(Overlay::Profile);
    }

    pub fn open_model_picker(&mut self, current: ModelKind) {
        let selected = ModelKind::TEXT_MODELS
            .iter()
            .position(|kind| *kind == current)
            .unwrap_or(0);
        self.overlay = Some(Overlay::ModelPicker { selected });
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.status_set_at = Some(Instant::now());
    }

    /// Status line text, hidden once it has been shown long enough.
    pub fn visible_status(&self, now: Instant) -> Option<&str> {
        match (self.status.as_deref(), self.status_set_at) {
            (Some(text), Some(at)) if now.saturating_duration_since(at) < STATUS_TTL => Some(text),
            _ => None,
        }
    }

    /// Drops a status message that has outlived its display time. Returns
    /// whether one was dropped.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        if self.status.is_some() && self.visible_status(now).is_none() {
            self.status = None;
            self.status_set_at = None;
            return true;
        }
        false
    }

    /// Resets everything tied to a logged-in user.
    pub fn reset_for_login(&mut self) {
        self.screen = Screen::Login;
        self.overlay = None;
        self.status = None;
        self.status_set_at = None;
        self.scroll_from_bottom = 0;
        self.clear_input();
        self.set_login_name("");
    }
}

fn filled_textarea(text: &str) -> TextArea<'static> {
    let lines: Vec<String> = if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').map(str::to_string).collect()
    };
    let mut area = TextArea::from(lines);
    area.move_cursor(CursorMove::Bottom);
    area.move_cursor(CursorMove::End);
    area
}
