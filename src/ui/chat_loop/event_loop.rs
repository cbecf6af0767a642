//! Event polling, dispatching, and UI rendering loop.
//!
//! The loop owns the [`App`] outright. Terminal input and background
//! request events are turned into [`AppAction`]s, queued on one channel,
//! applied in order, and any resulting [`AppCommand`]s are handed to the
//! executor. Frames are drawn at most 60 times per second.

use std::{
    error::Error,
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope,
    UiState,
};
use crate::core::chat_stream::{RequestEvent, RequestService};
use crate::core::load_indicator::LoadTone;
use crate::core::models::ModelKind;
use crate::core::vendor::VendorClient;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;

use super::executor::CommandExecutor;
use super::keybindings::{resolve_key, KeyResult};
use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

const MAX_FPS: u64 = 60;
const ANIMATION_INTERVAL: Duration = Duration::from_millis(250);
const IDLE_SLEEP: Duration = Duration::from_millis(16);

/// Everything the interactive session needs from the command line and config.
pub struct ChatOptions {
    pub client: VendorClient,
    pub default_model: ModelKind,
    pub theme: Theme,
    pub markdown: bool,
    pub image_dir: PathBuf,
    /// Pre-fills the login prompt.
    pub login_name: Option<String>,
}

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn current_context(terminal: &ChatTerminal) -> AppActionContext {
    let size = terminal.size().unwrap_or_default();
    AppActionContext {
        term_width: size.width,
        term_height: size.height,
    }
}

fn try_draw_frame(
    app: &App,
    terminal: &mut ChatTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    terminal.draw(|f| ui(f, app))?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

/// Applies pending terminal events. Returns whether anything arrived.
///
/// Stops after the first key that dispatches an action so the action is
/// applied before any later keystroke touches the input.
fn process_ui_events(
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
    ctx: AppActionContext,
) -> bool {
    let mut events_processed = false;

    while let Ok(ev) = event_rx.try_recv() {
        events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                match resolve_key(app, &key) {
                    KeyResult::Action(action) => {
                        dispatcher.dispatch(action, ctx);
                        break;
                    }
                    KeyResult::Edit => {
                        if let Some(input) = app.ui.focused_input_mut() {
                            input.input(tui_textarea::Input::from(key));
                        }
                    }
                    KeyResult::Newline => {
                        if let Some(input) = app.ui.focused_input_mut() {
                            input.insert_newline();
                        }
                    }
                    KeyResult::Ignored => {}
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => handle_paste(&mut app.ui, &text),
            UiEvent::Crossterm(_) => {}
        }
    }

    events_processed
}

fn handle_paste(ui: &mut UiState, text: &str) {
    let sanitized = sanitize_pasted_text(text);
    if sanitized.is_empty() {
        return;
    }
    if let Some(input) = ui.focused_input_mut() {
        input.insert_str(sanitized);
    }
}

/// Drains background request events into actions, merging adjacent
/// fragments of the same request into one.
fn collect_request_actions(
    rx: &mut mpsc::UnboundedReceiver<(RequestEvent, u64)>,
) -> Vec<AppAction> {
    let mut actions = Vec::new();
    let mut coalesced: Option<(u64, String)> = None;

    while let Ok((event, request_id)) = rx.try_recv() {
        match event {
            RequestEvent::Fragment(text) => match coalesced.as_mut() {
                Some((id, buffer)) if *id == request_id => buffer.push_str(&text),
                _ => {
                    flush_fragments(&mut coalesced, &mut actions);
                    coalesced = Some((request_id, text));
                }
            },
            other => {
                flush_fragments(&mut coalesced, &mut actions);
                actions.push(AppAction::from_request_event(other, request_id));
            }
        }
    }
    flush_fragments(&mut coalesced, &mut actions);
    actions
}

fn flush_fragments(coalesced: &mut Option<(u64, String)>, actions: &mut Vec<AppAction>) {
    if let Some((request_id, text)) = coalesced.take() {
        if !text.is_empty() {
            actions.push(AppAction::ResponseFragment { request_id, text });
        }
    }
}

fn process_request_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(RequestEvent, u64)>,
    ctx: AppActionContext,
) -> bool {
    let actions = collect_request_actions(rx);
    if actions.is_empty() {
        return false;
    }
    dispatcher.dispatch_many(actions, ctx);
    true
}

fn drain_action_queue(
    app: &mut App,
    executor: &CommandExecutor,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
    ctx: AppActionContext,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = apply_actions(app, pending);
    for cmd in commands {
        executor.execute(app, cmd, ctx);
    }
    true
}

/// Whether the load indicator still changes on screen without input.
fn is_animating(app: &App, now: Instant) -> bool {
    app.load.tone(now) != LoadTone::Idle
}

pub async fn run_chat(options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let ChatOptions {
        client,
        default_model,
        theme,
        markdown,
        image_dir,
        login_name,
    } = options;

    let mut app = App::new(
        client.catalog().clone(),
        default_model,
        UiState::new(theme, markdown),
    );
    if let Some(name) = login_name {
        app.ui.set_login_name(&name);
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let dispatcher = AppActionDispatcher::new(action_tx);

    let (service, mut request_rx) = RequestService::new();
    let executor = CommandExecutor::new(client, service, dispatcher.clone(), image_dir);

    let mut terminal = setup_terminal()?;
    info!("chat session started");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut last_animation_frame = Instant::now();
    let mut request_redraw = true;
    let mut was_animating = false;

    let result = loop {
        if app.ui.exit_requested {
            break Ok(());
        }

        let ctx = current_context(&terminal);
        let ui_changed = process_ui_events(&mut app, &mut event_rx, &dispatcher, ctx);
        let requests_changed = process_request_updates(&dispatcher, &mut request_rx, ctx);
        let actions_applied = drain_action_queue(&mut app, &executor, &mut action_rx, ctx);

        let now = Instant::now();
        if ui_changed || requests_changed || actions_applied || app.ui.expire_status(now) {
            request_redraw = true;
        }
        let animating = is_animating(&app, now);
        if animating != was_animating
            || (animating && now.duration_since(last_animation_frame) >= ANIMATION_INTERVAL)
        {
            last_animation_frame = now;
            request_redraw = true;
        }
        was_animating = animating;

        if let Err(err) = try_draw_frame(
            &app,
            &mut terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        ) {
            break Err(Box::new(err) as Box<dyn Error>);
        }

        if !ui_changed && !requests_changed && !actions_applied {
            tokio::time::sleep(IDLE_SLEEP).await;
        }
    };

    app.shutdown();
    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    debug!("terminal restored");
    result
}
