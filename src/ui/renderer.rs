use std::time::Instant;

use chrono::{Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::app::{App, Overlay, Screen, SUGGESTIONS};
use crate::core::load_indicator::LoadTone;
use crate::core::message::{ImagePart, Message};
use crate::core::models::ModelKind;
use crate::core::session::{group_sessions, ChatSession};
use crate::ui::markdown::{render_markdown, render_plain};
use crate::ui::theme::Theme;

const SIDEBAR_WIDTH: u16 = 32;
const MAX_INPUT_LINES: u16 = 6;
const KEY_HINTS: &str =
    "Ctrl+N new · Ctrl+O model · Ctrl+G image · Ctrl+E enhance · Ctrl+P profile · Ctrl+B sidebar · Ctrl+C quit";

pub fn ui(f: &mut Frame, app: &App) {
    let theme = &app.ui.theme;
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        f.area(),
    );

    match app.ui.screen {
        Screen::Login => draw_login(f, app),
        Screen::Chat => {
            draw_chat(f, app);
            match &app.ui.overlay {
                Some(Overlay::ModelPicker { selected }) => draw_model_picker(f, app, *selected),
                Some(Overlay::Profile) => draw_profile(f, app),
                None => {}
            }
        }
    }
}

fn draw_login(f: &mut Frame, app: &App) {
    let theme = &app.ui.theme;
    let area = centered_rect(50, 9, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .title(Span::styled(" Lumiera ", theme.title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "What should we call you?",
            theme.assistant_text_style,
        ))),
        rows[0],
    );

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style);
    let input_inner = input_block.inner(rows[1]);
    f.render_widget(input_block, rows[1]);
    f.render_widget(app.ui.login_input(), input_inner);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Enter to continue · Esc to quit",
            theme.meta_text_style,
        ))),
        rows[2],
    );
}

fn draw_chat(f: &mut Frame, app: &App) {
    let area = f.area();
    let main = if app.ui.sidebar_open && area.width > SIDEBAR_WIDTH * 2 {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);
        draw_sidebar(f, app, columns[0]);
        columns[1]
    } else {
        area
    };

    let banner_height = if app.error.is_some() { 1 } else { 0 };
    let input_lines = (app.ui.textarea().lines().len() as u16).clamp(1, MAX_INPUT_LINES);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(1),
            Constraint::Length(input_lines + 2),
            Constraint::Length(1),
        ])
        .split(main);

    draw_header(f, app, rows[0]);
    if let Some(error) = &app.error {
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {error}"), app.ui.theme.error_style),
                Span::styled("  (Esc to dismiss)", app.ui.theme.error_style),
            ])),
            rows[1],
        );
    }
    draw_transcript(f, app, rows[2]);
    draw_input(f, app, rows[3]);
    draw_status(f, app, rows[4]);
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(theme.sidebar_border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);

    let lines = sidebar_lines(app, theme, rows[0].width as usize);
    f.render_widget(Paragraph::new(lines), rows[0]);

    if let Some(user) = &app.user {
        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(user.name.clone(), theme.sidebar_item_style)),
                Line::from(Span::styled(user.email.clone(), theme.meta_text_style)),
            ]),
            rows[1],
        );
    }
}

fn sidebar_lines(app: &App, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled("+ New chat (Ctrl+N)", theme.accent_style)),
        Line::default(),
    ];
    let active_id = app.sessions.active_id();

    for (bucket, sessions) in group_sessions(Utc::now(), app.sessions.as_slice()) {
        lines.push(Line::from(Span::styled(
            bucket.label(),
            theme.sidebar_group_style,
        )));
        for session in sessions {
            let style = if Some(session.id.as_str()) == active_id {
                theme.sidebar_active_style
            } else {
                theme.sidebar_item_style
            };
            let title = truncate_to_width(&session.title, width.saturating_sub(2));
            lines.push(Line::from(Span::styled(format!("  {title}"), style)));
        }
        lines.push(Line::default());
    }
    lines
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let model = if app.image_mode {
        ModelKind::Image
    } else {
        app.selected_model
    };

    let mut left = vec![
        Span::styled(" Lumiera ", theme.title_style),
        Span::styled(format!("· {} ", model.label()), theme.accent_style),
    ];
    if app.image_mode {
        left.push(Span::styled("· IMAGE MODE ", theme.image_mode_style));
    }
    f.render_widget(Paragraph::new(Line::from(left)), area);

    let load_style = match app.load.tone(Instant::now()) {
        LoadTone::Active => theme.accent_style,
        LoadTone::JustSettled => theme.settled_style,
        LoadTone::Idle => theme.idle_style,
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("{} ", app.load.text()),
            load_style,
        )))
        .alignment(Alignment::Right),
        area,
    );
}

fn draw_transcript(f: &mut Frame, app: &App, area: Rect) {
    let lines = match app.active_session() {
        Some(session) if !session.is_empty() => transcript_lines(app, session),
        _ => welcome_lines(app),
    };

    let total = wrapped_height(&lines, area.width);
    let max_offset = total.saturating_sub(area.height);
    let offset = max_offset.saturating_sub(app.ui.scroll_from_bottom);

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((offset, 0)),
        area,
    );
}

fn welcome_lines(app: &App) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    let first_name = app
        .user
        .as_ref()
        .map(|user| user.first_name().to_string())
        .unwrap_or_default();

    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            format!("Welcome back, {first_name}"),
            theme.title_style,
        )),
        Line::from(Span::styled(
            "Ask anything, or start from a suggestion:",
            theme.meta_text_style,
        )),
        Line::default(),
    ];
    for (index, suggestion) in SUGGESTIONS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  Alt+{}  ", index + 1), theme.accent_style),
            Span::styled(suggestion.to_string(), theme.assistant_text_style),
        ]));
    }
    lines
}

fn transcript_lines(app: &App, session: &ChatSession) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    let preview = app.preview_for(&session.id);
    let mut lines = Vec::new();

    for message in &session.messages {
        lines.push(message_header(message, theme));

        let streaming = preview.filter(|(placeholder_id, _)| *placeholder_id == message.id);
        match streaming {
            Some((_, text)) => {
                let shown = if text.is_empty() {
                    message.content.as_str()
                } else {
                    text
                };
                if !shown.is_empty() {
                    lines.extend(body_lines(app, message, shown));
                }
                lines.push(Line::from(Span::styled(
                    "(streaming...)",
                    theme.meta_text_style,
                )));
            }
            None => lines.extend(body_lines(app, message, &message.content)),
        }

        if let Some(images) = &message.images {
            for (index, image) in images.iter().enumerate() {
                lines.push(Line::from(Span::styled(
                    image_summary(index, image),
                    theme.image_mode_style,
                )));
            }
        }
        lines.push(Line::default());
    }
    lines
}

fn message_header(message: &Message, theme: &Theme) -> Line<'static> {
    let (label, style) = if message.is_user() {
        ("You", theme.user_prefix_style)
    } else {
        ("Lumiera", theme.assistant_prefix_style)
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    Line::from(vec![
        Span::styled(label, style),
        Span::styled(format!("  {time}"), theme.meta_text_style),
    ])
}

fn body_lines(app: &App, message: &Message, text: &str) -> Vec<Line<'static>> {
    let theme = &app.ui.theme;
    if message.is_user() {
        render_plain(text, theme.user_text_style)
    } else if app.ui.markdown_enabled {
        render_markdown(text, theme, theme.assistant_text_style)
    } else {
        render_plain(text, theme.assistant_text_style)
    }
}

fn image_summary(index: usize, image: &ImagePart) -> String {
    let kib = image.approx_decoded_len().div_ceil(1024);
    format!(
        "[image {}: {}, {} KiB] (Ctrl+S to save)",
        index + 1,
        image.mime_type,
        kib
    )
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let title = if app.is_enhancing() {
        " Enhancing prompt... ".to_string()
    } else if app.image_mode {
        " Describe an image ".to_string()
    } else {
        format!(" Message {} ", app.selected_model.label())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if app.image_mode {
            theme.image_mode_style
        } else {
            theme.input_border_style
        })
        .title(Span::styled(title, theme.input_title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.ui.overlay.is_none() && app.ui.input_text().is_empty() {
        let placeholder = if app.image_mode {
            "What should the image show?"
        } else {
            "Type a message. Enter sends, Alt+Enter adds a line."
        };
        f.render_widget(
            Paragraph::new(Span::styled(placeholder, theme.input_placeholder_style)),
            inner,
        );
        f.set_cursor_position(Position::new(inner.x, inner.y));
    } else {
        f.render_widget(app.ui.textarea(), inner);
    }
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let line = match app.ui.visible_status(Instant::now()) {
        Some(status) => Line::from(Span::styled(format!(" {status}"), theme.status_style)),
        None if app.is_sending() => Line::from(Span::styled(
            " Esc to cancel the request",
            theme.meta_text_style,
        )),
        None => Line::from(Span::styled(format!(" {KEY_HINTS}"), theme.meta_text_style)),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_model_picker(f: &mut Frame, app: &App, selected: usize) {
    let theme = &app.ui.theme;
    let area = centered_rect(44, ModelKind::TEXT_MODELS.len() as u16 + 4, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .style(Style::default().bg(theme.background_color))
        .title(Span::styled(" Select model ", theme.title_style));

    let mut lines = Vec::new();
    for (index, kind) in ModelKind::TEXT_MODELS.iter().enumerate() {
        let marker = if *kind == app.selected_model {
            "● "
        } else {
            "  "
        };
        let style = if index == selected {
            theme.sidebar_active_style
        } else {
            theme.sidebar_item_style
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}", kind.display_name()), style),
            Span::styled(format!("  {}", app.catalog.id(*kind)), theme.meta_text_style),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "↑/↓ move · Enter select · Esc close",
        theme.meta_text_style,
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_profile(f: &mut Frame, app: &App) {
    let theme = &app.ui.theme;
    let area = centered_rect(50, 10, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .style(Style::default().bg(theme.background_color))
        .title(Span::styled(" Profile ", theme.title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(Span::styled("Name", theme.meta_text_style)),
        rows[0],
    );
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style);
    let input_inner = input_block.inner(rows[1]);
    f.render_widget(input_block, rows[1]);
    f.render_widget(app.ui.profile_input(), input_inner);

    let email = app
        .user
        .as_ref()
        .map(|user| user.email.clone())
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Email ", theme.meta_text_style),
            Span::styled(email, theme.sidebar_item_style),
            Span::styled("  (read-only)", theme.meta_text_style),
        ])),
        rows[2],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            "Enter to save · Esc to cancel",
            theme.meta_text_style,
        )),
        rows[3],
    );
}

/// Rows needed to show `lines` wrapped at `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::{apply_action, AppAction, AppActionContext};
    use crate::utils::test_utils::{create_logged_in_app, create_test_app};
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_text(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|f| ui(f, app)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn login_screen_asks_for_a_name() {
        let app = create_test_app();
        let screen = render_to_text(&app, 80, 24);
        assert!(screen.contains("What should we call you?"));
    }

    #[test]
    fn empty_chat_shows_welcome_and_suggestions() {
        let app = create_logged_in_app();
        let screen = render_to_text(&app, 120, 30);
        assert!(screen.contains("Welcome back, Ada"));
        assert!(screen.contains(SUGGESTIONS[0]));
        assert!(screen.contains("Today"));
        assert!(screen.contains("ada.lovelace@lumiera.ai"));
    }

    #[test]
    fn pending_turn_shows_streaming_marker() {
        let mut app = create_logged_in_app();
        app.ui.set_input_text("Hello there");
        apply_action(&mut app, AppAction::SendMessage, AppActionContext::default());
        let screen = render_to_text(&app, 120, 30);
        assert!(screen.contains("Hello there"));
        assert!(screen.contains("(streaming...)"));
    }

    #[test]
    fn image_mode_is_flagged_in_the_header() {
        let mut app = create_logged_in_app();
        apply_action(&mut app, AppAction::ToggleImageMode, AppActionContext::default());
        let screen = render_to_text(&app, 120, 30);
        assert!(screen.contains("IMAGE MODE"));
        assert!(screen.contains(ModelKind::Image.label()));
    }

    #[test]
    fn profile_modal_shows_read_only_email() {
        let mut app = create_logged_in_app();
        apply_action(&mut app, AppAction::OpenProfile, AppActionContext::default());
        let screen = render_to_text(&app, 120, 30);
        assert!(screen.contains("(read-only)"));
    }

    #[test]
    fn wrapped_height_counts_wrapped_rows() {
        let lines = vec![Line::from("a".repeat(25)), Line::default()];
        assert_eq!(wrapped_height(&lines, 10), 4);
    }

    #[test]
    fn long_titles_are_truncated() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abc", 4), "abc");
    }
}
