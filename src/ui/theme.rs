use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub meta_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub accent_style: Style,
    pub settled_style: Style,
    pub idle_style: Style,
    pub image_mode_style: Style,
    pub error_style: Style,
    pub status_style: Style,

    // Sidebar
    pub sidebar_border_style: Style,
    pub sidebar_group_style: Style,
    pub sidebar_item_style: Style,
    pub sidebar_active_style: Style,

    // Markdown
    pub heading_style: Style,
    pub code_style: Style,
    pub quote_style: Style,
    pub link_style: Style,

    // Input area
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub input_placeholder_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        let accent = Color::Rgb(56, 189, 248);
        let muted = Color::Rgb(100, 116, 139);
        Theme {
            background_color: Color::Rgb(2, 6, 23),
            user_prefix_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(226, 232, 240)),
            assistant_prefix_style: Style::default()
                .fg(Color::Rgb(167, 139, 250))
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Rgb(203, 213, 225)),
            meta_text_style: Style::default().fg(muted),

            title_style: Style::default()
                .fg(Color::Rgb(241, 245, 249))
                .add_modifier(Modifier::BOLD),
            accent_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            settled_style: Style::default()
                .fg(Color::Rgb(134, 239, 172))
                .add_modifier(Modifier::BOLD),
            idle_style: Style::default().fg(muted),
            image_mode_style: Style::default()
                .fg(Color::Rgb(244, 114, 182))
                .add_modifier(Modifier::BOLD),
            error_style: Style::default()
                .fg(Color::Rgb(254, 202, 202))
                .bg(Color::Rgb(127, 29, 29)),
            status_style: Style::default().fg(Color::Rgb(148, 163, 184)),

            sidebar_border_style: Style::default().fg(Color::Rgb(30, 41, 59)),
            sidebar_group_style: Style::default().fg(muted).add_modifier(Modifier::BOLD),
            sidebar_item_style: Style::default().fg(Color::Rgb(148, 163, 184)),
            sidebar_active_style: Style::default()
                .fg(Color::Rgb(241, 245, 249))
                .bg(Color::Rgb(30, 41, 59)),

            heading_style: Style::default()
                .fg(Color::Rgb(241, 245, 249))
                .add_modifier(Modifier::BOLD),
            code_style: Style::default()
                .fg(Color::Rgb(253, 224, 71))
                .bg(Color::Rgb(15, 23, 42)),
            quote_style: Style::default()
                .fg(Color::Rgb(148, 163, 184))
                .add_modifier(Modifier::ITALIC),
            link_style: Style::default()
                .fg(accent)
                .add_modifier(Modifier::UNDERLINED),

            input_border_style: Style::default().fg(Color::Rgb(51, 65, 85)),
            input_title_style: Style::default().fg(Color::Rgb(148, 163, 184)),
            input_text_style: Style::default().fg(Color::Rgb(241, 245, 249)),
            input_placeholder_style: Style::default().fg(muted),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
        }
    }

    /// Palette-only fallback for terminals without truecolor.
    pub fn basic() -> Self {
        Theme {
            background_color: Color::Reset,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::White),
            assistant_prefix_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Gray),
            meta_text_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().add_modifier(Modifier::BOLD),
            accent_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            settled_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            idle_style: Style::default().fg(Color::DarkGray),
            image_mode_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            error_style: Style::default().fg(Color::White).bg(Color::Red),
            status_style: Style::default().fg(Color::Gray),

            sidebar_border_style: Style::default().fg(Color::DarkGray),
            sidebar_group_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            sidebar_item_style: Style::default().fg(Color::Gray),
            sidebar_active_style: Style::default().add_modifier(Modifier::REVERSED),

            heading_style: Style::default().add_modifier(Modifier::BOLD),
            code_style: Style::default().fg(Color::Yellow),
            quote_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            link_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),

            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default(),
            input_placeholder_style: Style::default().fg(Color::DarkGray),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
        }
    }

    /// Picks the truecolor theme unless `COLORTERM` says otherwise.
    pub fn detect() -> Self {
        match std::env::var("COLORTERM").as_deref() {
            Ok("truecolor") | Ok("24bit") => Self::dark_default(),
            _ => Self::basic(),
        }
    }
}
