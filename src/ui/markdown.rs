//! Markdown to styled terminal lines.
//!
//! Covers what chat replies actually use: headings, emphasis, inline and
//! fenced code, quotes, lists, rules, links and simple tables. Layout
//! wrapping is left to the paragraph widget.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

const QUOTE_PREFIX: &str = "│ ";
const CODE_INDENT: &str = "  ";
const RULE: &str = "────────────────────────";

/// Renders `text` as markdown with `base` as the paragraph style.
pub fn render_markdown(text: &str, theme: &Theme, base: Style) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_TABLES);

    let mut renderer = MarkdownRenderer::new(theme, base);
    for event in Parser::new_ext(text, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

/// Renders `text` verbatim, one line per source line.
pub fn render_plain(text: &str, style: Style) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), style)))
        .collect()
}

struct MarkdownRenderer<'t> {
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Next number for ordered lists, `None` for bullets.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
}

impl<'t> MarkdownRenderer<'t> {
    fn new(theme: &'t Theme, base: Style) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![base],
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let next = self.style().patch(patch);
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn push_text(&mut self, text: impl Into<String>, style: Style) {
        self.current.push(Span::styled(text.into(), style));
    }

    fn prefixed(&self, spans: Vec<Span<'static>>) -> Line<'static> {
        if self.quote_depth == 0 {
            return Line::from(spans);
        }
        let mut all = Vec::with_capacity(spans.len() + 1);
        all.push(Span::styled(
            QUOTE_PREFIX.repeat(self.quote_depth),
            self.theme.quote_style,
        ));
        all.extend(spans);
        Line::from(all)
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current);
        let line = self.prefixed(spans);
        self.lines.push(line);
    }

    /// Ends a block with a separating blank line, except inside lists where
    /// items stay tight.
    fn end_block(&mut self) {
        self.flush();
        if self.lists.is_empty() {
            self.blank_line();
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            return;
        }
        self.lines.push(Line::default());
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code_block => self.code_text(&text),
            Event::Text(text) => {
                let style = self.style();
                self.push_text(text.into_string(), style);
            }
            Event::Code(code) => {
                let style = self.theme.code_style;
                self.push_text(code.into_string(), style);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let style = self.style();
                self.push_text(html.trim_end_matches('\n').to_string(), style);
            }
            Event::SoftBreak => {
                let style = self.style();
                self.push_text(" ", style);
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines
                    .push(Line::from(Span::styled(RULE, self.theme.meta_text_style)));
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                let style = self.style();
                self.push_text(marker, style);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.push_style(self.theme.heading_style);
                let hashes = "#".repeat(heading_depth(level));
                let style = self.style();
                self.push_text(format!("{hashes} "), style);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let style = self.theme.accent_style;
                self.push_text(format!("{}{marker}", "  ".repeat(depth)), style);
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { .. } => self.push_style(self.theme.link_style),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.end_block(),
            TagEnd::Heading(_) => {
                self.pop_style();
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.blank_line();
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.end_block();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style()
            }
            TagEnd::TableCell => {
                let style = self.theme.meta_text_style;
                self.push_text(" │ ", style);
            }
            TagEnd::TableHead | TagEnd::TableRow => self.flush(),
            TagEnd::Table => self.end_block(),
            _ => {}
        }
    }

    fn code_text(&mut self, text: &str) {
        for line in text.trim_end_matches('\n').split('\n') {
            let spans = vec![Span::styled(
                format!("{CODE_INDENT}{line}"),
                self.theme.code_style,
            )];
            let line = self.prefixed(spans);
            self.lines.push(line);
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn render(text: &str) -> Vec<Line<'static>> {
        let theme = Theme::dark_default();
        render_markdown(text, &theme, theme.assistant_text_style)
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        let lines = render("First paragraph\nstill first.\n\nSecond.");
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["First paragraph still first.", "", "Second."]);
    }

    #[test]
    fn headings_keep_their_markers_and_style() {
        let theme = Theme::dark_default();
        let lines = render_markdown("## Plan", &theme, theme.assistant_text_style);
        assert_eq!(line_text(&lines[0]), "## Plan");
        let heading_fg = theme.heading_style.fg;
        assert!(lines[0].spans.iter().all(|span| span.style.fg == heading_fg));
    }

    #[test]
    fn emphasis_and_inline_code_are_styled() {
        let theme = Theme::dark_default();
        let lines = render_markdown("a **bold** and `code`", &theme, Style::default());
        let bold = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "bold")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let code = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "code")
            .expect("code span");
        assert_eq!(code.style, theme.code_style);
    }

    #[test]
    fn lists_get_markers_and_stay_tight() {
        let lines = render("- one\n- two\n\n1. first\n2. second\n   - nested");
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(
            texts,
            vec![
                "• one",
                "• two",
                "",
                "1. first",
                "2. second",
                "  • nested"
            ]
        );
    }

    #[test]
    fn fenced_code_is_indented_line_by_line() {
        let lines = render("```rust\nfn main() {}\nlet x = 1;\n```\nafter");
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["  fn main() {}", "  let x = 1;", "", "after"]);
    }

    #[test]
    fn quotes_are_prefixed() {
        let lines = render("> quoted text");
        assert_eq!(line_text(&lines[0]), "│ quoted text");
    }

    #[test]
    fn plain_rendering_keeps_markup() {
        let lines = render_plain("**not bold**\nnext", Style::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "**not bold**");
    }
}
