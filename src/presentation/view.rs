use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::form::Rendered;

use super::theme::Theme;

pub struct UiContext<'a> {
    pub title: &'a str,
    pub body: BodyView<'a>,
    pub status_message: &'a str,
    pub status_style: Style,
    pub dirty: bool,
    pub help: Option<&'a str>,
    pub theme: &'a Theme,
}

pub enum BodyView<'a> {
    /// Selectable names, e.g. services or procedures.
    Picker {
        items: Vec<&'a str>,
        selected: usize,
        empty: &'a str,
    },
    Form(Rendered),
}

pub fn draw(frame: &mut Frame<'_>, ctx: UiContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(frame.area());
    render_body(frame, chunks[0], &ctx);
    render_footer(frame, chunks[1], &ctx);
}

fn render_body(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let rendered = match &ctx.body {
        BodyView::Picker {
            items,
            selected,
            empty,
        } => picker_lines(items, *selected, empty, ctx.theme),
        BodyView::Form(rendered) => rendered.clone(),
    };
    let window = usize::from(area.height.saturating_sub(2));
    let anchor = rendered
        .cursor
        .map(|hint| hint.line_offset)
        .or(rendered.focus_line);
    let offset = scroll_offset(anchor, window);

    let block = Block::default()
        .title(Span::styled(ctx.title.to_string(), ctx.theme.header))
        .borders(Borders::ALL);
    let paragraph = Paragraph::new(rendered.lines).block(block).scroll((offset as u16, 0));
    frame.render_widget(paragraph, area);

    if let Some(hint) = rendered.cursor
        && hint.line_offset >= offset
        && hint.line_offset < offset + window
    {
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(hint.column_offset)
            .min(area.right().saturating_sub(2));
        let y = area
            .y
            .saturating_add(1)
            .saturating_add((hint.line_offset - offset) as u16);
        frame.set_cursor_position((x, y));
    }
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    if let Some(help) = ctx.help {
        let help_widget = Paragraph::new(Span::styled(help.to_string(), ctx.theme.label))
            .wrap(Wrap { trim: true });
        frame.render_widget(help_widget, rows[0]);
    }

    let mut status = vec![Span::styled(ctx.status_message.to_string(), ctx.status_style)];
    if ctx.dirty {
        status.push(Span::styled(" • edited", ctx.theme.label));
    }
    frame.render_widget(Paragraph::new(Line::from(status)), rows[1]);
}

fn picker_lines(items: &[&str], selected: usize, empty: &str, theme: &Theme) -> Rendered {
    let mut rendered = Rendered::default();
    if items.is_empty() {
        rendered.push(Line::from(Span::styled(empty.to_string(), theme.placeholder)));
        return rendered;
    }
    for (idx, item) in items.iter().enumerate() {
        let focused = idx == selected;
        let marker = if focused { "> " } else { "  " };
        rendered.push_marked(
            Line::from(Span::styled(
                format!("{marker}{item}"),
                theme.label_style(focused),
            )),
            focused,
        );
    }
    rendered
}

/// First visible line so that `anchor` stays inside a window of `window` lines.
pub fn scroll_offset(anchor: Option<usize>, window: usize) -> usize {
    match anchor {
        Some(line) if window > 0 && line >= window => line + 1 - window,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::CursorHint;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend, layout::Position};

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn scroll_keeps_anchor_visible() {
        assert_eq!(scroll_offset(None, 5), 0);
        assert_eq!(scroll_offset(Some(4), 5), 0);
        assert_eq!(scroll_offset(Some(5), 5), 1);
        assert_eq!(scroll_offset(Some(12), 5), 8);
        assert_eq!(scroll_offset(Some(3), 0), 0);
    }

    #[test]
    fn picker_marks_selection_and_footer_shows_help() {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal
            .draw(|frame| {
                draw(
                    frame,
                    UiContext {
                        title: "Services",
                        body: BodyView::Picker {
                            items: vec!["demo.Admin", "demo.Greeter"],
                            selected: 1,
                            empty: "No services.",
                        },
                        status_message: "2 service(s)",
                        status_style: Style::default(),
                        dirty: false,
                        help: Some("q: quit"),
                        theme: &theme,
                    },
                )
            })
            .unwrap();
        assert_eq!(row(&terminal, 1), "│  demo.Admin                          │");
        assert_eq!(row(&terminal, 2), "│> demo.Greeter                        │");
        assert_eq!(row(&terminal, 6), "q: quit");
        assert_eq!(row(&terminal, 7), "2 service(s)");
    }

    #[test]
    fn cursor_follows_text_hint() {
        let theme = Theme::default();
        let mut rendered = Rendered::default();
        rendered.push(Line::from("> name: ab"));
        rendered.cursor = Some(CursorHint {
            line_offset: 0,
            column_offset: 10,
        });
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        terminal
            .draw(|frame| {
                draw(
                    frame,
                    UiContext {
                        title: "t",
                        body: BodyView::Form(rendered.clone()),
                        status_message: "Editing name",
                        status_style: Style::default(),
                        dirty: true,
                        help: None,
                        theme: &theme,
                    },
                )
            })
            .unwrap();
        assert_eq!(row(&terminal, 5), "Editing name • edited");
        assert_eq!(terminal.get_cursor_position().unwrap(), Position::new(11, 1));
    }
}
