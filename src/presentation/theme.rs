use ratatui::style::{Color, Modifier, Style};

/// Styles threaded through every render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub header: Style,
    pub label: Style,
    pub focused: Style,
    pub selected: Style,
    pub unselected: Style,
    pub bracket: Style,
    pub placeholder: Style,
    pub value: Style,
    pub error: Style,
    pub warning: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let dim = Style::default().fg(Color::Indexed(243));
        let accent = Style::default()
            .fg(Color::Indexed(205))
            .add_modifier(Modifier::BOLD);
        Self {
            header: Style::default().add_modifier(Modifier::BOLD),
            label: dim,
            focused: accent,
            selected: accent,
            unselected: dim,
            bracket: dim,
            placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            value: Style::default(),
            error: Style::default().fg(Color::Red),
            warning: Style::default().fg(Color::Yellow),
        }
    }
}

impl Theme {
    /// Plain styles for terminals without colour support.
    pub fn monochrome() -> Self {
        let plain = Style::default();
        let bold = plain.add_modifier(Modifier::BOLD);
        Self {
            header: bold,
            label: plain,
            focused: bold,
            selected: bold.add_modifier(Modifier::UNDERLINED),
            unselected: plain,
            bracket: plain,
            placeholder: plain.add_modifier(Modifier::DIM),
            value: plain,
            error: bold,
            warning: plain.add_modifier(Modifier::ITALIC),
        }
    }

    pub fn label_style(&self, focused: bool) -> Style {
        if focused { self.focused } else { self.label }
    }
}
