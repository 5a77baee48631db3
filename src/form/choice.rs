use crossterm::event::{KeyCode, KeyEvent};
use ratatui::text::Span;

use crate::{domain::EnumValue, presentation::Theme};

use super::field::{KeyOutcome, NodeEffect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Cyclic single-selection picker for booleans, enums and oneof variants.
#[derive(Debug, Clone)]
pub struct ChoicePicker {
    options: Vec<ChoiceOption>,
    selected: usize,
}

impl ChoicePicker {
    pub fn new(options: Vec<ChoiceOption>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn boolean() -> Self {
        Self::new(vec![
            ChoiceOption::new("false", "false"),
            ChoiceOption::new("true", "true"),
        ])
    }

    /// One option per declared value; the encoded value is the enum number.
    pub fn enumeration(values: &[EnumValue]) -> Self {
        Self::new(
            values
                .iter()
                .map(|value| ChoiceOption::new(&value.name, value.number.to_string()))
                .collect(),
        )
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&ChoiceOption> {
        self.options.get(self.selected)
    }

    /// Encoded value of the selection, or an empty string when there are no options.
    pub fn value(&self) -> &str {
        self.selected()
            .map(|option| option.value.as_str())
            .unwrap_or("")
    }

    pub fn next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub fn prev(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.options.len() - 1);
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Left => self.prev(),
            KeyCode::Right => self.next(),
            _ => return KeyOutcome::IGNORED,
        }
        if self.options.is_empty() {
            KeyOutcome::consumed(NodeEffect::None)
        } else {
            KeyOutcome::consumed(NodeEffect::Edited)
        }
    }

    pub(crate) fn render_value(&self, theme: &Theme) -> Vec<Span<'static>> {
        if self.options.is_empty() {
            return vec![Span::styled("[ ]", theme.bracket)];
        }
        let mut spans = vec![Span::styled("[ ", theme.bracket)];
        for (idx, option) in self.options.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(", ", theme.unselected));
            }
            let style = if idx == self.selected {
                theme.selected
            } else {
                theme.unselected
            };
            spans.push(Span::styled(option.label.clone(), style));
        }
        spans.push(Span::styled(" ]", theme.bracket));
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn rendered(picker: &ChoicePicker) -> String {
        picker
            .render_value(&Theme::default())
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }

    #[test]
    fn cycles_with_wraparound() {
        let mut picker = ChoicePicker::boolean();
        assert_eq!(picker.value(), "false");
        picker.prev();
        assert_eq!(picker.value(), "true");
        picker.next();
        assert_eq!(picker.value(), "false");
    }

    #[test]
    fn enum_values_encode_numbers() {
        let mut picker =
            ChoicePicker::enumeration(&[EnumValue::new("CALM", 0), EnumValue::new("ANGRY", 3)]);
        picker.handle_key(&KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        assert_eq!(picker.value(), "3");
        assert_eq!(picker.selected().map(|opt| opt.label.as_str()), Some("ANGRY"));
        assert_eq!(rendered(&picker), "[ CALM, ANGRY ]");
    }

    #[test]
    fn empty_picker_is_inert() {
        let mut picker = ChoicePicker::new(Vec::new());
        picker.next();
        picker.prev();
        assert_eq!(picker.value(), "");
        assert_eq!(rendered(&picker), "[ ]");
        let outcome = picker.handle_key(&KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        assert_eq!(outcome.effect, NodeEffect::None);
    }

    #[test]
    fn vertical_keys_are_left_for_navigation() {
        let mut picker = ChoicePicker::boolean();
        let outcome = picker.handle_key(&KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert!(!outcome.consumed);
    }
}
