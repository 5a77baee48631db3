use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::presentation::Theme;

use super::{
    error::ValidationError,
    field::{KeyOutcome, NodeEffect},
    validate::Validator,
};

/// Single-line, cursor-aware text input.
#[derive(Debug, Clone)]
pub struct TextEditor {
    buffer: String,
    /// Cursor position in chars, `0..=len`.
    cursor: usize,
    placeholder: String,
    /// Maximum length in chars; 0 means unlimited.
    max_len: usize,
    validator: Option<Validator>,
    focused: bool,
    width: u16,
}

impl TextEditor {
    pub fn new(placeholder: impl Into<String>, max_len: usize) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            placeholder: placeholder.into(),
            max_len,
            validator: None,
            focused: false,
            width: 0,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn set_value(&mut self, value: &str) {
        self.buffer = if self.max_len > 0 {
            value.chars().take(self.max_len).collect()
        } else {
            value.to_string()
        };
        self.cursor = self.len();
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn error(&self) -> Option<ValidationError> {
        self.validator
            .and_then(|validator| validator.check(&self.buffer).err())
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) -> NodeEffect {
        self.focused = true;
        NodeEffect::ShowCursor
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !self.focused {
            return KeyOutcome::IGNORED;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => self.move_to(0),
                KeyCode::Char('e') => self.move_to(self.len()),
                KeyCode::Char('u') => {
                    let end = self.byte_index(self.cursor);
                    self.buffer.replace_range(..end, "");
                    self.cursor = 0;
                    KeyOutcome::consumed(NodeEffect::Edited)
                }
                KeyCode::Char('k') => {
                    let start = self.byte_index(self.cursor);
                    self.buffer.truncate(start);
                    KeyOutcome::consumed(NodeEffect::Edited)
                }
                _ => KeyOutcome::IGNORED,
            };
        }
        match key.code {
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::ALT) => KeyOutcome::IGNORED,
            KeyCode::Char(ch) => {
                if self.max_len > 0 && self.len() >= self.max_len {
                    return KeyOutcome::consumed(NodeEffect::None);
                }
                let at = self.byte_index(self.cursor);
                self.buffer.insert(at, ch);
                self.cursor += 1;
                KeyOutcome::consumed(NodeEffect::Edited)
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return KeyOutcome::consumed(NodeEffect::None);
                }
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.buffer.remove(at);
                KeyOutcome::consumed(NodeEffect::Edited)
            }
            KeyCode::Delete => {
                if self.cursor >= self.len() {
                    return KeyOutcome::consumed(NodeEffect::None);
                }
                let at = self.byte_index(self.cursor);
                self.buffer.remove(at);
                KeyOutcome::consumed(NodeEffect::Edited)
            }
            KeyCode::Left if self.cursor > 0 => self.move_to(self.cursor - 1),
            KeyCode::Right if self.cursor < self.len() => self.move_to(self.cursor + 1),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.len()),
            _ => KeyOutcome::IGNORED,
        }
    }

    /// Styled value spans plus the cursor column relative to the first span, when focused.
    pub(crate) fn render_value(&self, theme: &Theme) -> (Vec<Span<'static>>, Option<u16>) {
        let mut spans = Vec::new();
        if self.buffer.is_empty() && !self.focused {
            spans.push(Span::styled(self.placeholder.clone(), theme.placeholder));
            return (spans, None);
        }
        let (visible, column) = self.visible_window();
        spans.push(Span::styled(visible, theme.value));
        if let Some(error) = self.error() {
            spans.push(Span::styled(format!("  {error}"), theme.error));
        }
        (spans, self.focused.then_some(column))
    }

    /// Slice of the buffer that fits `width` columns while keeping the cursor visible.
    fn visible_window(&self) -> (String, u16) {
        let chars = self.buffer.chars().collect::<Vec<_>>();
        let char_width = |ch: &char| ch.width().unwrap_or(0);
        let mut column = chars[..self.cursor].iter().map(char_width).sum::<usize>();
        if self.width == 0 {
            return (self.buffer.clone(), column as u16);
        }
        let width = self.width as usize;
        let budget = width.saturating_sub(1).max(1);
        let mut start = 0;
        while column > budget && start < self.cursor {
            column -= char_width(&chars[start]);
            start += 1;
        }
        let mut visible = String::new();
        let mut used = 0;
        for ch in &chars[start..] {
            let w = char_width(ch);
            if used + w > width {
                break;
            }
            visible.push(*ch);
            used += w;
        }
        (visible, column as u16)
    }

    fn move_to(&mut self, cursor: usize) -> KeyOutcome {
        self.cursor = cursor;
        KeyOutcome::consumed(NodeEffect::None)
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.buffer.len())
    }
}
