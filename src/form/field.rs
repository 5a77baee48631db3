use crossterm::event::KeyEvent;
use ratatui::text::{Line, Span};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use crate::presentation::Theme;

use super::{
    choice::ChoicePicker, group::GroupNode, list::ListNode, map::MapNode, oneof::OneofNode,
    text::TextEditor,
};

/// Side effect of a focus change or key press, reported up to the form controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeEffect {
    #[default]
    None,
    /// Focus landed on a text editor.
    ShowCursor,
    Edited,
    Added {
        index: usize,
    },
    Removed {
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub effect: NodeEffect,
    pub consumed: bool,
}

impl KeyOutcome {
    pub const IGNORED: KeyOutcome = KeyOutcome {
        effect: NodeEffect::None,
        consumed: false,
    };

    pub fn consumed(effect: NodeEffect) -> Self {
        Self {
            effect,
            consumed: true,
        }
    }
}

/// Position of the text cursor inside a rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorHint {
    pub line_offset: usize,
    pub column_offset: u16,
}

#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorHint>,
    /// Line holding the deep focus, used to keep it scrolled into view.
    pub focus_line: Option<usize>,
}

impl Rendered {
    pub fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    pub fn push_focused(&mut self, line: Line<'static>) {
        self.focus_line.get_or_insert(self.lines.len());
        self.lines.push(line);
    }

    /// Push a line, marking it as the focus line when `focused`.
    pub fn push_marked(&mut self, line: Line<'static>, focused: bool) {
        if focused {
            self.push_focused(line);
        } else {
            self.push(line);
        }
    }

    /// Append `other` below the current lines, shifting its hints accordingly.
    pub fn append(&mut self, other: Rendered) {
        let offset = self.lines.len();
        if self.cursor.is_none()
            && let Some(mut hint) = other.cursor
        {
            hint.line_offset += offset;
            self.cursor = Some(hint);
        }
        if self.focus_line.is_none() {
            self.focus_line = other.focus_line.map(|line| line + offset);
        }
        self.lines.extend(other.lines);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    pub theme: Theme,
}

impl RenderContext {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub(crate) fn label(&self, text: String, focused: bool) -> Span<'static> {
        Span::styled(text, self.theme.label_style(focused))
    }
}

pub(crate) fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

pub(crate) fn marker(focused: bool) -> &'static str {
    if focused { "> " } else { "  " }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Text(TextEditor),
    Choice(ChoicePicker),
    Group(GroupNode),
    List(ListNode),
    Map(MapNode),
    Oneof(OneofNode),
}

/// Editable counterpart of one schema field.
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub name: String,
    pub kind: NodeKind,
}

impl FieldNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_) | NodeKind::Choice(_))
    }

    /// Materialize the live value. Text stays raw; no coercion happens here.
    pub fn value(&self) -> Value {
        match &self.kind {
            NodeKind::Text(editor) => Value::String(editor.value().to_string()),
            NodeKind::Choice(picker) => Value::String(picker.value().to_string()),
            NodeKind::Group(group) => group.value(),
            NodeKind::List(list) => list.value(),
            NodeKind::Map(map) => map.value(),
            NodeKind::Oneof(oneof) => oneof.value(),
        }
    }

    pub fn is_focusable(&self) -> bool {
        match &self.kind {
            NodeKind::Group(group) => group.is_focusable(),
            NodeKind::Oneof(oneof) => oneof.is_focusable(),
            _ => true,
        }
    }

    pub fn focus(&mut self) -> NodeEffect {
        match &mut self.kind {
            NodeKind::Text(editor) => editor.focus(),
            NodeKind::Choice(_) => NodeEffect::None,
            NodeKind::Group(group) => group.focus(),
            NodeKind::List(list) => list.focus(),
            NodeKind::Map(map) => map.focus(),
            NodeKind::Oneof(oneof) => oneof.focus(),
        }
    }

    pub fn focus_from_end(&mut self) -> NodeEffect {
        match &mut self.kind {
            NodeKind::Text(editor) => editor.focus(),
            NodeKind::Choice(_) => NodeEffect::None,
            NodeKind::Group(group) => group.focus_from_end(),
            NodeKind::List(list) => list.focus_from_end(),
            NodeKind::Map(map) => map.focus_from_end(),
            NodeKind::Oneof(oneof) => oneof.focus_from_end(),
        }
    }

    pub fn blur(&mut self) {
        match &mut self.kind {
            NodeKind::Text(editor) => editor.blur(),
            NodeKind::Choice(_) => {}
            NodeKind::Group(group) => group.blur(),
            NodeKind::List(list) => list.blur(),
            NodeKind::Map(map) => map.blur(),
            NodeKind::Oneof(oneof) => oneof.blur(),
        }
    }

    /// Advance deep focus inside this subtree. `false` means the subtree is exhausted.
    pub fn next(&mut self) -> bool {
        match &mut self.kind {
            NodeKind::Text(_) | NodeKind::Choice(_) => false,
            NodeKind::Group(group) => group.next(),
            NodeKind::List(list) => list.next(),
            NodeKind::Map(map) => map.next(),
            NodeKind::Oneof(oneof) => oneof.next(),
        }
    }

    pub fn prev(&mut self) -> bool {
        match &mut self.kind {
            NodeKind::Text(_) | NodeKind::Choice(_) => false,
            NodeKind::Group(group) => group.prev(),
            NodeKind::List(list) => list.prev(),
            NodeKind::Map(map) => map.prev(),
            NodeKind::Oneof(oneof) => oneof.prev(),
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        match &mut self.kind {
            NodeKind::Text(editor) => editor.handle_key(key),
            NodeKind::Choice(picker) => picker.handle_key(key),
            NodeKind::Group(group) => group.handle_key(key),
            NodeKind::List(list) => list.handle_key(key),
            NodeKind::Map(map) => map.handle_key(key),
            NodeKind::Oneof(oneof) => oneof.handle_key(key),
        }
    }

    pub fn accepts_text_input(&self) -> bool {
        match &self.kind {
            NodeKind::Text(editor) => editor.is_focused(),
            NodeKind::Choice(_) => false,
            NodeKind::Group(group) => group.accepts_text_input(),
            NodeKind::List(list) => list.accepts_text_input(),
            NodeKind::Map(map) => map.accepts_text_input(),
            NodeKind::Oneof(oneof) => oneof.accepts_text_input(),
        }
    }

    pub fn set_width(&mut self, width: u16) {
        match &mut self.kind {
            NodeKind::Text(editor) => editor.set_width(width),
            NodeKind::Choice(_) => {}
            NodeKind::Group(group) => group.set_width(width),
            NodeKind::List(list) => list.set_width(width),
            NodeKind::Map(map) => map.set_width(width),
            NodeKind::Oneof(oneof) => oneof.set_width(width),
        }
    }

    /// Names from this node down to the deep focus, e.g. `["tags", "[1]"]`.
    pub(crate) fn collect_focus_path<'a>(&'a self, path: &mut Vec<&'a str>) {
        match &self.kind {
            NodeKind::Text(_) | NodeKind::Choice(_) => {}
            NodeKind::Group(group) => group.collect_focus_path(path),
            NodeKind::List(list) => list.collect_focus_path(path),
            NodeKind::Map(map) => map.collect_focus_path(path),
            NodeKind::Oneof(oneof) => oneof.collect_focus_path(path),
        }
    }

    /// Label plus inline value for leaves, label line plus indented children for composites.
    pub fn render(&self, ctx: &RenderContext, focused: bool, depth: usize) -> Rendered {
        let prefix = format!("{}{}", indent(depth), marker(focused));
        match &self.kind {
            NodeKind::Text(editor) => {
                let head = format!("{prefix}{}: ", self.name);
                let head_width = head.width() as u16;
                let (spans, column) = editor.render_value(&ctx.theme);
                let mut line = vec![ctx.label(head, focused)];
                line.extend(spans);
                Rendered {
                    lines: vec![Line::from(line)],
                    cursor: column.map(|column| CursorHint {
                        line_offset: 0,
                        column_offset: head_width + column,
                    }),
                    focus_line: focused.then_some(0),
                }
            }
            NodeKind::Choice(picker) => {
                let mut line = vec![ctx.label(format!("{prefix}{}: ", self.name), focused)];
                line.extend(picker.render_value(&ctx.theme));
                Rendered {
                    lines: vec![Line::from(line)],
                    cursor: None,
                    focus_line: focused.then_some(0),
                }
            }
            composite => {
                let mut rendered = Rendered::default();
                rendered.push(Line::from(
                    ctx.label(format!("{prefix}{}:", self.name), focused),
                ));
                let body = match composite {
                    NodeKind::Group(group) => group.render_body(ctx, depth + 1),
                    NodeKind::List(list) => list.render_body(ctx, depth + 1),
                    NodeKind::Map(map) => map.render_body(ctx, depth + 1),
                    NodeKind::Oneof(oneof) => oneof.render_body(ctx, depth + 1),
                    NodeKind::Text(_) | NodeKind::Choice(_) => Rendered::default(),
                };
                rendered.append(body);
                rendered
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::validate::Validator;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn leaves_materialize_raw_strings() {
        let mut port = FieldNode::new(
            "port",
            NodeKind::Text(TextEditor::new("Enter int...", 64).with_validator(Validator::Int)),
        );
        port.focus();
        for ch in "80a".chars() {
            port.handle_key(&press(KeyCode::Char(ch)));
        }
        assert_eq!(port.value(), Value::String("80a".into()));

        let flag = FieldNode::new("flag", NodeKind::Choice(ChoicePicker::boolean()));
        assert_eq!(flag.value(), Value::String("false".into()));
    }

    #[test]
    fn text_render_reports_cursor_after_label() {
        let mut node = FieldNode::new("name", NodeKind::Text(TextEditor::new("Enter name...", 0)));
        node.focus();
        node.handle_key(&press(KeyCode::Char('a')));
        let rendered = node.render(&RenderContext::default(), true, 1);
        assert_eq!(line_text(&rendered.lines[0]), "  > name: a");
        assert_eq!(
            rendered.cursor,
            Some(CursorHint {
                line_offset: 0,
                column_offset: 11,
            })
        );
    }

    #[test]
    fn append_shifts_cursor_hint() {
        let mut outer = Rendered::default();
        outer.push(Line::from("header"));
        outer.append(Rendered {
            lines: vec![Line::from("a"), Line::from("b")],
            cursor: Some(CursorHint {
                line_offset: 1,
                column_offset: 3,
            }),
            focus_line: Some(1),
        });
        assert_eq!(outer.cursor.map(|hint| hint.line_offset), Some(2));
        assert_eq!(outer.focus_line, Some(2));
    }
}
