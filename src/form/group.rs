use crossterm::event::KeyEvent;
use ratatui::text::Line;
use serde_json::{Map, Value};

use super::{
    error::UnsupportedField,
    field::{FieldNode, KeyOutcome, NodeEffect, NodeKind, RenderContext, Rendered, indent},
};

/// Ordered children of one message. Only the child at `focus_index` can hold deep focus.
#[derive(Debug, Clone, Default)]
pub struct GroupNode {
    children: Vec<FieldNode>,
    unsupported: Vec<UnsupportedField>,
    focus_index: usize,
    focused: bool,
}

impl GroupNode {
    pub fn new(children: Vec<FieldNode>, unsupported: Vec<UnsupportedField>) -> Self {
        Self {
            children,
            unsupported,
            focus_index: 0,
            focused: false,
        }
    }

    pub fn children(&self) -> &[FieldNode] {
        &self.children
    }

    pub fn unsupported(&self) -> &[UnsupportedField] {
        &self.unsupported
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_focusable(&self) -> bool {
        self.children.iter().any(FieldNode::is_focusable)
    }

    /// Map keyed by field name. A oneof child contributes its selected key directly.
    pub fn value(&self) -> Value {
        let mut map = Map::new();
        for child in &self.children {
            match (&child.kind, child.value()) {
                (NodeKind::Oneof(_), Value::Object(selected)) => map.extend(selected),
                (_, value) => {
                    map.insert(child.name.clone(), value);
                }
            }
        }
        Value::Object(map)
    }

    pub fn focus(&mut self) -> NodeEffect {
        let Some(index) = self.children.iter().position(FieldNode::is_focusable) else {
            return NodeEffect::None;
        };
        self.focused = true;
        self.focus_index = index;
        self.children[index].focus()
    }

    pub fn focus_from_end(&mut self) -> NodeEffect {
        let Some(index) = self.children.iter().rposition(FieldNode::is_focusable) else {
            return NodeEffect::None;
        };
        self.focused = true;
        self.focus_index = index;
        self.children[index].focus_from_end()
    }

    pub fn blur(&mut self) {
        if let Some(child) = self.children.get_mut(self.focus_index) {
            child.blur();
        }
        self.focused = false;
    }

    pub fn next(&mut self) -> bool {
        let Some(child) = self.children.get_mut(self.focus_index) else {
            return false;
        };
        if child.next() {
            return true;
        }
        child.blur();
        let following = self.children[self.focus_index + 1..]
            .iter()
            .position(FieldNode::is_focusable)
            .map(|offset| self.focus_index + 1 + offset);
        match following {
            Some(index) => {
                self.focus_index = index;
                self.children[index].focus();
                true
            }
            None => false,
        }
    }

    pub fn prev(&mut self) -> bool {
        let Some(child) = self.children.get_mut(self.focus_index) else {
            return false;
        };
        if child.prev() {
            return true;
        }
        child.blur();
        match self.children[..self.focus_index]
            .iter()
            .rposition(FieldNode::is_focusable)
        {
            Some(index) => {
                self.focus_index = index;
                self.children[index].focus_from_end();
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !self.focused {
            return KeyOutcome::IGNORED;
        }
        match self.children.get_mut(self.focus_index) {
            Some(child) => child.handle_key(key),
            None => KeyOutcome::IGNORED,
        }
    }

    pub fn accepts_text_input(&self) -> bool {
        self.focused
            && self
                .children
                .get(self.focus_index)
                .is_some_and(FieldNode::accepts_text_input)
    }

    pub fn set_width(&mut self, width: u16) {
        for child in &mut self.children {
            child.set_width(width);
        }
    }

    pub(crate) fn collect_focus_path<'a>(&'a self, path: &mut Vec<&'a str>) {
        if !self.focused {
            return;
        }
        if let Some(child) = self.children.get(self.focus_index) {
            path.push(&child.name);
            child.collect_focus_path(path);
        }
    }

    /// Children at `depth`, followed by the unsupported-field notice if any.
    pub fn render_body(&self, ctx: &RenderContext, depth: usize) -> Rendered {
        let mut rendered = Rendered::default();
        for (idx, child) in self.children.iter().enumerate() {
            let focused = self.focused && idx == self.focus_index;
            rendered.append(child.render(ctx, focused, depth));
        }
        if let Some(notice) = self.unsupported_notice() {
            rendered.push(Line::from(
                ctx.label(format!("{}{notice}", indent(depth)), false),
            ));
        }
        rendered
    }

    pub fn unsupported_notice(&self) -> Option<String> {
        if self.unsupported.is_empty() {
            return None;
        }
        let names = self
            .unsupported
            .iter()
            .map(|field| field.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("(unsupported: {names})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::SchemaNode,
        form::{builder::build_form, text::TextEditor},
    };
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn type_text(group: &mut GroupNode, text: &str) {
        for ch in text.chars() {
            group.handle_key(&KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn focus_path(group: &GroupNode) -> Vec<String> {
        let mut path = Vec::new();
        group.collect_focus_path(&mut path);
        path.into_iter().map(str::to_string).collect()
    }

    fn sample() -> GroupNode {
        build_form(&SchemaNode::message(
            "Req",
            vec![
                SchemaNode::string("a"),
                SchemaNode::message(
                    "inner",
                    vec![SchemaNode::string("b"), SchemaNode::bool("c")],
                ),
                SchemaNode::message("empty", Vec::new()),
                SchemaNode::int("d"),
            ],
        ))
    }

    #[test]
    fn traversal_is_depth_first_and_skips_empty_groups() {
        let mut group = sample();
        group.focus();
        let mut visited = vec![focus_path(&group).join(".")];
        while group.next() {
            visited.push(focus_path(&group).join("."));
        }
        assert_eq!(visited, vec!["a", "inner.b", "inner.c", "d"]);
    }

    #[test]
    fn prev_mirrors_next() {
        let mut group = sample();
        group.focus_from_end();
        let mut visited = vec![focus_path(&group).join(".")];
        while group.prev() {
            visited.push(focus_path(&group).join("."));
        }
        assert_eq!(visited, vec!["d", "inner.c", "inner.b", "a"]);
    }

    #[test]
    fn value_keys_follow_declaration_order() {
        let mut group = sample();
        group.focus();
        type_text(&mut group, "x");
        assert_eq!(
            group.value(),
            json!({"a": "x", "inner": {"b": "", "c": "false"}, "empty": {}, "d": ""})
        );
    }

    #[test]
    fn oneof_child_is_spliced_into_parent() {
        let mut group = build_form(&SchemaNode::message(
            "Req",
            vec![
                SchemaNode::string("id"),
                SchemaNode::oneof(
                    "choice",
                    vec![SchemaNode::string("x"), SchemaNode::int("y")],
                ),
            ],
        ));
        let value = group.value();
        assert_eq!(value, json!({"id": "", "x": ""}));
        assert!(value.get("choice").is_none());
        group.focus();
        assert!(group.next());
        assert!(!group.accepts_text_input());
    }

    #[test]
    fn unsupported_children_are_listed_not_materialized() {
        let group = GroupNode::new(
            vec![FieldNode::new(
                "ok",
                NodeKind::Text(TextEditor::new("Enter ok...", 0)),
            )],
            vec![
                UnsupportedField::new("blob", "unknown type"),
                UnsupportedField::new("deep", "too deep"),
            ],
        );
        assert_eq!(group.value(), json!({"ok": ""}));
        assert_eq!(
            group.unsupported_notice().as_deref(),
            Some("(unsupported: blob, deep)")
        );
        let rendered = group.render_body(&RenderContext::default(), 0);
        assert_eq!(rendered.lines.len(), 2);
    }

    #[test]
    fn keys_only_reach_focused_child() {
        let mut group = sample();
        type_text(&mut group, "ignored");
        assert_eq!(group.value()["a"], json!(""));
        group.focus();
        group.next();
        type_text(&mut group, "hi");
        assert_eq!(group.value()["inner"]["b"], json!("hi"));
    }
}
