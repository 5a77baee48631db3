use crossterm::event::{KeyCode, KeyEvent};
use ratatui::text::{Line, Span};
use serde_json::Value;
use tracing::debug;

use crate::domain::SchemaNode;

use super::{
    builder::build_node,
    field::{FieldNode, KeyOutcome, NodeEffect, RenderContext, Rendered, indent, marker},
};

/// Columns taken by list indentation and the inline remove button.
pub const LIST_WIDTH_OVERHEAD: u16 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFocus {
    Add,
    Item(usize),
    Remove(usize),
}

/// Homogeneous, growable sequence. Items are labelled `[i]` by position.
#[derive(Debug, Clone)]
pub struct ListNode {
    element: SchemaNode,
    items: Vec<FieldNode>,
    target: ListFocus,
    focused: bool,
    width: u16,
}

impl ListNode {
    pub fn new(element: SchemaNode) -> Self {
        Self {
            element,
            items: Vec::new(),
            target: ListFocus::Add,
            focused: false,
            width: 0,
        }
    }

    pub fn items(&self) -> &[FieldNode] {
        &self.items
    }

    pub fn target(&self) -> ListFocus {
        self.target
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn value(&self) -> Value {
        Value::Array(self.items.iter().map(FieldNode::value).collect())
    }

    /// Append a fresh element. Focus does not move.
    pub fn add_item(&mut self) -> Option<usize> {
        let index = self.items.len();
        let mut item = build_node(&self.element).ok()?;
        item.name = format!("[{index}]");
        if self.width > 0 {
            item.set_width(self.width.saturating_sub(LIST_WIDTH_OVERHEAD));
        }
        self.items.push(item);
        debug!(index, "list item added");
        Some(index)
    }

    pub fn remove_item(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        for (idx, item) in self.items.iter_mut().enumerate().skip(index) {
            item.name = format!("[{idx}]");
        }
        if self.items.is_empty() {
            self.target = ListFocus::Add;
        } else {
            let last = self.items.len() - 1;
            self.target = match self.target {
                ListFocus::Item(i) => ListFocus::Item(i.min(last)),
                ListFocus::Remove(i) => ListFocus::Remove(i.min(last)),
                ListFocus::Add => ListFocus::Add,
            };
        }
        debug!(index, "list item removed");
        true
    }

    pub fn focus(&mut self) -> NodeEffect {
        self.focused = true;
        self.target = ListFocus::Add;
        NodeEffect::None
    }

    pub fn focus_from_end(&mut self) -> NodeEffect {
        self.focused = true;
        self.target = match self.items.len() {
            0 => ListFocus::Add,
            len => ListFocus::Remove(len - 1),
        };
        NodeEffect::None
    }

    pub fn blur(&mut self) {
        self.focused = false;
        if let ListFocus::Item(i) = self.target
            && let Some(item) = self.items.get_mut(i)
        {
            item.blur();
        }
    }

    pub fn next(&mut self) -> bool {
        if !self.focused {
            return false;
        }
        match self.target {
            ListFocus::Add => {
                if self.items.is_empty() {
                    return false;
                }
                self.enter_item(0);
                true
            }
            ListFocus::Item(i) => {
                if self.items[i].next() {
                    return true;
                }
                self.items[i].blur();
                self.target = ListFocus::Remove(i);
                true
            }
            ListFocus::Remove(i) => {
                if i + 1 >= self.items.len() {
                    return false;
                }
                self.enter_item(i + 1);
                true
            }
        }
    }

    pub fn prev(&mut self) -> bool {
        if !self.focused {
            return false;
        }
        match self.target {
            ListFocus::Add => false,
            ListFocus::Item(i) => {
                if self.items[i].prev() {
                    return true;
                }
                self.items[i].blur();
                self.target = match i {
                    0 => ListFocus::Add,
                    _ => ListFocus::Remove(i - 1),
                };
                true
            }
            ListFocus::Remove(i) => {
                if self.items[i].is_focusable() {
                    self.target = ListFocus::Item(i);
                    self.items[i].focus_from_end();
                } else {
                    self.target = match i {
                        0 => ListFocus::Add,
                        _ => ListFocus::Remove(i - 1),
                    };
                }
                true
            }
        }
    }

    fn enter_item(&mut self, index: usize) {
        if self.items[index].is_focusable() {
            self.target = ListFocus::Item(index);
            self.items[index].focus();
        } else {
            self.target = ListFocus::Remove(index);
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !self.focused {
            return KeyOutcome::IGNORED;
        }
        let activate = matches!(key.code, KeyCode::Enter | KeyCode::Char(' '));
        match self.target {
            ListFocus::Add if activate => match self.add_item() {
                Some(index) => KeyOutcome::consumed(NodeEffect::Added { index }),
                None => KeyOutcome::consumed(NodeEffect::None),
            },
            ListFocus::Remove(i) if activate => {
                self.remove_item(i);
                KeyOutcome::consumed(NodeEffect::Removed { index: i })
            }
            ListFocus::Remove(i) if key.code == KeyCode::Left => {
                if !self.items[i].is_focusable() {
                    return KeyOutcome::IGNORED;
                }
                self.target = ListFocus::Item(i);
                KeyOutcome::consumed(self.items[i].focus())
            }
            ListFocus::Item(i) => {
                let outcome = self.items[i].handle_key(key);
                if outcome.consumed {
                    return outcome;
                }
                if key.code == KeyCode::Right {
                    self.items[i].blur();
                    self.target = ListFocus::Remove(i);
                    return KeyOutcome::consumed(NodeEffect::None);
                }
                KeyOutcome::IGNORED
            }
            _ => KeyOutcome::IGNORED,
        }
    }

    pub fn accepts_text_input(&self) -> bool {
        match self.target {
            ListFocus::Item(i) if self.focused => self.items[i].accepts_text_input(),
            _ => false,
        }
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
        let inner = width.saturating_sub(LIST_WIDTH_OVERHEAD);
        for item in &mut self.items {
            item.set_width(inner);
        }
    }

    pub(crate) fn collect_focus_path<'a>(&'a self, path: &mut Vec<&'a str>) {
        if !self.focused {
            return;
        }
        match self.target {
            ListFocus::Add => path.push("[+]"),
            ListFocus::Item(i) => {
                path.push(&self.items[i].name);
                self.items[i].collect_focus_path(path);
            }
            ListFocus::Remove(i) => {
                path.push(&self.items[i].name);
                path.push("[-]");
            }
        }
    }

    pub fn render_body(&self, ctx: &RenderContext, depth: usize) -> Rendered {
        let mut rendered = Rendered::default();
        let pad = indent(depth);
        let add_focused = self.focused && self.target == ListFocus::Add;
        rendered.push_marked(
            Line::from(ctx.label(format!("{pad}{}[+] Add", marker(add_focused)), add_focused)),
            add_focused,
        );
        for (idx, item) in self.items.iter().enumerate() {
            let item_focused = self.focused && self.target == ListFocus::Item(idx);
            let remove_focused = self.focused && self.target == ListFocus::Remove(idx);
            let mut block = item.render(ctx, item_focused, depth);
            if item.is_leaf() {
                let button = if remove_focused { "  > [-]" } else { "    [-]" };
                if let Some(line) = block.lines.first_mut() {
                    line.spans
                        .push(Span::styled(button, ctx.theme.label_style(remove_focused)));
                }
                if remove_focused {
                    block.focus_line = Some(0);
                }
            } else {
                block.push_marked(
                    Line::from(ctx.label(
                        format!("{}{}[-] Remove", indent(depth + 1), marker(remove_focused)),
                        remove_focused,
                    )),
                    remove_focused,
                );
            }
            rendered.append(block);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(list: &mut ListNode, text: &str) {
        for ch in text.chars() {
            list.handle_key(&press(KeyCode::Char(ch)));
        }
    }

    fn labels(list: &ListNode) -> Vec<String> {
        list.items().iter().map(|item| item.name.clone()).collect()
    }

    #[test]
    fn empty_list_only_offers_add() {
        let mut list = ListNode::new(SchemaNode::string("tag"));
        list.focus();
        assert!(!list.next());
        assert!(!list.prev());
        assert_eq!(list.target(), ListFocus::Add);
        assert_eq!(list.value(), json!([]));
    }

    #[test]
    fn add_does_not_move_focus() {
        let mut list = ListNode::new(SchemaNode::string("tag"));
        list.focus();
        let outcome = list.handle_key(&press(KeyCode::Enter));
        assert_eq!(outcome.effect, NodeEffect::Added { index: 0 });
        assert_eq!(list.target(), ListFocus::Add);
        list.handle_key(&press(KeyCode::Char(' ')));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn walks_add_item_remove_in_order() {
        let mut list = ListNode::new(SchemaNode::string("tag"));
        list.add_item();
        list.add_item();
        list.focus();
        let mut visited = vec![list.target()];
        while list.next() {
            visited.push(list.target());
        }
        assert_eq!(
            visited,
            vec![
                ListFocus::Add,
                ListFocus::Item(0),
                ListFocus::Remove(0),
                ListFocus::Item(1),
                ListFocus::Remove(1),
            ]
        );
        let mut back = vec![list.target()];
        while list.prev() {
            back.push(list.target());
        }
        visited.reverse();
        assert_eq!(back, visited);
    }

    #[test]
    fn removal_relabels_and_keeps_relative_order() {
        let mut list = ListNode::new(SchemaNode::string("tag"));
        list.focus();
        for _ in 0..3 {
            list.add_item();
        }
        for word in ["a", "b", "c"] {
            list.next();
            type_text(&mut list, word);
            list.next();
        }
        assert!(list.remove_item(1));
        assert_eq!(labels(&list), vec!["[0]", "[1]"]);
        assert_eq!(list.value(), json!(["a", "c"]));
    }

    #[test]
    fn removing_last_entry_clamps_focus() {
        let mut list = ListNode::new(SchemaNode::string("tag"));
        list.add_item();
        list.add_item();
        list.focus_from_end();
        assert_eq!(list.target(), ListFocus::Remove(1));
        let outcome = list.handle_key(&press(KeyCode::Enter));
        assert_eq!(outcome.effect, NodeEffect::Removed { index: 1 });
        assert_eq!(list.target(), ListFocus::Remove(0));
        list.handle_key(&press(KeyCode::Enter));
        assert_eq!(list.target(), ListFocus::Add);
        assert!(list.is_empty());
    }

    #[test]
    fn horizontal_keys_move_between_item_and_remove() {
        let mut list = ListNode::new(SchemaNode::string("tag"));
        list.add_item();
        list.focus();
        list.next();
        type_text(&mut list, "ab");
        assert!(list.accepts_text_input());
        list.handle_key(&press(KeyCode::Right));
        assert_eq!(list.target(), ListFocus::Remove(0));
        assert!(!list.accepts_text_input());
        list.handle_key(&press(KeyCode::Left));
        assert_eq!(list.target(), ListFocus::Item(0));
    }

    #[test]
    fn nested_message_items_recurse_before_stepping() {
        let element = SchemaNode::message(
            "point",
            vec![SchemaNode::int("lat"), SchemaNode::int("lng")],
        );
        let mut list = ListNode::new(element);
        list.add_item();
        list.focus();
        list.next();
        let mut path = Vec::new();
        list.collect_focus_path(&mut path);
        assert_eq!(path, vec!["[0]", "lat"]);
        list.next();
        let mut path = Vec::new();
        list.collect_focus_path(&mut path);
        assert_eq!(path, vec!["[0]", "lng"]);
        list.next();
        assert_eq!(list.target(), ListFocus::Remove(0));
        assert_eq!(list.value(), json!([{"lat": "", "lng": ""}]));
    }

    #[test]
    fn items_shrink_by_overhead() {
        let mut list = ListNode::new(SchemaNode::string("tag"));
        list.set_width(60);
        list.add_item();
        let rendered = list.render_body(&RenderContext::default(), 0);
        let text: Vec<String> = rendered
            .lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect();
        assert_eq!(text, vec!["  [+] Add", "  [0]: Enter tag...    [-]"]);
    }
}
