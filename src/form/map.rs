use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::text::{Line, Span};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::SchemaNode;

use super::{
    builder::build_node,
    field::{FieldNode, KeyOutcome, NodeEffect, RenderContext, Rendered, indent, marker},
};

/// Columns taken by map indentation and the key/value labels.
pub const MAP_WIDTH_OVERHEAD: u16 = 20;

const OVERRIDDEN_NOTICE: &str = "  (overridden by a later entry)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFocus {
    Add,
    Key(usize),
    Value(usize),
    Remove(usize),
}

#[derive(Debug, Clone)]
pub struct MapEntry {
    /// Position label, `[i]`; rewritten when an earlier entry is removed.
    pub label: String,
    pub key: FieldNode,
    pub value: FieldNode,
}

/// Ordered key/value entries. Materialized keys are last-write-wins.
#[derive(Debug, Clone)]
pub struct MapNode {
    key_schema: SchemaNode,
    value_schema: SchemaNode,
    entries: Vec<MapEntry>,
    target: MapFocus,
    focused: bool,
    width: u16,
}

impl MapNode {
    pub fn new(key_schema: SchemaNode, value_schema: SchemaNode) -> Self {
        Self {
            key_schema,
            value_schema,
            entries: Vec::new(),
            target: MapFocus::Add,
            focused: false,
            width: 0,
        }
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn target(&self) -> MapFocus {
        self.target
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn value(&self) -> Value {
        let mut map = Map::new();
        for entry in &self.entries {
            map.insert(key_string(&entry.key), entry.value.value());
        }
        Value::Object(map)
    }

    /// Indices of entries whose key is repeated by a later entry.
    pub fn overridden_entries(&self) -> HashSet<usize> {
        let mut seen = HashSet::new();
        let mut overridden = HashSet::new();
        for (idx, entry) in self.entries.iter().enumerate().rev() {
            if !seen.insert(key_string(&entry.key)) {
                overridden.insert(idx);
            }
        }
        overridden
    }

    pub fn add_entry(&mut self) -> Option<usize> {
        let mut key = build_node(&self.key_schema).ok()?;
        let mut value = build_node(&self.value_schema).ok()?;
        key.name = "key".to_string();
        value.name = "value".to_string();
        if self.width > 0 {
            let inner = self.width.saturating_sub(MAP_WIDTH_OVERHEAD);
            key.set_width(inner);
            value.set_width(inner);
        }
        let index = self.entries.len();
        self.entries.push(MapEntry {
            label: format!("[{index}]"),
            key,
            value,
        });
        debug!(index, "map entry added");
        Some(index)
    }

    pub fn remove_entry(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        for (idx, entry) in self.entries.iter_mut().enumerate().skip(index) {
            entry.label = format!("[{idx}]");
        }
        if self.entries.is_empty() {
            self.target = MapFocus::Add;
        } else {
            let last = self.entries.len() - 1;
            self.target = match self.target {
                MapFocus::Key(i) => MapFocus::Key(i.min(last)),
                MapFocus::Value(i) => MapFocus::Value(i.min(last)),
                MapFocus::Remove(i) => MapFocus::Remove(i.min(last)),
                MapFocus::Add => MapFocus::Add,
            };
        }
        debug!(index, "map entry removed");
        true
    }

    pub fn focus(&mut self) -> NodeEffect {
        self.focused = true;
        self.target = MapFocus::Add;
        NodeEffect::None
    }

    pub fn focus_from_end(&mut self) -> NodeEffect {
        self.focused = true;
        self.target = match self.entries.len() {
            0 => MapFocus::Add,
            len => MapFocus::Remove(len - 1),
        };
        NodeEffect::None
    }

    pub fn blur(&mut self) {
        self.focused = false;
        match self.target {
            MapFocus::Key(i) => self.entries[i].key.blur(),
            MapFocus::Value(i) => self.entries[i].value.blur(),
            _ => {}
        }
    }

    pub fn next(&mut self) -> bool {
        if !self.focused {
            return false;
        }
        match self.target {
            MapFocus::Add => {
                if self.entries.is_empty() {
                    return false;
                }
                self.enter_key(0);
                true
            }
            MapFocus::Key(i) => {
                if self.entries[i].key.next() {
                    return true;
                }
                self.entries[i].key.blur();
                self.enter_value(i);
                true
            }
            MapFocus::Value(i) => {
                if self.entries[i].value.next() {
                    return true;
                }
                self.entries[i].value.blur();
                self.target = MapFocus::Remove(i);
                true
            }
            MapFocus::Remove(i) => {
                if i + 1 >= self.entries.len() {
                    return false;
                }
                self.enter_key(i + 1);
                true
            }
        }
    }

    pub fn prev(&mut self) -> bool {
        if !self.focused {
            return false;
        }
        match self.target {
            MapFocus::Add => false,
            MapFocus::Key(i) => {
                if self.entries[i].key.prev() {
                    return true;
                }
                self.entries[i].key.blur();
                self.target = match i {
                    0 => MapFocus::Add,
                    _ => MapFocus::Remove(i - 1),
                };
                true
            }
            MapFocus::Value(i) => {
                if self.entries[i].value.prev() {
                    return true;
                }
                self.entries[i].value.blur();
                self.target = MapFocus::Key(i);
                self.entries[i].key.focus_from_end();
                true
            }
            MapFocus::Remove(i) => {
                if self.entries[i].value.is_focusable() {
                    self.target = MapFocus::Value(i);
                    self.entries[i].value.focus_from_end();
                } else {
                    self.target = MapFocus::Key(i);
                    self.entries[i].key.focus_from_end();
                }
                true
            }
        }
    }

    fn enter_key(&mut self, index: usize) -> NodeEffect {
        self.target = MapFocus::Key(index);
        self.entries[index].key.focus()
    }

    fn enter_value(&mut self, index: usize) -> NodeEffect {
        if self.entries[index].value.is_focusable() {
            self.target = MapFocus::Value(index);
            self.entries[index].value.focus()
        } else {
            self.target = MapFocus::Remove(index);
            NodeEffect::None
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !self.focused {
            return KeyOutcome::IGNORED;
        }
        let activate = matches!(key.code, KeyCode::Enter | KeyCode::Char(' '));
        match self.target {
            MapFocus::Add if activate => match self.add_entry() {
                Some(index) => KeyOutcome::consumed(NodeEffect::Added { index }),
                None => KeyOutcome::consumed(NodeEffect::None),
            },
            MapFocus::Remove(i) if activate => {
                self.remove_entry(i);
                KeyOutcome::consumed(NodeEffect::Removed { index: i })
            }
            MapFocus::Remove(i) if key.code == KeyCode::Left => {
                let effect = if self.entries[i].value.is_focusable() {
                    self.target = MapFocus::Value(i);
                    self.entries[i].value.focus()
                } else {
                    self.enter_key(i)
                };
                KeyOutcome::consumed(effect)
            }
            MapFocus::Key(i) => {
                let outcome = self.entries[i].key.handle_key(key);
                if outcome.consumed || key.code != KeyCode::Right {
                    return outcome;
                }
                self.entries[i].key.blur();
                KeyOutcome::consumed(self.enter_value(i))
            }
            MapFocus::Value(i) => {
                let outcome = self.entries[i].value.handle_key(key);
                if outcome.consumed {
                    return outcome;
                }
                match key.code {
                    KeyCode::Right => {
                        self.entries[i].value.blur();
                        self.target = MapFocus::Remove(i);
                        KeyOutcome::consumed(NodeEffect::None)
                    }
                    KeyCode::Left => {
                        self.entries[i].value.blur();
                        KeyOutcome::consumed(self.enter_key(i))
                    }
                    _ => outcome,
                }
            }
            _ => KeyOutcome::IGNORED,
        }
    }

    pub fn accepts_text_input(&self) -> bool {
        if !self.focused {
            return false;
        }
        match self.target {
            MapFocus::Key(i) => self.entries[i].key.accepts_text_input(),
            MapFocus::Value(i) => self.entries[i].value.accepts_text_input(),
            _ => false,
        }
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
        let inner = width.saturating_sub(MAP_WIDTH_OVERHEAD);
        for entry in &mut self.entries {
            entry.key.set_width(inner);
            entry.value.set_width(inner);
        }
    }

    pub(crate) fn collect_focus_path<'a>(&'a self, path: &mut Vec<&'a str>) {
        if !self.focused {
            return;
        }
        match self.target {
            MapFocus::Add => path.push("[+]"),
            MapFocus::Key(i) => {
                let entry = &self.entries[i];
                path.push(&entry.label);
                path.push(&entry.key.name);
                entry.key.collect_focus_path(path);
            }
            MapFocus::Value(i) => {
                let entry = &self.entries[i];
                path.push(&entry.label);
                path.push(&entry.value.name);
                entry.value.collect_focus_path(path);
            }
            MapFocus::Remove(i) => {
                path.push(&self.entries[i].label);
                path.push("[-]");
            }
        }
    }

    pub fn render_body(&self, ctx: &RenderContext, depth: usize) -> Rendered {
        let mut rendered = Rendered::default();
        let pad = indent(depth);
        let add_focused = self.focused && self.target == MapFocus::Add;
        rendered.push_marked(
            Line::from(ctx.label(format!("{pad}{}[+] Add", marker(add_focused)), add_focused)),
            add_focused,
        );
        let overridden = self.overridden_entries();
        for (idx, entry) in self.entries.iter().enumerate() {
            let key_focused = self.focused && self.target == MapFocus::Key(idx);
            let value_focused = self.focused && self.target == MapFocus::Value(idx);
            let remove_focused = self.focused && self.target == MapFocus::Remove(idx);
            let entry_focused = key_focused || value_focused || remove_focused;
            let mut header = vec![ctx.label(
                format!("{pad}{}{}:", marker(entry_focused), entry.label),
                entry_focused,
            )];
            if overridden.contains(&idx) {
                header.push(Span::styled(OVERRIDDEN_NOTICE, ctx.theme.warning));
            }
            rendered.push(Line::from(header));
            rendered.append(entry.key.render(ctx, key_focused, depth + 1));
            rendered.append(entry.value.render(ctx, value_focused, depth + 1));
            rendered.push_marked(
                Line::from(ctx.label(
                    format!("{}{}[-] Remove", indent(depth + 1), marker(remove_focused)),
                    remove_focused,
                )),
                remove_focused,
            );
        }
        rendered
    }
}

/// Keys render from the key editor's value: strings verbatim, anything else as JSON text.
fn key_string(key: &FieldNode) -> String {
    match key.value() {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
