use crossterm::event::{KeyCode, KeyEvent};
use ratatui::text::Line;
use serde_json::{Map, Value};

use super::{
    choice::{ChoiceOption, ChoicePicker},
    field::{FieldNode, KeyOutcome, NodeEffect, RenderContext, Rendered, indent, marker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneofFocus {
    Selector,
    Alternative,
}

/// Exclusive alternatives. Every alternative is built up front and keeps its edits
/// while unselected; only the selected one reaches the materialized value.
#[derive(Debug, Clone)]
pub struct OneofNode {
    selector: ChoicePicker,
    alternatives: Vec<FieldNode>,
    state: OneofFocus,
    focused: bool,
}

impl OneofNode {
    pub fn new(alternatives: Vec<FieldNode>) -> Self {
        let options = alternatives
            .iter()
            .map(|alt| ChoiceOption::new(&alt.name, &alt.name))
            .collect();
        Self {
            selector: ChoicePicker::new(options),
            alternatives,
            state: OneofFocus::Selector,
            focused: false,
        }
    }

    pub fn state(&self) -> OneofFocus {
        self.state
    }

    pub fn selected_index(&self) -> usize {
        self.selector.selected_index()
    }

    pub fn selected(&self) -> Option<&FieldNode> {
        self.alternatives.get(self.selector.selected_index())
    }

    fn selected_mut(&mut self) -> Option<&mut FieldNode> {
        self.alternatives.get_mut(self.selector.selected_index())
    }

    pub fn alternatives(&self) -> &[FieldNode] {
        &self.alternatives
    }

    pub fn is_focusable(&self) -> bool {
        !self.alternatives.is_empty()
    }

    pub fn value(&self) -> Value {
        let mut map = Map::new();
        if let Some(selected) = self.selected() {
            map.insert(selected.name.clone(), selected.value());
        }
        Value::Object(map)
    }

    pub fn focus(&mut self) -> NodeEffect {
        self.focused = true;
        self.state = OneofFocus::Selector;
        NodeEffect::None
    }

    pub fn focus_from_end(&mut self) -> NodeEffect {
        self.focused = true;
        match self.selected_mut() {
            Some(alt) if alt.is_focusable() => {
                let effect = alt.focus_from_end();
                self.state = OneofFocus::Alternative;
                effect
            }
            _ => {
                self.state = OneofFocus::Selector;
                NodeEffect::None
            }
        }
    }

    pub fn blur(&mut self) {
        self.focused = false;
        if self.state == OneofFocus::Alternative
            && let Some(alt) = self.selected_mut()
        {
            alt.blur();
        }
    }

    pub fn next(&mut self) -> bool {
        if !self.focused {
            return false;
        }
        match self.state {
            OneofFocus::Selector => match self.selected_mut() {
                Some(alt) if alt.is_focusable() => {
                    alt.focus();
                    self.state = OneofFocus::Alternative;
                    true
                }
                _ => false,
            },
            OneofFocus::Alternative => {
                let Some(alt) = self.selected_mut() else {
                    return false;
                };
                if alt.next() {
                    return true;
                }
                alt.blur();
                false
            }
        }
    }

    /// Leaving the alternative backwards always lands on the selector first.
    pub fn prev(&mut self) -> bool {
        if !self.focused {
            return false;
        }
        match self.state {
            OneofFocus::Selector => false,
            OneofFocus::Alternative => {
                if let Some(alt) = self.selected_mut() {
                    if alt.prev() {
                        return true;
                    }
                    alt.blur();
                }
                self.state = OneofFocus::Selector;
                true
            }
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !self.focused {
            return KeyOutcome::IGNORED;
        }
        match self.state {
            OneofFocus::Selector => match key.code {
                KeyCode::Left | KeyCode::Right => self.selector.handle_key(key),
                _ => KeyOutcome::IGNORED,
            },
            OneofFocus::Alternative => match self.selected_mut() {
                Some(alt) => alt.handle_key(key),
                None => KeyOutcome::IGNORED,
            },
        }
    }

    pub fn accepts_text_input(&self) -> bool {
        self.focused
            && self.state == OneofFocus::Alternative
            && self.selected().is_some_and(FieldNode::accepts_text_input)
    }

    pub fn set_width(&mut self, width: u16) {
        for alt in &mut self.alternatives {
            alt.set_width(width);
        }
    }

    pub(crate) fn collect_focus_path<'a>(&'a self, path: &mut Vec<&'a str>) {
        if !self.focused {
            return;
        }
        match self.state {
            OneofFocus::Selector => path.push("variant"),
            OneofFocus::Alternative => {
                if let Some(alt) = self.selected() {
                    path.push(&alt.name);
                    alt.collect_focus_path(path);
                }
            }
        }
    }

    pub fn render_body(&self, ctx: &RenderContext, depth: usize) -> Rendered {
        let mut rendered = Rendered::default();
        let selector_focused = self.focused && self.state == OneofFocus::Selector;
        let mut line = vec![ctx.label(
            format!("{}{}variant: ", indent(depth), marker(selector_focused)),
            selector_focused,
        )];
        line.extend(self.selector.render_value(&ctx.theme));
        rendered.push_marked(Line::from(line), selector_focused);
        if let Some(alt) = self.selected() {
            let alt_focused = self.focused && self.state == OneofFocus::Alternative;
            rendered.append(alt.render(ctx, alt_focused, depth));
        }
        rendered
    }
}
