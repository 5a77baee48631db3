use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::text::{Line, Span};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    domain::{MethodInfo, SchemaNode},
    form::{GroupNode, NodeEffect, RenderContext, Rendered, build_form, marker},
};

use super::{
    invoke::{CallOutcome, InvocationRequest},
    keymap::{self, KeyAction, KeymapContext},
    status::StatusLine,
};

/// Columns reserved around the form body for borders and the focus marker.
pub const BODY_WIDTH_OVERHEAD: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Calling,
    Result { success: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Field,
    Submit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Key(KeyEvent),
    CallCompleted(CallOutcome),
}

/// Work the form asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEffect {
    None,
    Invoke(InvocationRequest),
    Copy(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: FormPhase,
    pub effect: FormEffect,
}

/// One procedure's form: the field tree, a submit button and the call lifecycle.
pub struct FormController {
    method: MethodInfo,
    root: GroupNode,
    focus: FormFocus,
    phase: FormPhase,
    outcome: Option<CallOutcome>,
    status: StatusLine,
    dirty: bool,
    width: u16,
    height: u16,
}

impl FormController {
    pub fn new(method: MethodInfo, input: &SchemaNode) -> Self {
        Self {
            method,
            root: build_form(input),
            focus: FormFocus::Submit,
            phase: FormPhase::Editing,
            outcome: None,
            status: StatusLine::new(),
            dirty: false,
            width: 0,
            height: 0,
        }
    }

    /// Place the focus on the first field, or on Submit when nothing is editable.
    pub fn init(&mut self) {
        if self.root.is_focusable() {
            self.root.focus();
            self.focus = FormFocus::Field;
            self.announce_focus();
        } else {
            self.focus = FormFocus::Submit;
            self.status.ready();
        }
    }

    pub fn method(&self) -> &MethodInfo {
        &self.method
    }

    pub fn title(&self) -> String {
        self.method.signature()
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn focus(&self) -> FormFocus {
        self.focus
    }

    pub fn root(&self) -> &GroupNode {
        &self.root
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusLine {
        &mut self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn payload(&self) -> Value {
        self.root.value()
    }

    pub fn outcome(&self) -> Option<&CallOutcome> {
        self.outcome.as_ref()
    }

    pub fn accepts_text_input(&self) -> bool {
        self.phase == FormPhase::Editing
            && self.focus == FormFocus::Field
            && self.root.accepts_text_input()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.root
            .set_width(width.saturating_sub(BODY_WIDTH_OVERHEAD));
    }

    pub fn help(&self) -> Option<String> {
        match self.phase {
            FormPhase::Editing => keymap::help_text(KeymapContext::Form),
            FormPhase::Calling => None,
            FormPhase::Result { .. } => keymap::help_text(KeymapContext::Result),
        }
    }

    pub fn handle_event(&mut self, event: FormEvent) -> Transition {
        let effect = match event {
            FormEvent::Key(key) => match self.phase {
                FormPhase::Editing => self.handle_editing_key(&key),
                FormPhase::Calling => FormEffect::None,
                FormPhase::Result { .. } => self.handle_result_key(&key),
            },
            FormEvent::CallCompleted(outcome) => {
                self.complete(outcome);
                FormEffect::None
            }
        };
        Transition {
            state: self.phase,
            effect,
        }
    }

    fn handle_editing_key(&mut self, key: &KeyEvent) -> FormEffect {
        if let Some(action) = keymap::classify(KeymapContext::Form, key) {
            return self.apply_action(action);
        }
        let takes_text = self.focus == FormFocus::Field && self.root.accepts_text_input();
        if !takes_text && let Some(action) = keymap::classify(KeymapContext::FormNav, key) {
            return self.apply_action(action);
        }
        match self.focus {
            FormFocus::Submit if key.code == KeyCode::Enter => self.submit(),
            FormFocus::Submit => FormEffect::None,
            FormFocus::Field => {
                let outcome = self.root.handle_key(key);
                if outcome.consumed {
                    self.apply_node_effect(outcome.effect);
                } else if key.code == KeyCode::Enter {
                    self.focus_next();
                }
                FormEffect::None
            }
        }
    }

    fn apply_action(&mut self, action: KeyAction) -> FormEffect {
        match action {
            KeyAction::FocusStep(delta) if delta < 0 => self.focus_prev(),
            KeyAction::FocusStep(_) => self.focus_next(),
            KeyAction::Submit => return self.submit(),
            KeyAction::Cycle(delta) if self.focus == FormFocus::Field => {
                let code = if delta < 0 {
                    KeyCode::Left
                } else {
                    KeyCode::Right
                };
                let outcome = self
                    .root
                    .handle_key(&KeyEvent::new(code, KeyModifiers::NONE));
                if outcome.consumed {
                    self.apply_node_effect(outcome.effect);
                }
            }
            KeyAction::Quit => return FormEffect::Quit,
            _ => {}
        }
        FormEffect::None
    }

    fn apply_node_effect(&mut self, effect: NodeEffect) {
        match effect {
            NodeEffect::None | NodeEffect::ShowCursor => {}
            NodeEffect::Edited => self.dirty = true,
            NodeEffect::Added { index } => {
                self.dirty = true;
                self.status.added(index);
                debug!(index, "entry added");
            }
            NodeEffect::Removed { index } => {
                self.dirty = true;
                self.status.removed(index);
                debug!(index, "entry removed");
            }
        }
    }

    /// Advance focus; past the last field it lands on Submit, past Submit it wraps.
    fn focus_next(&mut self) {
        match self.focus {
            FormFocus::Field => {
                if !self.root.next() {
                    self.root.blur();
                    self.focus = FormFocus::Submit;
                }
            }
            FormFocus::Submit => {
                if self.root.is_focusable() {
                    self.root.focus();
                    self.focus = FormFocus::Field;
                }
            }
        }
        self.announce_focus();
    }

    fn focus_prev(&mut self) {
        match self.focus {
            FormFocus::Field => {
                if !self.root.prev() {
                    self.root.blur();
                    self.focus = FormFocus::Submit;
                }
            }
            FormFocus::Submit => {
                if self.root.is_focusable() {
                    self.root.focus_from_end();
                    self.focus = FormFocus::Field;
                }
            }
        }
        self.announce_focus();
    }

    fn announce_focus(&mut self) {
        match self.focus {
            FormFocus::Field => {
                let mut path = Vec::new();
                self.root.collect_focus_path(&mut path);
                let label = path.join(".");
                debug!(field = %label, "focus moved");
                self.status.editing(&label);
            }
            FormFocus::Submit => self.status.ready(),
        }
    }

    fn submit(&mut self) -> FormEffect {
        let payload = self.root.value();
        let procedure = self.method.full_name.clone();
        info!(procedure = %procedure, "submitting form");
        self.phase = FormPhase::Calling;
        self.status.calling(&procedure);
        FormEffect::Invoke(InvocationRequest { procedure, payload })
    }

    fn complete(&mut self, outcome: CallOutcome) {
        if self.phase != FormPhase::Calling {
            debug!(phase = ?self.phase, "ignoring completion outside a call");
            return;
        }
        let success = outcome.is_ok();
        info!(procedure = %self.method.full_name, success, "call completed");
        if success {
            self.status.completed();
        } else {
            self.status.failed();
        }
        self.phase = FormPhase::Result { success };
        self.outcome = Some(outcome);
    }

    fn handle_result_key(&mut self, key: &KeyEvent) -> FormEffect {
        match keymap::classify(KeymapContext::Result, key) {
            Some(KeyAction::Copy) => match self.result_text() {
                Some(text) => {
                    self.status.copied();
                    FormEffect::Copy(text)
                }
                None => FormEffect::None,
            },
            Some(KeyAction::Quit) => FormEffect::Quit,
            _ => FormEffect::None,
        }
    }

    /// Response text, or the error message for a failed call.
    pub fn result_text(&self) -> Option<String> {
        self.outcome.as_ref().map(|outcome| match outcome {
            Ok(text) => text.clone(),
            Err(err) => err.to_string(),
        })
    }

    pub fn render(&self, ctx: &RenderContext) -> Rendered {
        let mut rendered = Rendered::default();
        match self.phase {
            FormPhase::Editing => {
                if self.root.is_empty() {
                    rendered.push(Line::from(Span::styled(
                        "No input fields.",
                        ctx.theme.placeholder,
                    )));
                }
                rendered.append(self.root.render_body(ctx, 0));
                rendered.push(Line::default());
                let on_submit = self.focus == FormFocus::Submit;
                rendered.push_marked(
                    Line::from(Span::styled(
                        format!("{}[Submit]", marker(on_submit)),
                        ctx.theme.label_style(on_submit),
                    )),
                    on_submit,
                );
            }
            FormPhase::Calling => {
                rendered.push(Line::from(Span::styled("Calling...", ctx.theme.placeholder)));
            }
            FormPhase::Result { success } => {
                let (title, style) = if success {
                    ("Response", ctx.theme.header)
                } else {
                    ("Error", ctx.theme.error)
                };
                rendered.push(Line::from(Span::styled(title, style)));
                rendered.push(Line::default());
                let width = usize::from(self.width.saturating_sub(BODY_WIDTH_OVERHEAD)).max(20);
                for line in self.result_text().unwrap_or_default().lines() {
                    if line.len() <= width {
                        rendered.push(Line::from(line.to_string()));
                        continue;
                    }
                    for piece in textwrap::wrap(line, width) {
                        rendered.push(Line::from(piece.into_owned()));
                    }
                }
            }
        }
        rendered
    }
}
