use crossterm::event::KeyEvent;
use tracing::{debug, warn};

use crate::domain::{MethodInfo, SchemaError, SchemaProvider};

use super::{
    controller::{FormController, FormEffect, FormEvent, FormPhase},
    invoke::{CallCompletion, InvocationRequest},
    keymap::{self, KeyAction, KeymapContext},
    status::StatusLine,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Services,
    Methods,
    Form,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    Key(KeyEvent),
    Completed(CallCompletion),
    Resize(u16, u16),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavEffect {
    None,
    Invoke {
        session: u64,
        request: InvocationRequest,
    },
    Copy(String),
    Quit,
}

/// Services list, then a service's procedures, then one procedure's form.
pub struct Navigator {
    provider: Box<dyn SchemaProvider>,
    screen: Screen,
    services: Vec<String>,
    service_index: usize,
    methods: Vec<MethodInfo>,
    method_index: usize,
    form: Option<FormController>,
    session: u64,
    status: StatusLine,
    width: u16,
    height: u16,
}

impl Navigator {
    pub fn new(provider: Box<dyn SchemaProvider>) -> Self {
        let services = provider.services();
        let mut status = StatusLine::new();
        status.set_raw(format!("{} service(s)", services.len()));
        Self {
            provider,
            screen: Screen::Services,
            services,
            service_index: 0,
            methods: Vec::new(),
            method_index: 0,
            form: None,
            session: 0,
            status,
            width: 0,
            height: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn service_index(&self) -> usize {
        self.service_index
    }

    pub fn current_service(&self) -> Option<&str> {
        self.services.get(self.service_index).map(String::as_str)
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn method_index(&self) -> usize {
        self.method_index
    }

    pub fn form(&self) -> Option<&FormController> {
        self.form.as_ref()
    }

    /// Id of the form currently open; completions carrying another id are stale.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn status(&self) -> &StatusLine {
        match (&self.form, self.screen) {
            (Some(form), Screen::Form) => form.status(),
            _ => &self.status,
        }
    }

    /// Show a failure on whichever status line is visible.
    pub fn report_error(&mut self, message: impl Into<String>) {
        match (&mut self.form, self.screen) {
            (Some(form), Screen::Form) => form.status_mut().error(message),
            _ => self.status.error(message),
        }
    }

    pub fn accepts_text_input(&self) -> bool {
        self.screen == Screen::Form
            && self
                .form
                .as_ref()
                .is_some_and(FormController::accepts_text_input)
    }

    pub fn help(&self) -> Option<String> {
        match (&self.form, self.screen) {
            (Some(form), Screen::Form) => form.help(),
            _ => keymap::help_text(KeymapContext::Browse),
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        if let Some(form) = &mut self.form {
            form.set_size(width, height);
        }
    }

    /// Jump straight to `procedure`'s form, selecting its service and method on the way.
    pub fn open_procedure(&mut self, procedure: &str) -> Result<(), SchemaError> {
        let method = self.provider.method(procedure)?;
        let service = method
            .full_name
            .rsplit_once('.')
            .map(|(service, _)| service.to_string())
            .unwrap_or_default();
        if let Some(index) = self.services.iter().position(|name| *name == service) {
            self.service_index = index;
            self.methods = self.provider.methods(&service)?;
        }
        self.method_index = self
            .methods
            .iter()
            .position(|candidate| candidate.full_name == method.full_name)
            .unwrap_or(0);
        self.open_form(method)
    }

    pub fn handle_event(&mut self, event: NavEvent) -> NavEffect {
        match event {
            NavEvent::Key(key) => self.handle_key(&key),
            NavEvent::Completed(completion) => {
                self.deliver(completion);
                NavEffect::None
            }
            NavEvent::Resize(width, height) => {
                self.set_size(width, height);
                NavEffect::None
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> NavEffect {
        if keymap::classify(KeymapContext::Global, key) == Some(KeyAction::ForceQuit) {
            return NavEffect::Quit;
        }
        match self.screen {
            Screen::Services => self.handle_browse_key(key, Screen::Services),
            Screen::Methods => self.handle_browse_key(key, Screen::Methods),
            Screen::Form => self.handle_form_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: &KeyEvent, screen: Screen) -> NavEffect {
        match keymap::classify(KeymapContext::Browse, key) {
            Some(KeyAction::ListStep(delta)) => {
                let (index, len) = match screen {
                    Screen::Services => (&mut self.service_index, self.services.len()),
                    _ => (&mut self.method_index, self.methods.len()),
                };
                *index = step_index(*index, delta, len);
            }
            Some(KeyAction::Open) => match screen {
                Screen::Services => self.open_service(),
                _ => self.open_selected_method(),
            },
            Some(KeyAction::Back) if screen == Screen::Methods => {
                self.screen = Screen::Services;
                self.status.set_raw(format!("{} service(s)", self.services.len()));
            }
            Some(KeyAction::Back | KeyAction::Quit) => return NavEffect::Quit,
            _ => {}
        }
        NavEffect::None
    }

    fn handle_form_key(&mut self, key: &KeyEvent) -> NavEffect {
        let Some(form) = &mut self.form else {
            self.screen = Screen::Methods;
            return NavEffect::None;
        };
        let context = match form.phase() {
            FormPhase::Result { .. } => KeymapContext::Result,
            FormPhase::Editing | FormPhase::Calling => KeymapContext::Form,
        };
        if keymap::classify(context, key) == Some(KeyAction::Back) {
            self.close_form();
            return NavEffect::None;
        }
        match form.handle_event(FormEvent::Key(*key)).effect {
            FormEffect::None => NavEffect::None,
            FormEffect::Invoke(request) => NavEffect::Invoke {
                session: self.session,
                request,
            },
            FormEffect::Copy(text) => NavEffect::Copy(text),
            FormEffect::Quit => NavEffect::Quit,
        }
    }

    fn deliver(&mut self, completion: CallCompletion) {
        match &mut self.form {
            Some(form) if completion.session == self.session => {
                form.handle_event(FormEvent::CallCompleted(completion.outcome));
            }
            _ => debug!(
                session = completion.session,
                current = self.session,
                "dropping stale completion"
            ),
        }
    }

    fn open_service(&mut self) {
        let Some(service) = self.current_service().map(str::to_string) else {
            return;
        };
        match self.provider.methods(&service) {
            Ok(methods) => {
                self.status
                    .set_raw(format!("{} method(s) in {service}", methods.len()));
                self.methods = methods;
                self.method_index = 0;
                self.screen = Screen::Methods;
            }
            Err(err) => {
                warn!(service = %service, error = %err, "failed to list methods");
                self.status.error(err.to_string());
            }
        }
    }

    fn open_selected_method(&mut self) {
        let Some(method) = self.methods.get(self.method_index).cloned() else {
            return;
        };
        if let Err(err) = self.open_form(method) {
            warn!(error = %err, "failed to open form");
            self.status.error(err.to_string());
        }
    }

    fn open_form(&mut self, method: MethodInfo) -> Result<(), SchemaError> {
        let input = self.provider.resolve_input_schema(&method.full_name)?;
        self.session += 1;
        debug!(session = self.session, procedure = %method.full_name, "opening form");
        let mut form = FormController::new(method, &input);
        form.set_size(self.width, self.height);
        form.init();
        self.form = Some(form);
        self.screen = Screen::Form;
        Ok(())
    }

    /// Drops the form tree; a call still in flight completes into nothing.
    fn close_form(&mut self) {
        if let Some(form) = self.form.take() {
            debug!(procedure = %form.method().full_name, "closing form");
        }
        self.screen = Screen::Methods;
        self.status
            .set_raw(format!("{} method(s)", self.methods.len()));
    }
}

fn step_index(index: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = index as i64 + i64::from(delta);
    next.clamp(0, len as i64 - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::invoke::InvokeError, domain::Catalog, io::DocumentFormat};
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const CATALOG: &str = r#"{
        "services": [
            {"name": "demo.Greeter", "methods": [
                {"name": "Greet", "input": "demo.GreetRequest", "output": "demo.GreetReply"}
            ]},
            {"name": "demo.Admin", "methods": [
                {"name": "Reset", "input": "demo.Empty", "output": "demo.Empty"}
            ]}
        ],
        "messages": {
            "demo.GreetRequest": {"fields": [{"name": "name", "type": "string"}]},
            "demo.GreetReply": {"fields": []},
            "demo.Empty": {"fields": []}
        }
    }"#;

    fn navigator() -> Navigator {
        let catalog = Catalog::from_document(CATALOG, DocumentFormat::Json).unwrap();
        let mut nav = Navigator::new(Box::new(catalog));
        nav.set_size(80, 24);
        nav
    }

    fn key(code: KeyCode) -> NavEvent {
        NavEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn drills_down_and_backs_out() {
        let mut nav = navigator();
        assert_eq!(nav.services(), ["demo.Admin", "demo.Greeter"]);
        nav.handle_event(key(KeyCode::Down));
        nav.handle_event(key(KeyCode::Enter));
        assert_eq!(nav.screen(), Screen::Methods);
        assert_eq!(nav.methods()[0].full_name, "demo.Greeter.Greet");
        nav.handle_event(key(KeyCode::Enter));
        assert_eq!(nav.screen(), Screen::Form);
        assert_eq!(nav.session(), 1);
        nav.handle_event(key(KeyCode::Esc));
        assert_eq!(nav.screen(), Screen::Methods);
        assert!(nav.form().is_none());
        assert_eq!(nav.handle_event(key(KeyCode::Esc)), NavEffect::None);
        assert_eq!(nav.screen(), Screen::Services);
        assert_eq!(nav.handle_event(key(KeyCode::Esc)), NavEffect::Quit);
    }

    #[test]
    fn q_types_inside_text_but_quits_elsewhere() {
        let mut nav = navigator();
        nav.open_procedure("demo.Greeter.Greet").unwrap();
        assert_eq!(nav.handle_event(key(KeyCode::Char('q'))), NavEffect::None);
        assert_eq!(
            nav.form().map(FormController::payload),
            Some(json!({"name": "q"}))
        );
        let ctrl_c = NavEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(nav.handle_event(ctrl_c), NavEffect::Quit);

        nav.handle_event(key(KeyCode::Esc));
        assert_eq!(nav.handle_event(key(KeyCode::Char('q'))), NavEffect::Quit);
    }

    #[test]
    fn submission_is_tagged_with_session() {
        let mut nav = navigator();
        nav.open_procedure("demo.Greeter.Greet").unwrap();
        let effect = nav.handle_event(NavEvent::Key(KeyEvent::new(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(
            effect,
            NavEffect::Invoke {
                session: 1,
                request: InvocationRequest {
                    procedure: "demo.Greeter.Greet".into(),
                    payload: json!({"name": ""}),
                },
            }
        );
        nav.handle_event(NavEvent::Completed(CallCompletion {
            session: 1,
            outcome: Err(InvokeError::Failed("boom".into())),
        }));
        assert_eq!(
            nav.form().map(FormController::phase),
            Some(FormPhase::Result { success: false })
        );
    }

    #[test]
    fn stale_completion_is_dropped_after_backing_out() {
        let mut nav = navigator();
        nav.open_procedure("demo.Greeter.Greet").unwrap();
        nav.handle_event(NavEvent::Key(KeyEvent::new(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL,
        )));
        nav.handle_event(key(KeyCode::Esc));
        nav.open_procedure("demo.Greeter.Greet").unwrap();
        assert_eq!(nav.session(), 2);
        nav.handle_event(NavEvent::Completed(CallCompletion {
            session: 1,
            outcome: Ok("late".into()),
        }));
        assert_eq!(
            nav.form().map(FormController::phase),
            Some(FormPhase::Editing)
        );
    }

    #[test]
    fn unknown_procedure_is_reported() {
        let mut nav = navigator();
        assert_eq!(
            nav.open_procedure("demo.Greeter.Missing"),
            Err(SchemaError::UnknownMethod("demo.Greeter.Missing".into()))
        );
        assert_eq!(nav.screen(), Screen::Services);
    }

    #[test]
    fn resize_reaches_open_form() {
        let mut nav = navigator();
        nav.open_procedure("demo.Admin.Reset").unwrap();
        nav.handle_event(NavEvent::Resize(120, 40));
        assert_eq!(nav.form().map(FormController::size), Some((120, 40)));
    }
}
