#![allow(dead_code)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rpcform::{
    app::{FormController, FormEvent},
    domain::{Catalog, SchemaProvider},
    form::{RenderContext, Rendered},
    io::DocumentFormat,
};

pub const CATALOG: &str = r#"{
    "services": [
        {"name": "demo.Users", "methods": [
            {"name": "Create", "input": "demo.CreateUser", "output": "demo.User"},
            {"name": "Ping", "input": "demo.Empty", "output": "demo.Empty"}
        ]}
    ],
    "messages": {
        "demo.CreateUser": {"fields": [
            {"name": "name", "type": "string"},
            {"name": "role", "type": "demo.Role"},
            {"name": "tags", "type": "string", "repeated": true},
            {"name": "labels", "type": "map", "key": "string", "value": "string"},
            {"oneof": "contact", "fields": [
                {"name": "email", "type": "string"},
                {"name": "phone", "type": "string"}
            ]},
            {"name": "address", "type": "demo.Address"},
            {"name": "avatar", "type": "demo.Blob"}
        ]},
        "demo.Address": {"fields": [{"name": "city", "type": "string"}]},
        "demo.User": {"fields": [{"name": "id", "type": "uint64"}]},
        "demo.Empty": {"fields": []}
    },
    "enums": {
        "demo.Role": [{"name": "USER", "number": 0}, {"name": "ADMIN", "number": 1}]
    }
}"#;

pub fn catalog() -> Catalog {
    Catalog::from_document(CATALOG, DocumentFormat::Json).expect("catalog parses")
}

pub fn open(procedure: &str) -> FormController {
    let catalog = catalog();
    let method = catalog.method(procedure).expect("method exists");
    let input = catalog
        .resolve_input_schema(procedure)
        .expect("input resolves");
    let mut form = FormController::new(method, &input);
    form.set_size(100, 40);
    form.init();
    form
}

pub fn key(code: KeyCode) -> FormEvent {
    FormEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ctrl(ch: char) -> FormEvent {
    FormEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
}

pub fn back_tab() -> FormEvent {
    FormEvent::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT))
}

pub fn type_text(form: &mut FormController, text: &str) {
    for ch in text.chars() {
        form.handle_event(key(KeyCode::Char(ch)));
    }
}

pub fn text_lines(rendered: &Rendered) -> Vec<String> {
    rendered
        .lines
        .iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
        .collect()
}

pub fn render(form: &FormController) -> Vec<String> {
    text_lines(&form.render(&RenderContext::default()))
}
