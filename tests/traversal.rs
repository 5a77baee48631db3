mod support;

use crossterm::event::KeyCode;
use pretty_assertions::assert_eq;
use rpcform::{
    SchemaNode,
    app::{FormController, FormEvent, FormFocus, READY_STATUS},
    domain::{MethodInfo, SchemaKind},
};

use support::{back_tab, key};

fn nested_form() -> FormController {
    let method = MethodInfo {
        full_name: "demo.Tree.Walk".into(),
        name: "Walk".into(),
        input_type: "demo.WalkRequest".into(),
        output_type: "demo.WalkReply".into(),
    };
    let input = SchemaNode::message(
        "demo.WalkRequest",
        vec![
            SchemaNode::string("a"),
            SchemaNode::message(
                "inner",
                vec![
                    SchemaNode::string("b"),
                    SchemaNode::message("deeper", vec![SchemaNode::bool("c")]),
                    SchemaNode::message("hollow", Vec::new()),
                ],
            ),
            SchemaNode::new(
                "raw",
                SchemaKind::Unsupported {
                    reason: "group encoding".into(),
                },
            ),
            SchemaNode::int("d"),
        ],
    );
    let mut form = FormController::new(method, &input);
    form.set_size(80, 24);
    form.init();
    form
}

fn walk(form: &mut FormController, step: impl Fn() -> FormEvent, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            form.handle_event(step());
            form.status().message().to_string()
        })
        .collect()
}

#[test]
fn tab_visits_fields_depth_first_then_submit() {
    let mut form = nested_form();
    assert_eq!(form.status().message(), "Editing a");
    let visited = walk(&mut form, || key(KeyCode::Tab), 5);
    assert_eq!(
        visited,
        vec![
            "Editing inner.b",
            "Editing inner.deeper.c",
            "Editing d",
            READY_STATUS,
            "Editing a",
        ]
    );
}

#[test]
fn back_tab_retraces_the_same_path() {
    let mut form = nested_form();
    let visited = walk(&mut form, back_tab, 5);
    assert_eq!(
        visited,
        vec![
            READY_STATUS,
            "Editing d",
            "Editing inner.deeper.c",
            "Editing inner.b",
            "Editing a",
        ]
    );
    assert_eq!(form.focus(), FormFocus::Field);
}

#[test]
fn enter_on_a_leaf_moves_to_the_next_field() {
    let mut form = nested_form();
    form.handle_event(key(KeyCode::Enter));
    assert_eq!(form.status().message(), "Editing inner.b");
    form.handle_event(key(KeyCode::Down));
    assert_eq!(form.status().message(), "Editing inner.deeper.c");
    form.handle_event(key(KeyCode::Up));
    assert_eq!(form.status().message(), "Editing inner.b");
}
