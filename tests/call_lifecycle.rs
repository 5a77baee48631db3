mod support;

use std::{sync::Arc, time::Duration};

use crossterm::event::KeyCode;
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use rpcform::app::{
    CallCompletion, CallDispatcher, CallOutcome, FormController, FormEffect, FormEvent, FormPhase,
    InvokeError, Invoker, LoopbackInvoker,
};
use serde_json::Value;
use tokio::{runtime::Handle, sync::mpsc::unbounded_channel};

use support::{ctrl, key, open, render, type_text};

struct Stalled;

impl Invoker for Stalled {
    fn invoke(&self, _procedure: &str, _payload: Value) -> BoxFuture<'static, CallOutcome> {
        Box::pin(futures::future::pending())
    }
}

async fn submit_and_wait(
    form: &mut FormController,
    invoker: Arc<dyn Invoker>,
    timeout: Duration,
) -> CallCompletion {
    let (tx, mut rx) = unbounded_channel();
    let dispatcher = CallDispatcher::new(Handle::current(), invoker, tx, timeout);
    let transition = form.handle_event(ctrl('s'));
    assert_eq!(transition.state, FormPhase::Calling);
    let FormEffect::Invoke(request) = transition.effect else {
        panic!("submit produced {:?}", transition.effect);
    };
    dispatcher.dispatch(7, request).await.expect("call task");
    rx.recv().await.expect("completion delivered")
}

#[tokio::test]
async fn loopback_response_is_shown_and_copyable() {
    let mut form = open("demo.Users.Create");
    type_text(&mut form, "ada");

    let completion =
        submit_and_wait(&mut form, Arc::new(LoopbackInvoker), Duration::from_secs(5)).await;
    assert_eq!(completion.session, 7);
    assert_eq!(render(&form), vec!["Calling..."]);

    // keys are ignored while the call is in flight
    let ignored = form.handle_event(key(KeyCode::Char('y')));
    assert_eq!(ignored.effect, FormEffect::None);

    let done = form.handle_event(FormEvent::CallCompleted(completion.outcome));
    assert_eq!(done.state, FormPhase::Result { success: true });
    assert_eq!(form.status().message(), "Call completed");

    let lines = render(&form);
    assert_eq!(lines[0], "Response");
    assert_eq!(lines[1], "");
    assert!(lines.contains(&r#"  "name": "ada","#.to_string()), "{lines:#?}");

    let copy = form.handle_event(key(KeyCode::Char('y')));
    let FormEffect::Copy(text) = copy.effect else {
        panic!("expected copy, got {:?}", copy.effect);
    };
    assert!(text.starts_with('{'));
    assert_eq!(form.status().message(), "Copied response to clipboard");
}

#[tokio::test]
async fn stalled_call_times_out_into_an_error_view() {
    let mut form = open("demo.Users.Ping");
    let completion =
        submit_and_wait(&mut form, Arc::new(Stalled), Duration::from_millis(20)).await;
    assert_eq!(
        completion.outcome,
        Err(InvokeError::Timeout(Duration::from_millis(20)))
    );

    let done = form.handle_event(FormEvent::CallCompleted(completion.outcome));
    assert_eq!(done.state, FormPhase::Result { success: false });
    assert_eq!(form.status().message(), "Call failed");
    assert_eq!(
        render(&form),
        vec!["Error", "", "call timed out after 0.02s"]
    );
    assert_eq!(
        form.result_text().as_deref(),
        Some("call timed out after 0.02s")
    );
}

#[test]
fn completion_outside_a_call_is_ignored() {
    let mut form = open("demo.Users.Ping");
    let transition = form.handle_event(FormEvent::CallCompleted(Ok("late".into())));
    assert_eq!(transition.state, FormPhase::Editing);
    assert!(form.result_text().is_none());
}
