use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;
use tokio::{runtime::Handle, sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvokeError {
    /// Opaque failure text from the invoker, shown verbatim.
    #[error("{0}")]
    Failed(String),
    #[error("call timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

/// Formatted response text or the failure that replaced it.
pub type CallOutcome = Result<String, InvokeError>;

/// Performs the actual procedure call.
pub trait Invoker: Send + Sync {
    fn invoke(&self, procedure: &str, payload: Value) -> BoxFuture<'static, CallOutcome>;
}

/// Request handed from a form to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub procedure: String,
    pub payload: Value,
}

/// Completion delivered back to the event loop, tagged with the form session that asked.
#[derive(Debug, Clone, PartialEq)]
pub struct CallCompletion {
    pub session: u64,
    pub outcome: CallOutcome,
}

/// Runs each call as a detached task bounded by `timeout`.
#[derive(Clone)]
pub struct CallDispatcher {
    handle: Handle,
    invoker: Arc<dyn Invoker>,
    tx: UnboundedSender<CallCompletion>,
    timeout: Duration,
}

impl CallDispatcher {
    pub fn new(
        handle: Handle,
        invoker: Arc<dyn Invoker>,
        tx: UnboundedSender<CallCompletion>,
        timeout: Duration,
    ) -> Self {
        Self {
            handle,
            invoker,
            tx,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn dispatch(&self, session: u64, request: InvocationRequest) -> JoinHandle<()> {
        let InvocationRequest { procedure, payload } = request;
        info!(session, procedure = %procedure, "dispatching call");
        let call = self.invoker.invoke(&procedure, payload);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.handle.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(session, procedure = %procedure, "call timed out");
                    Err(InvokeError::Timeout(timeout))
                }
            };
            if tx.send(CallCompletion { session, outcome }).is_err() {
                debug!(session, "event loop gone; dropping completion");
            }
        })
    }
}

/// Answers every call with the pretty-printed request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackInvoker;

impl Invoker for LoopbackInvoker {
    fn invoke(&self, _procedure: &str, payload: Value) -> BoxFuture<'static, CallOutcome> {
        Box::pin(async move {
            serde_json::to_string_pretty(&payload)
                .map_err(|err| InvokeError::Failed(err.to_string()))
        })
    }
}
