use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::unbounded_channel;

use crate::domain::SchemaProvider;

use super::{
    clipboard::{ClipboardSink, SystemClipboard},
    invoke::{CallDispatcher, Invoker},
    navigator::Navigator,
    options::UiOptions,
    runtime::App,
};

/// Entry point: browse a provider's services and call procedures through `invoker`.
pub struct Explorer {
    provider: Box<dyn SchemaProvider>,
    invoker: Arc<dyn Invoker>,
    procedure: Option<String>,
    clipboard: Option<Box<dyn ClipboardSink>>,
    options: UiOptions,
}

impl Explorer {
    pub fn new(provider: impl SchemaProvider + 'static, invoker: impl Invoker + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            invoker: Arc::new(invoker),
            procedure: None,
            clipboard: None,
            options: UiOptions::default(),
        }
    }

    /// Open this procedure's form right away instead of the services list.
    pub fn with_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.procedure = Some(procedure.into());
        self
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl ClipboardSink + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    pub fn run(self) -> Result<()> {
        let Explorer {
            provider,
            invoker,
            procedure,
            clipboard,
            options,
        } = self;

        let mut navigator = Navigator::new(provider);
        if let Some(procedure) = &procedure {
            navigator
                .open_procedure(procedure)
                .with_context(|| format!("cannot open procedure '{procedure}'"))?;
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let (tx, rx) = unbounded_channel();
        let dispatcher =
            CallDispatcher::new(runtime.handle().clone(), invoker, tx, options.call_timeout);
        let clipboard = clipboard.unwrap_or_else(|| Box::new(SystemClipboard::new()));

        let mut app = App::new(navigator, dispatcher, rx, clipboard, options);
        let result = app.run();
        runtime.shutdown_background();
        result
    }
}
