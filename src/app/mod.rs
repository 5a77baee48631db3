mod clipboard;
mod controller;
mod explorer;
mod invoke;
mod keymap;
mod navigator;
mod options;
mod runtime;
mod status;
mod terminal;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use controller::{
    BODY_WIDTH_OVERHEAD, FormController, FormEffect, FormEvent, FormFocus, FormPhase, Transition,
};
pub use explorer::Explorer;
pub use invoke::{
    CallCompletion, CallDispatcher, CallOutcome, InvocationRequest, InvokeError, Invoker,
    LoopbackInvoker,
};
pub use keymap::{KeyAction, KeymapContext, classify, help_text};
pub use navigator::{NavEffect, NavEvent, Navigator, Screen};
pub use options::{DEFAULT_CALL_TIMEOUT, UiOptions};
pub use status::{READY_STATUS, StatusLine, StatusTone};
