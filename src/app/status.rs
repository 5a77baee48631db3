pub const READY_STATUS: &str = "Ready. Press Ctrl+S to submit.";

/// How the footer should color the current message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    #[default]
    Info,
    Busy,
    Success,
    Failure,
}

/// One-line operator feedback shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    message: String,
    tone: StatusTone,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
            tone: StatusTone::Info,
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tone(&self) -> StatusTone {
        self.tone
    }

    fn set(&mut self, tone: StatusTone, message: impl Into<String>) {
        self.message = message.into();
        self.tone = tone;
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.set(StatusTone::Info, msg);
    }

    pub fn ready(&mut self) {
        self.set(StatusTone::Info, READY_STATUS);
    }

    pub fn editing(&mut self, label: &str) {
        self.set(StatusTone::Info, format!("Editing {label}"));
    }

    pub fn added(&mut self, index: usize) {
        self.set(StatusTone::Info, format!("Added entry [{index}]"));
    }

    pub fn removed(&mut self, index: usize) {
        self.set(StatusTone::Info, format!("Removed entry [{index}]"));
    }

    pub fn calling(&mut self, procedure: &str) {
        self.set(StatusTone::Busy, format!("Calling {procedure}..."));
    }

    pub fn completed(&mut self) {
        self.set(StatusTone::Success, "Call completed");
    }

    pub fn failed(&mut self) {
        self.set(StatusTone::Failure, "Call failed");
    }

    pub fn copied(&mut self) {
        self.set(StatusTone::Success, "Copied response to clipboard");
    }

    /// Failure raised outside the call lifecycle, e.g. a clipboard or schema error.
    pub fn error(&mut self, msg: impl Into<String>) {
        self.set(StatusTone::Failure, msg);
    }
}
