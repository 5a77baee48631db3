use thiserror::Error;

/// Advisory format failure attached to a text editor. Never blocks editing or submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: &'static str,
}

impl ValidationError {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// A schema entry the form declines to edit. The field is left out of the tree and the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {reason}")]
pub struct UnsupportedField {
    pub name: String,
    pub reason: String,
}

impl UnsupportedField {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
