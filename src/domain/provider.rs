use thiserror::Error;

use super::schema::{MethodInfo, SchemaNode};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown service '{0}'")]
    UnknownService(String),
    #[error("unknown method '{0}'")]
    UnknownMethod(String),
    #[error("unknown message type '{0}'")]
    UnknownMessage(String),
}

/// Source of service, procedure and request-shape information.
pub trait SchemaProvider {
    /// Fully-qualified service names, sorted.
    fn services(&self) -> Vec<String>;

    /// Procedures of one service, sorted by fully-qualified name.
    fn methods(&self, service: &str) -> Result<Vec<MethodInfo>, SchemaError>;

    fn method(&self, procedure: &str) -> Result<MethodInfo, SchemaError>;

    /// Input message shape of `procedure`; the returned node is always a message kind.
    fn resolve_input_schema(&self, procedure: &str) -> Result<SchemaNode, SchemaError>;
}
