mod catalog;
mod provider;
mod schema;

pub use catalog::{Catalog, MAX_MESSAGE_DEPTH};
pub use provider::{SchemaError, SchemaProvider};
pub use schema::{EnumValue, MethodInfo, SchemaKind, SchemaNode};
