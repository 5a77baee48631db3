mod builder;
mod choice;
mod error;
mod field;
mod group;
mod list;
mod map;
mod oneof;
mod text;
mod validate;

pub use builder::{build_form, build_node};
pub use choice::{ChoiceOption, ChoicePicker};
pub use error::{UnsupportedField, ValidationError};
pub use field::{
    CursorHint, FieldNode, KeyOutcome, NodeEffect, NodeKind, RenderContext, Rendered,
};
pub(crate) use field::marker;
pub use group::GroupNode;
pub use list::{LIST_WIDTH_OVERHEAD, ListFocus, ListNode};
pub use map::{MAP_WIDTH_OVERHEAD, MapEntry, MapFocus, MapNode};
pub use oneof::{OneofFocus, OneofNode};
pub use text::TextEditor;
pub use validate::Validator;
