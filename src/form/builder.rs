use tracing::warn;

use crate::domain::{SchemaKind, SchemaNode};

use super::{
    choice::ChoicePicker,
    error::UnsupportedField,
    field::{FieldNode, NodeKind},
    group::GroupNode,
    list::ListNode,
    map::MapNode,
    oneof::OneofNode,
    text::TextEditor,
    validate::Validator,
};

const NUMBER_LIMIT: usize = 64;
const BYTES_LIMIT: usize = 512;

/// Build the root group for a procedure's input message.
pub fn build_form(schema: &SchemaNode) -> GroupNode {
    match &schema.kind {
        SchemaKind::Message(children) => build_group(children),
        other => GroupNode::new(
            Vec::new(),
            vec![UnsupportedField::new(
                &schema.name,
                format!("input must be a message, found {other}"),
            )],
        ),
    }
}

/// Build one field. Entries the form cannot edit come back as `UnsupportedField`.
pub fn build_node(schema: &SchemaNode) -> Result<FieldNode, UnsupportedField> {
    let name = schema.name.as_str();
    let kind = match &schema.kind {
        SchemaKind::String => NodeKind::Text(TextEditor::new(format!("Enter {name}..."), 0)),
        SchemaKind::Bool => NodeKind::Choice(ChoicePicker::boolean()),
        SchemaKind::Int => number_editor(schema, Validator::Int),
        SchemaKind::UInt => number_editor(schema, Validator::UInt),
        SchemaKind::Float => number_editor(schema, Validator::Float),
        SchemaKind::Bytes => NodeKind::Text(
            TextEditor::new("Enter hex bytes (e.g., deadbeef)...", BYTES_LIMIT)
                .with_validator(Validator::Bytes),
        ),
        SchemaKind::Duration => NodeKind::Text(
            TextEditor::new("Enter duration (e.g., 10s)...", NUMBER_LIMIT)
                .with_validator(Validator::Duration),
        ),
        SchemaKind::Timestamp => NodeKind::Text(
            TextEditor::new(
                "Enter RFC 3339 timestamp (e.g., 2017-01-15T01:30:15.01Z)...",
                NUMBER_LIMIT,
            )
            .with_validator(Validator::Timestamp),
        ),
        SchemaKind::Enum(values) => NodeKind::Choice(ChoicePicker::enumeration(values)),
        SchemaKind::Message(children) => NodeKind::Group(build_group(children)),
        SchemaKind::RepeatedOf(element) => {
            if matches!(element.kind, SchemaKind::OneofOf(_)) {
                return Err(UnsupportedField::new(name, "repeated oneof"));
            }
            build_node(element).map_err(|err| {
                UnsupportedField::new(name, format!("list element: {}", err.reason))
            })?;
            NodeKind::List(ListNode::new((**element).clone()))
        }
        SchemaKind::MapOf { key, value } => {
            if !key.is_scalar() {
                return Err(UnsupportedField::new(
                    name,
                    format!("map key must be scalar, found {}", key.kind),
                ));
            }
            build_node(key)?;
            build_node(value).map_err(|err| {
                UnsupportedField::new(name, format!("map value: {}", err.reason))
            })?;
            NodeKind::Map(MapNode::new((**key).clone(), (**value).clone()))
        }
        SchemaKind::OneofOf(alternatives) => {
            let built = alternatives
                .iter()
                .filter_map(|alt| match build_node(alt) {
                    Ok(node) => Some(node),
                    Err(err) => {
                        warn!(oneof = name, alternative = %err.name, reason = %err.reason, "dropping oneof alternative");
                        None
                    }
                })
                .collect::<Vec<_>>();
            if built.is_empty() {
                return Err(UnsupportedField::new(name, "oneof has no editable alternatives"));
            }
            NodeKind::Oneof(OneofNode::new(built))
        }
        SchemaKind::Unsupported { reason } => {
            return Err(UnsupportedField::new(name, reason.clone()));
        }
    };
    Ok(FieldNode::new(name, kind))
}

fn build_group(children: &[SchemaNode]) -> GroupNode {
    let mut nodes = Vec::with_capacity(children.len());
    let mut unsupported = Vec::new();
    for child in children {
        match build_node(child) {
            Ok(node) => nodes.push(node),
            Err(err) => {
                warn!(field = %err.name, reason = %err.reason, "skipping unsupported field");
                unsupported.push(err);
            }
        }
    }
    GroupNode::new(nodes, unsupported)
}

/// Numeric placeholders name the declared type (`int32`, `double`), falling back to the kind.
fn number_editor(schema: &SchemaNode, validator: Validator) -> NodeKind {
    let placeholder = match &schema.type_name {
        Some(type_name) => format!("Enter {type_name}..."),
        None => format!("Enter {}...", schema.kind),
    };
    NodeKind::Text(TextEditor::new(placeholder, NUMBER_LIMIT).with_validator(validator))
}
