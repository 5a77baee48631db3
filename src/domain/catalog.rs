use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::io::{DocumentFormat, parse_document_str};

use super::{
    provider::{SchemaError, SchemaProvider},
    schema::{EnumValue, MethodInfo, SchemaKind, SchemaNode},
};

/// Nested message levels resolved before a field is reported as unsupported.
/// Self-referencing messages would otherwise expand forever.
pub const MAX_MESSAGE_DEPTH: usize = 8;

/// Schema provider backed by a descriptor document listing services, messages and enums.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    services: Vec<ServiceDecl>,
    #[serde(default)]
    messages: IndexMap<String, MessageDecl>,
    #[serde(default)]
    enums: IndexMap<String, Vec<EnumValueDecl>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceDecl {
    name: String,
    #[serde(default)]
    methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, Deserialize)]
struct MethodDecl {
    name: String,
    input: String,
    output: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MessageDecl {
    #[serde(default)]
    fields: Vec<EntryDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EntryDecl {
    Oneof(OneofDecl),
    Field(FieldDecl),
}

#[derive(Debug, Clone, Deserialize)]
struct OneofDecl {
    oneof: String,
    #[serde(default)]
    fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Deserialize)]
struct FieldDecl {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    repeated: bool,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct EnumValueDecl {
    name: String,
    number: i32,
}

impl Catalog {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).context("descriptor document has an unexpected shape")
    }

    pub fn from_document(contents: &str, format: DocumentFormat) -> Result<Self> {
        let value = parse_document_str(contents, format)?;
        Self::from_value(value)
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    fn find_method(&self, procedure: &str) -> Result<(&ServiceDecl, &MethodDecl), SchemaError> {
        let normalized = procedure.replace('/', ".");
        let Some((service_name, method_name)) = normalized.rsplit_once('.') else {
            return Err(SchemaError::UnknownMethod(procedure.to_string()));
        };
        let service = self
            .services
            .iter()
            .find(|service| service.name == service_name)
            .ok_or_else(|| SchemaError::UnknownService(service_name.to_string()))?;
        let method = service
            .methods
            .iter()
            .find(|method| method.name == method_name)
            .ok_or_else(|| SchemaError::UnknownMethod(procedure.to_string()))?;
        Ok((service, method))
    }

    fn resolve_message(&self, name: &str, type_name: &str, depth: usize) -> SchemaNode {
        if depth > MAX_MESSAGE_DEPTH {
            warn!(field = name, type_name, "message nesting limit reached");
            return unsupported(
                name,
                format!("{type_name} nests deeper than {MAX_MESSAGE_DEPTH} levels"),
            );
        }
        let Some(decl) = self.messages.get(type_name) else {
            return unsupported(name, format!("unknown type {type_name}"));
        };
        let children = decl
            .fields
            .iter()
            .map(|entry| match entry {
                EntryDecl::Field(field) => self.resolve_field(field, depth),
                EntryDecl::Oneof(group) => {
                    let alternatives = group
                        .fields
                        .iter()
                        .map(|field| {
                            if field.repeated || field.type_name == "map" {
                                unsupported(&field.name, "oneof alternatives cannot repeat")
                            } else {
                                self.resolve_field(field, depth)
                            }
                        })
                        .collect();
                    SchemaNode::oneof(&group.oneof, alternatives)
                }
            })
            .collect();
        SchemaNode::message(name, children)
    }

    fn resolve_field(&self, field: &FieldDecl, depth: usize) -> SchemaNode {
        if field.type_name == "map" {
            return self.resolve_map(field, depth);
        }
        let element = self.resolve_type(&field.name, &field.type_name, depth);
        if field.repeated {
            SchemaNode::repeated(&field.name, element)
        } else {
            element
        }
    }

    fn resolve_map(&self, field: &FieldDecl, depth: usize) -> SchemaNode {
        let (Some(key_type), Some(value_type)) = (field.key.as_deref(), field.value.as_deref())
        else {
            return unsupported(&field.name, "map declares no key/value types");
        };
        let key = self.resolve_type("key", key_type, depth);
        if !matches!(
            key.kind,
            SchemaKind::String | SchemaKind::Bool | SchemaKind::Int | SchemaKind::UInt
        ) {
            return unsupported(&field.name, format!("map key type {key_type}"));
        }
        let value = self.resolve_type("value", value_type, depth);
        SchemaNode::map(&field.name, key, value)
    }

    fn resolve_type(&self, name: &str, type_name: &str, depth: usize) -> SchemaNode {
        if let Some(kind) = scalar_kind(type_name) {
            return SchemaNode::new(name, kind).with_type_name(type_name);
        }
        if let Some(values) = self.enums.get(type_name) {
            let values = values
                .iter()
                .map(|value| EnumValue::new(&value.name, value.number))
                .collect();
            return SchemaNode::new(name, SchemaKind::Enum(values));
        }
        if self.messages.contains_key(type_name) {
            return self.resolve_message(name, type_name, depth + 1);
        }
        warn!(field = name, type_name, "unknown field type");
        unsupported(name, format!("unknown type {type_name}"))
    }
}

impl SchemaProvider for Catalog {
    fn services(&self) -> Vec<String> {
        let mut names = self
            .services
            .iter()
            .map(|service| service.name.clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    fn methods(&self, service: &str) -> Result<Vec<MethodInfo>, SchemaError> {
        let decl = self
            .services
            .iter()
            .find(|decl| decl.name == service)
            .ok_or_else(|| SchemaError::UnknownService(service.to_string()))?;
        let mut methods = decl
            .methods
            .iter()
            .map(|method| method_info(decl, method))
            .collect::<Vec<_>>();
        methods.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(methods)
    }

    fn method(&self, procedure: &str) -> Result<MethodInfo, SchemaError> {
        let (service, method) = self.find_method(procedure)?;
        Ok(method_info(service, method))
    }

    fn resolve_input_schema(&self, procedure: &str) -> Result<SchemaNode, SchemaError> {
        let (_, method) = self.find_method(procedure)?;
        if !self.messages.contains_key(&method.input) {
            return Err(SchemaError::UnknownMessage(method.input.clone()));
        }
        debug!(procedure, input = %method.input, "resolving input schema");
        Ok(self.resolve_message(&method.input, &method.input, 0))
    }
}

fn method_info(service: &ServiceDecl, method: &MethodDecl) -> MethodInfo {
    MethodInfo {
        full_name: format!("{}.{}", service.name, method.name),
        name: method.name.clone(),
        input_type: method.input.clone(),
        output_type: method.output.clone(),
    }
}

fn scalar_kind(type_name: &str) -> Option<SchemaKind> {
    let kind = match type_name {
        "string" => SchemaKind::String,
        "bool" => SchemaKind::Bool,
        "int32" | "int64" | "sint32" | "sint64" | "sfixed32" | "sfixed64" => SchemaKind::Int,
        "uint32" | "uint64" | "fixed32" | "fixed64" => SchemaKind::UInt,
        "float" | "double" => SchemaKind::Float,
        "bytes" => SchemaKind::Bytes,
        "google.protobuf.Duration" => SchemaKind::Duration,
        "google.protobuf.Timestamp" => SchemaKind::Timestamp,
        _ => return None,
    };
    Some(kind)
}

fn unsupported(name: &str, reason: impl Into<String>) -> SchemaNode {
    SchemaNode::new(
        name,
        SchemaKind::Unsupported {
            reason: reason.into(),
        },
    )
}
