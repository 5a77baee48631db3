use std::fmt;

/// One declared value of an enumeration, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    Bool,
    Int,
    UInt,
    Float,
    Bytes,
    Enum(Vec<EnumValue>),
    Duration,
    Timestamp,
    Message(Vec<SchemaNode>),
    RepeatedOf(Box<SchemaNode>),
    MapOf {
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
    },
    OneofOf(Vec<SchemaNode>),
    /// A declared entry the form engine cannot edit; `reason` is shown to the operator.
    Unsupported {
        reason: String,
    },
}

/// Shape of one field as supplied by a schema provider. Read-only for the form engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub name: String,
    pub kind: SchemaKind,
    /// Declared wire type, e.g. `uint64`, when the provider knows it.
    pub type_name: Option<String>,
}

impl SchemaNode {
    pub fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: None,
        }
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, SchemaKind::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, SchemaKind::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, SchemaKind::Int)
    }

    pub fn message(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        Self::new(name, SchemaKind::Message(children))
    }

    pub fn repeated(name: impl Into<String>, element: SchemaNode) -> Self {
        Self::new(name, SchemaKind::RepeatedOf(Box::new(element)))
    }

    pub fn map(name: impl Into<String>, key: SchemaNode, value: SchemaNode) -> Self {
        Self::new(
            name,
            SchemaKind::MapOf {
                key: Box::new(key),
                value: Box::new(value),
            },
        )
    }

    pub fn oneof(name: impl Into<String>, alternatives: Vec<SchemaNode>) -> Self {
        Self::new(name, SchemaKind::OneofOf(alternatives))
    }

    pub fn is_scalar(&self) -> bool {
        self.kind.is_scalar()
    }
}

impl SchemaKind {
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            SchemaKind::String
                | SchemaKind::Bool
                | SchemaKind::Int
                | SchemaKind::UInt
                | SchemaKind::Float
                | SchemaKind::Bytes
                | SchemaKind::Enum(_)
                | SchemaKind::Duration
                | SchemaKind::Timestamp
        )
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::String => write!(f, "string"),
            SchemaKind::Bool => write!(f, "bool"),
            SchemaKind::Int => write!(f, "int"),
            SchemaKind::UInt => write!(f, "uint"),
            SchemaKind::Float => write!(f, "float"),
            SchemaKind::Bytes => write!(f, "bytes"),
            SchemaKind::Enum(_) => write!(f, "enum"),
            SchemaKind::Duration => write!(f, "duration"),
            SchemaKind::Timestamp => write!(f, "timestamp"),
            SchemaKind::Message(_) => write!(f, "message"),
            SchemaKind::RepeatedOf(element) => write!(f, "{}[]", element.kind),
            SchemaKind::MapOf { key, value } => write!(f, "map<{}, {}>", key.kind, value.kind),
            SchemaKind::OneofOf(_) => write!(f, "oneof"),
            SchemaKind::Unsupported { .. } => write!(f, "unsupported"),
        }
    }
}

/// A callable procedure and the names of its request/response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// Fully-qualified name, e.g. `helloworld.Greeter.SayHello`.
    pub full_name: String,
    pub name: String,
    pub input_type: String,
    pub output_type: String,
}

impl MethodInfo {
    pub fn signature(&self) -> String {
        format!(
            "{}({}) -> {}",
            self.full_name, self.input_type, self.output_type
        )
    }
}
