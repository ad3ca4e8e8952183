// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type and field descriptors.
//!
//! A [`TypeDescriptor`] is the registration-time description of one schema:
//! its tag, its ordered fields and a factory producing empty instances.
//! Field order is fixed when the descriptor is built and is never derived
//! from anything else; encoder and decoder both walk `fields()` by index.

mod builder;

pub use builder::TypeDescriptorBuilder;

use crate::schema::{Schema, Value};
use std::fmt;
use std::sync::Arc;

/// Factory producing an empty instance of a registered type.
pub type Factory = Arc<dyn Fn() -> Box<dyn Schema> + Send + Sync>;

/// Fixed-width primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Unicode scalar value, sent as a u32.
    Char,
}

impl PrimitiveKind {
    /// Every primitive kind, in declaration order.
    pub const ALL: [PrimitiveKind; 12] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Char,
    ];

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Char => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Lower-case name used in diagnostics and catalogs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
        }
    }

    /// Parse a name produced by [`PrimitiveKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Zero value of this kind.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::Char => Value::Char('\0'),
        }
    }

    /// Whether `value` is this primitive (null excluded).
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::I8, Value::I8(_))
                | (Self::I16, Value::I16(_))
                | (Self::I32, Value::I32(_))
                | (Self::I64, Value::I64(_))
                | (Self::U8, Value::U8(_))
                | (Self::U16, Value::U16(_))
                | (Self::U32, Value::U32(_))
                | (Self::U64, Value::U64(_))
                | (Self::F32, Value::F32(_))
                | (Self::F64, Value::F64(_))
                | (Self::Char, Value::Char(_))
        )
    }
}

/// Enumeration: an ordered list of variant names.
///
/// Variants travel by name, so reordering or appending variants does not
/// break peers that only use the variants they know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    variants: Vec<String>,
}

impl EnumDescriptor {
    /// Create an enum descriptor.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Whether `variant` is declared.
    pub fn contains(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }

    /// First declared variant (default value).
    pub fn first(&self) -> Option<&str> {
        self.variants.first().map(String::as_str)
    }
}

/// Semantic kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Primitive(PrimitiveKind),
    /// UTF-8 string.
    String,
    /// Raw octets.
    Bytes,
    Enum(EnumDescriptor),
    /// Instance of the named type or of any type extending it.
    Nested(String),
    ListOf(Box<FieldDescriptor>),
    MapOf(Box<FieldDescriptor>, Box<FieldDescriptor>),
}

impl FieldKind {
    /// Human-readable kind, e.g. `list<string>` or `nested<User>`.
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(p) => p.name().to_string(),
            Self::String => "string".to_string(),
            Self::Bytes => "bytes".to_string(),
            Self::Enum(e) => format!("enum<{}>", e.name()),
            Self::Nested(tag) => format!("nested<{}>", tag),
            Self::ListOf(element) => format!("list<{}>", element.describe()),
            Self::MapOf(key, value) => format!("map<{}, {}>", key.describe(), value.describe()),
        }
    }

    /// Shallow conformance check: the value's variant matches this kind.
    ///
    /// Collection elements and nested instances are checked by the encoder.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Primitive(p), v) => p.accepts(v),
            (Self::String, Value::String(_))
            | (Self::Bytes, Value::Bytes(_))
            | (Self::Nested(_), Value::Struct(_))
            | (Self::ListOf(_), Value::List(_))
            | (Self::MapOf(_, _), Value::Map(_)) => true,
            (Self::Enum(e), Value::Enum(variant)) => e.contains(variant),
            _ => false,
        }
    }

    /// Default value for a non-null field of this kind.
    ///
    /// Nested fields default to null: the codec never instantiates nested
    /// types on its own, the owning instance does.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Primitive(p) => p.default_value(),
            Self::String => Value::String(String::new()),
            Self::Bytes => Value::Bytes(Vec::new()),
            Self::Enum(e) => e
                .first()
                .map_or(Value::Null, |variant| Value::Enum(variant.to_string())),
            Self::Nested(_) => Value::Null,
            Self::ListOf(_) => Value::List(Vec::new()),
            Self::MapOf(_, _) => Value::Map(Vec::new()),
        }
    }

    /// Nested type tags referenced by this kind (recursively).
    pub(crate) fn referenced_tags<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Nested(tag) => out.push(tag),
            Self::ListOf(element) => element.kind.referenced_tags(out),
            Self::MapOf(key, value) => {
                key.kind.referenced_tags(out);
                value.kind.referenced_tags(out);
            }
            _ => {}
        }
    }
}

/// One named, typed field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name (wire-invisible, used for diagnostics and records).
    pub name: String,
    /// Semantic kind.
    pub kind: FieldKind,
    /// Whether null is a legal value.
    pub nullable: bool,
}

impl FieldDescriptor {
    /// Create a required field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
        }
    }

    /// Mark as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, FieldKind::Primitive(kind))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn bytes(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bytes)
    }

    pub fn enumeration(name: impl Into<String>, desc: EnumDescriptor) -> Self {
        Self::new(name, FieldKind::Enum(desc))
    }

    pub fn nested(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Nested(tag.into()))
    }

    pub fn list(name: impl Into<String>, element: FieldDescriptor) -> Self {
        Self::new(name, FieldKind::ListOf(Box::new(element)))
    }

    pub fn map(name: impl Into<String>, key: FieldDescriptor, value: FieldDescriptor) -> Self {
        Self::new(name, FieldKind::MapOf(Box::new(key), Box::new(value)))
    }

    /// List element descriptor.
    pub fn element(kind: FieldKind) -> Self {
        Self::new("element", kind)
    }

    /// Map key descriptor.
    pub fn key(kind: FieldKind) -> Self {
        Self::new("key", kind)
    }

    /// Map value descriptor.
    pub fn value(kind: FieldKind) -> Self {
        Self::new("value", kind)
    }

    /// Kind plus nullability, e.g. `string?`.
    pub fn describe(&self) -> String {
        if self.nullable {
            format!("{}?", self.kind.describe())
        } else {
            self.kind.describe()
        }
    }

    /// Whether `value` may be stored in this field (shallow check).
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            self.nullable
        } else {
            self.kind.accepts(value)
        }
    }

    /// Initial value of this field in a fresh record.
    pub fn default_value(&self) -> Value {
        if self.nullable {
            Value::Null
        } else {
            self.kind.default_value()
        }
    }
}

/// A registered schema: tag, ordered fields and instance factory.
#[derive(Clone)]
pub struct TypeDescriptor {
    tag: String,
    parent: Option<String>,
    fields: Vec<FieldDescriptor>,
    factory: Factory,
}

impl TypeDescriptor {
    pub(crate) fn from_parts(
        tag: String,
        parent: Option<String>,
        fields: Vec<FieldDescriptor>,
        factory: Factory,
    ) -> Self {
        Self {
            tag,
            parent,
            fields,
            factory,
        }
    }

    /// Wire tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tag of the type this one extends, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Produce an empty instance.
    pub fn instantiate(&self) -> Box<dyn Schema> {
        (self.factory)()
    }

    /// Whether `self`'s fields start with `parent`'s, same names and kinds.
    pub fn starts_with_fields_of(&self, parent: &TypeDescriptor) -> bool {
        parent.fields.len() <= self.fields.len()
            && parent
                .fields
                .iter()
                .zip(&self.fields)
                .all(|(theirs, ours)| theirs == ours)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("tag", &self.tag)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.parent == other.parent && self.fields == other.fields
    }
}
