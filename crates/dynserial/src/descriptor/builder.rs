// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::descriptor::{
    EnumDescriptor, Factory, FieldDescriptor, FieldKind, PrimitiveKind, TypeDescriptor,
};
use crate::error::RegistryError;
use crate::schema::{DynamicRecord, RecordShape, Schema};
use std::collections::HashSet;
use std::sync::Arc;

enum FactorySource {
    Missing,
    Custom(Factory),
    Record,
}

/// Builder for [`TypeDescriptor`]s.
///
/// ```
/// use dynserial::{PrimitiveKind, TypeDescriptorBuilder};
///
/// let desc = TypeDescriptorBuilder::new("SensorReading")
///     .field("sensor_id", PrimitiveKind::U32)
///     .field("temperature", PrimitiveKind::F64)
///     .nullable_string_field("location")
///     .record_factory()
///     .build()
///     .unwrap();
/// assert_eq!(desc.field_index("temperature"), Some(1));
/// ```
pub struct TypeDescriptorBuilder {
    tag: String,
    parent: Option<String>,
    fields: Vec<FieldDescriptor>,
    factory: FactorySource,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            parent: None,
            fields: Vec::new(),
            factory: FactorySource::Missing,
        }
    }

    /// Extend `parent`: its fields are copied first, in its order.
    pub fn extends(mut self, parent: &TypeDescriptor) -> Self {
        self.parent = Some(parent.tag().to_string());
        let own = std::mem::take(&mut self.fields);
        self.fields = parent.fields().to_vec();
        self.fields.extend(own);
        self
    }

    /// Name a parent without copying fields (the caller lists them).
    ///
    /// The registry checks that the parent's fields come first.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a primitive field.
    pub fn field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.with_field(FieldDescriptor::primitive(name, kind))
    }

    /// Add a nullable primitive field.
    pub fn nullable_field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.with_field(FieldDescriptor::primitive(name, kind).nullable())
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.with_field(FieldDescriptor::string(name))
    }

    pub fn nullable_string_field(self, name: impl Into<String>) -> Self {
        self.with_field(FieldDescriptor::string(name).nullable())
    }

    /// Add a byte-array field.
    pub fn bytes_field(self, name: impl Into<String>) -> Self {
        self.with_field(FieldDescriptor::bytes(name))
    }

    /// Add an enum field.
    pub fn enum_field(self, name: impl Into<String>, desc: EnumDescriptor) -> Self {
        self.with_field(FieldDescriptor::enumeration(name, desc))
    }

    /// Add a nested field (any type registered as `tag` or extending it).
    pub fn nested_field(self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.with_field(FieldDescriptor::nested(name, tag))
    }

    pub fn nullable_nested_field(self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.with_field(FieldDescriptor::nested(name, tag).nullable())
    }

    /// Add a list field with non-null elements of `element` kind.
    pub fn list_field(self, name: impl Into<String>, element: FieldKind) -> Self {
        self.with_field(FieldDescriptor::list(
            name,
            FieldDescriptor::element(element),
        ))
    }

    /// Add a map field with non-null keys and values.
    pub fn map_field(self, name: impl Into<String>, key: FieldKind, value: FieldKind) -> Self {
        self.with_field(FieldDescriptor::map(
            name,
            FieldDescriptor::key(key),
            FieldDescriptor::value(value),
        ))
    }

    /// Add a prepared field descriptor.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add several prepared field descriptors, in order.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Use a custom factory for empty instances.
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Schema> + Send + Sync + 'static,
    {
        self.factory = FactorySource::Custom(Arc::new(factory));
        self
    }

    /// Back instances with [`DynamicRecord`]s shaped by this descriptor.
    pub fn record_factory(mut self) -> Self {
        self.factory = FactorySource::Record;
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> Result<TypeDescriptor, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidDescriptor {
            tag: self.tag.clone(),
            reason,
        };

        if self.tag.is_empty() {
            return Err(invalid("empty tag".into()));
        }
        if self.parent.as_deref() == Some(self.tag.as_str()) {
            return Err(invalid("type cannot extend itself".into()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(invalid("field with empty name".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }
        }

        let factory: Factory = match self.factory {
            FactorySource::Custom(factory) => factory,
            FactorySource::Record => {
                let shape = Arc::new(RecordShape::new(self.tag.clone(), self.fields.clone()));
                Arc::new(move || Box::new(DynamicRecord::new(&shape)) as Box<dyn Schema>)
            }
            FactorySource::Missing => return Err(invalid("no instance factory".into())),
        };

        Ok(TypeDescriptor::from_parts(
            self.tag,
            self.parent,
            self.fields,
            factory,
        ))
    }
}
