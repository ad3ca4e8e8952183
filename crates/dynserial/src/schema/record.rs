// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicRecord: runtime-shaped instances for types with no Rust struct.

use super::{FromValue, IntoValue, Schema, Value};
use crate::descriptor::FieldDescriptor;
use crate::error::FieldError;
use std::fmt;
use std::sync::Arc;

/// Tag and field list shared by every record of one type.
#[derive(Debug, PartialEq)]
pub struct RecordShape {
    tag: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordShape {
    pub fn new(tag: String, fields: Vec<FieldDescriptor>) -> Self {
        Self { tag, fields }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Record container with runtime kind checking.
///
/// Values are stored in field order. Every write is checked against the
/// field's descriptor (shallow: nested instances and collection elements
/// are checked by the encoder).
#[derive(Clone)]
pub struct DynamicRecord {
    shape: Arc<RecordShape>,
    values: Vec<Value>,
}

impl DynamicRecord {
    /// Create a record with default values.
    pub fn new(shape: &Arc<RecordShape>) -> Self {
        let values = shape.fields.iter().map(FieldDescriptor::default_value).collect();
        Self {
            shape: shape.clone(),
            values,
        }
    }

    pub fn shape(&self) -> &Arc<RecordShape> {
        &self.shape
    }

    /// Get the type tag.
    pub fn tag(&self) -> &str {
        &self.shape.tag
    }

    /// Borrow a field value by name.
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.shape.index_of(name).map(|index| &self.values[index])
    }

    /// Get a field value by name.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, FieldError> {
        let value = self
            .get_value(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        T::from_value(value.clone())
    }

    /// Set a field value by name.
    pub fn set<T: IntoValue>(&mut self, name: &str, value: T) -> Result<(), FieldError> {
        let index = self
            .shape
            .index_of(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        self.set_field(index, value.into_value())
    }

    /// Builder-style [`DynamicRecord::set`].
    pub fn with<T: IntoValue>(mut self, name: &str, value: T) -> Result<Self, FieldError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// `(name, value)` pairs in field order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.shape
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .zip(&self.values)
    }
}

impl Schema for DynamicRecord {
    fn field(&self, index: usize) -> Option<Value> {
        self.values.get(index).cloned()
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        let desc = self
            .shape
            .fields
            .get(index)
            .ok_or(FieldError::UnknownIndex(index))?;
        if !desc.accepts(&value) {
            return Err(FieldError::TypeMismatch {
                expected: desc.describe(),
                got: value.kind_name().to_string(),
            });
        }
        self.values[index] = value;
        Ok(())
    }

    fn dynamic_tag(&self) -> Option<&str> {
        Some(&self.shape.tag)
    }
}

impl PartialEq for DynamicRecord {
    fn eq(&self, other: &Self) -> bool {
        self.shape.tag == other.shape.tag && self.values == other.values
    }
}

impl fmt::Debug for DynamicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DynamicRecord");
        s.field("tag", &self.shape.tag);
        for (name, value) in self.fields() {
            s.field(name, value);
        }
        s.finish()
    }
}
