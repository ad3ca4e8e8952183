// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field values exchanged between instances and the codec.

use super::Schema;
use crate::error::FieldError;
use std::collections::BTreeMap;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Special
    Null,

    // Primitives
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),

    // Variable length
    String(String),
    Bytes(Vec<u8>),
    /// Enum variant, by name.
    Enum(String),

    // Composites
    List(Vec<Value>),
    /// Entries in iteration order.
    Map(Vec<(Value, Value)>),
    /// Nested instance of a registered type.
    Struct(Box<dyn Schema>),
}

impl Value {
    /// Wrap a nested instance.
    pub fn nested<T: Schema>(instance: T) -> Self {
        Self::Struct(Box::new(instance))
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Struct(_) => "nested",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Variant name of an enum value.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(variant) => Some(variant),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Borrow a nested instance.
    pub fn as_nested(&self) -> Option<&dyn Schema> {
        match self {
            Self::Struct(instance) => Some(instance.as_ref()),
            _ => None,
        }
    }

    /// Take the bytes out of a `Bytes` value.
    pub fn into_bytes(self) -> Result<Vec<u8>, FieldError> {
        match self {
            Self::Bytes(b) => Ok(b),
            other => Err(mismatch("bytes", &other)),
        }
    }

    /// Nullable bytes.
    pub fn into_optional_bytes(self) -> Result<Option<Vec<u8>>, FieldError> {
        match self {
            Self::Null => Ok(None),
            other => other.into_bytes().map(Some),
        }
    }

    /// Take a nested instance out as its concrete type.
    pub fn into_nested<T: Schema>(self) -> Result<T, FieldError> {
        match self {
            Self::Struct(instance) => {
                let found = instance.rust_type_name();
                super::downcast::<T>(instance).map_err(|_| FieldError::TypeMismatch {
                    expected: std::any::type_name::<T>().to_string(),
                    got: found.to_string(),
                })
            }
            other => Err(mismatch(std::any::type_name::<T>(), &other)),
        }
    }

    /// Nullable nested instance.
    pub fn into_optional_nested<T: Schema>(self) -> Result<Option<T>, FieldError> {
        match self {
            Self::Null => Ok(None),
            other => other.into_nested().map(Some),
        }
    }
}

fn mismatch(expected: &str, got: &Value) -> FieldError {
    FieldError::TypeMismatch {
        expected: expected.to_string(),
        got: got.kind_name().to_string(),
    }
}

/// Trait for converting from Value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, FieldError>;
}

/// Trait for converting to Value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! impl_value_primitive {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, FieldError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch($name, &other)),
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_value_primitive!(bool, Bool, "bool");
impl_value_primitive!(i8, I8, "i8");
impl_value_primitive!(i16, I16, "i16");
impl_value_primitive!(i32, I32, "i32");
impl_value_primitive!(i64, I64, "i64");
impl_value_primitive!(u8, U8, "u8");
impl_value_primitive!(u16, U16, "u16");
impl_value_primitive!(u32, U32, "u32");
impl_value_primitive!(u64, U64, "u64");
impl_value_primitive!(f32, F32, "f32");
impl_value_primitive!(f64, F64, "f64");
impl_value_primitive!(char, Char, "char");
impl_value_primitive!(String, String, "string");

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, FieldError> {
        Ok(value)
    }
}

impl IntoValue for Box<dyn Schema> {
    fn into_value(self) -> Value {
        Value::Struct(self)
    }
}

impl FromValue for Box<dyn Schema> {
    fn from_value(value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Struct(instance) => Ok(instance),
            other => Err(mismatch("nested", &other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, FieldError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}
