// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema instances.
//!
//! Every transmittable object implements [`Schema`]: index-based accessors
//! matching the order of its registered fields. The codec never touches an
//! instance's storage directly; decoding goes through
//! [`Schema::set_field`], so setter-side normalization applies to wire
//! data exactly as it does to locally built objects.
//!
//! Plain Rust types usually also implement [`Describe`], which ties the
//! type to its tag and field list so it can be registered with
//! [`TypeRegistry::register_type`](crate::TypeRegistry::register_type).

mod record;
mod value;

pub use record::{DynamicRecord, RecordShape};
pub use value::{FromValue, IntoValue, Value};

use crate::descriptor::{FieldDescriptor, TypeDescriptor, TypeDescriptorBuilder};
use crate::error::{FieldError, RegistryError};
use std::any::Any;
use std::fmt;

/// Object-safe plumbing shared by all schema types.
///
/// Implemented automatically for every `Schema + Clone + PartialEq` type.
pub trait SchemaObject: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_schema(&self) -> Box<dyn Schema>;
    fn eq_schema(&self, other: &dyn Schema) -> bool;
    /// Rust type name, for diagnostics.
    fn rust_type_name(&self) -> &'static str;
}

impl<T> SchemaObject for T
where
    T: Schema + Clone + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_schema(&self) -> Box<dyn Schema> {
        Box::new(self.clone())
    }

    fn eq_schema(&self, other: &dyn Schema) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn rust_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A structure the codec can walk field by field.
///
/// `index` is the position of the field in the registered descriptor.
pub trait Schema: SchemaObject {
    /// Current value of field `index`, `None` if there is no such field.
    fn field(&self, index: usize) -> Option<Value>;

    /// Store `value` into field `index`, applying any normalization.
    fn set_field(&mut self, index: usize, value: Value) -> Result<(), FieldError>;

    /// Tag carried by the instance itself.
    ///
    /// `None` for ordinary Rust types, which the registry identifies by
    /// their Rust type. Runtime-shaped instances such as [`DynamicRecord`]
    /// return their tag.
    fn dynamic_tag(&self) -> Option<&str> {
        None
    }
}

/// A Rust type with a fixed registration: tag, ordered fields, factory.
pub trait Describe: Schema + Default + Clone + PartialEq {
    /// Wire tag.
    const TYPE_TAG: &'static str;

    /// Fields in wire order (a parent's fields first).
    fn fields() -> Vec<FieldDescriptor>;

    /// Tag of the extended type.
    fn parent() -> Option<&'static str> {
        None
    }

    /// Registration-ready descriptor built from the items above.
    fn descriptor() -> Result<TypeDescriptor, RegistryError> {
        let mut builder = TypeDescriptorBuilder::new(Self::TYPE_TAG).with_fields(Self::fields());
        if let Some(parent) = Self::parent() {
            builder = builder.parent(parent);
        }
        builder
            .factory(|| Box::new(Self::default()) as Box<dyn Schema>)
            .build()
    }
}

impl Clone for Box<dyn Schema> {
    fn clone(&self) -> Self {
        (**self).clone_schema()
    }
}

impl PartialEq for dyn Schema {
    fn eq(&self, other: &dyn Schema) -> bool {
        self.eq_schema(other)
    }
}

/// Downcast a decoded instance to its concrete type.
pub fn downcast<T: Schema>(instance: Box<dyn Schema>) -> Result<T, Box<dyn Schema>> {
    if instance.as_any().is::<T>() {
        if let Ok(concrete) = instance.into_any().downcast::<T>() {
            return Ok(*concrete);
        }
        unreachable!("type checked above");
    }
    Err(instance)
}
