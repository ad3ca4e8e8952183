// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: tag -> descriptor + factory.
//!
//! A [`TypeRegistry`] is filled once at startup (see [`crate::localization::register`]
//! or [`catalog::Catalog::register_into`] for central catalogs) and read
//! concurrently afterwards. It is a plain value: build it, then share it
//! behind an `Arc` or publish it through [`global::install`].
//!
//! ## Type Resolution
//!
//! Ordinary Rust types are identified by their [`TypeId`], bound to a tag
//! when their descriptor is registered. Runtime-shaped instances
//! ([`DynamicRecord`](crate::DynamicRecord)) carry their tag themselves.

#[cfg(feature = "catalog")]
pub mod catalog;
pub mod global;

use crate::codec::Codec;
use crate::config::CodecConfig;
use crate::descriptor::TypeDescriptor;
use crate::error::{CodecError, CodecResult, RegistryError};
use crate::schema::{Describe, Schema};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Registered schemas, keyed by tag.
#[derive(Clone, Default, Debug)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
    /// Tags in registration order.
    order: Vec<String>,
    /// Rust type -> tag, for instances that do not carry a tag.
    bindings: HashMap<TypeId, String>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its tag.
    ///
    /// The descriptor's factory is probed once: a Rust-typed instance binds
    /// its [`TypeId`] to the tag, a record must report the same tag.
    /// If the parent is already registered, the field prefix is checked
    /// now; otherwise [`TypeRegistry::validate`] checks it later.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), RegistryError> {
        let tag = descriptor.tag().to_string();
        if self.types.contains_key(&tag) {
            return Err(RegistryError::DuplicateType(tag));
        }

        if let Some(parent_tag) = descriptor.parent() {
            if let Some(parent) = self.types.get(parent_tag) {
                if !descriptor.starts_with_fields_of(parent) {
                    return Err(RegistryError::IncompatibleParent {
                        tag,
                        parent: parent_tag.to_string(),
                    });
                }
            }
        }

        let probe = descriptor.instantiate();
        let binding = match probe.dynamic_tag() {
            Some(own) if own == tag => None,
            Some(own) => {
                return Err(RegistryError::InvalidDescriptor {
                    tag,
                    reason: format!("factory produces records tagged '{}'", own),
                })
            }
            None => {
                let type_id = probe.as_any().type_id();
                if let Some(existing) = self.bindings.get(&type_id) {
                    return Err(RegistryError::ConflictingBinding {
                        tag,
                        existing: existing.clone(),
                        rust_type: probe.rust_type_name(),
                    });
                }
                Some(type_id)
            }
        };

        log::debug!(
            "[registry] registered '{}' ({} fields{})",
            tag,
            descriptor.fields().len(),
            descriptor
                .parent()
                .map(|p| format!(", extends '{}'", p))
                .unwrap_or_default()
        );

        if let Some(type_id) = binding {
            self.bindings.insert(type_id, tag.clone());
        }
        self.order.push(tag.clone());
        self.types.insert(tag, Arc::new(descriptor));
        Ok(())
    }

    /// Register a Rust type through its [`Describe`] implementation.
    pub fn register_type<T: Describe>(&mut self) -> Result<(), RegistryError> {
        self.register(T::descriptor()?)
    }

    /// Get a descriptor by tag.
    pub fn get(&self, tag: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(tag)
    }

    /// Get a descriptor by tag, failing with [`CodecError::UnknownType`].
    pub fn lookup(&self, tag: &str) -> CodecResult<&Arc<TypeDescriptor>> {
        self.types
            .get(tag)
            .ok_or_else(|| CodecError::UnknownType(tag.to_string()))
    }

    /// Descriptor of an instance's concrete type.
    pub fn lookup_by_instance(&self, instance: &dyn Schema) -> CodecResult<&Arc<TypeDescriptor>> {
        let tag = match instance.dynamic_tag() {
            Some(tag) => Some(tag),
            None => self
                .bindings
                .get(&instance.as_any().type_id())
                .map(String::as_str),
        };
        let found = tag.and_then(|tag| self.types.get(tag));
        found.ok_or_else(|| {
            CodecError::UnregisteredInstance(
                instance
                    .dynamic_tag()
                    .unwrap_or_else(|| instance.rust_type_name())
                    .to_string(),
            )
        })
    }

    /// Tag bound to the Rust type `T`, if registered.
    pub fn tag_of<T: Schema>(&self) -> Option<&str> {
        self.bindings.get(&TypeId::of::<T>()).map(String::as_str)
    }

    /// Produce an empty instance of `tag`.
    pub fn instantiate(&self, tag: &str) -> CodecResult<Box<dyn Schema>> {
        Ok(self.lookup(tag)?.instantiate())
    }

    /// Whether an instance tagged `concrete` may fill a field declaring `declared`.
    ///
    /// True when `concrete` is `declared` or extends it, directly or not.
    pub fn is_assignable(&self, concrete: &str, declared: &str) -> bool {
        let mut current = concrete;
        let mut visited = HashSet::new();
        loop {
            if current == declared {
                return true;
            }
            if !visited.insert(current) {
                return false;
            }
            match self.types.get(current).and_then(|d| d.parent()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Check cross-type references once registration is complete.
    ///
    /// Every parent must be registered and be a field prefix of its
    /// children, and every nested tag must be registered.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for tag in &self.order {
            let Some(descriptor) = self.types.get(tag) else {
                continue;
            };

            if let Some(parent_tag) = descriptor.parent() {
                let parent = self.types.get(parent_tag).ok_or_else(|| {
                    RegistryError::UnknownParent {
                        tag: tag.clone(),
                        parent: parent_tag.to_string(),
                    }
                })?;
                if !descriptor.starts_with_fields_of(parent) {
                    return Err(RegistryError::IncompatibleParent {
                        tag: tag.clone(),
                        parent: parent_tag.to_string(),
                    });
                }
                if self.is_cyclic(tag) {
                    return Err(RegistryError::InvalidDescriptor {
                        tag: tag.clone(),
                        reason: "inheritance cycle".into(),
                    });
                }
            }

            for field in descriptor.fields() {
                let mut referenced = Vec::new();
                field.kind.referenced_tags(&mut referenced);
                if let Some(target) = referenced
                    .into_iter()
                    .find(|target| !self.types.contains_key(*target))
                {
                    return Err(RegistryError::UnresolvedReference {
                        tag: tag.clone(),
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }
        log::debug!("[registry] validated {} types", self.order.len());
        Ok(())
    }

    fn is_cyclic(&self, tag: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(tag);
        while let Some(t) = current {
            if !visited.insert(t) {
                return true;
            }
            current = self.types.get(t).and_then(|d| d.parent());
        }
        false
    }

    /// Registered tags, in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Registered descriptors, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.order.iter().filter_map(|tag| self.types.get(tag))
    }

    /// Whether `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Codec over this registry with default limits.
    pub fn codec(&self) -> Codec<'_> {
        Codec::new(self)
    }

    /// Codec over this registry with explicit limits.
    pub fn codec_with(&self, config: CodecConfig) -> Codec<'_> {
        Codec::with_config(self, config)
    }

    /// Encode with default limits.
    pub fn encode(&self, instance: &dyn Schema) -> CodecResult<Vec<u8>> {
        self.codec().encode(instance)
    }

    /// Decode with default limits.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<Box<dyn Schema>> {
        self.codec().decode(bytes)
    }
}
