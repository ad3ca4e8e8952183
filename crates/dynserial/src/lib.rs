// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dynserial - registry-driven binary serialization
//!
//! Typed request/response objects are registered once, at startup, under a
//! stable tag together with their ordered field list and a factory. The
//! codec then turns any registered instance into bytes and back, walking
//! the same fields in the same order on both sides.
//!
//! ## Quick Start
//!
//! ```rust
//! use dynserial::localization::{self, LocalizationStreamRequest};
//! use dynserial::{Codec, TypeRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Registration phase
//! let mut registry = TypeRegistry::new();
//! localization::register(&mut registry)?;
//! registry.validate()?;
//!
//! // Traffic
//! let codec = Codec::new(&registry);
//! let mut request = LocalizationStreamRequest::new();
//! request.set_file_name("/cfg/site.xml");
//!
//! let bytes = codec.encode(&request)?;
//! let decoded = codec.decode(&bytes)?;
//! assert!(decoded.eq_schema(&request));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Schema instances (Rust structs via Describe, or DynamicRecord)    |
//! +---------------------------------------------------------------------+
//! |  TypeRegistry: tag -> TypeDescriptor (ordered fields + factory)    |
//! |  (global snapshot via ArcSwap, YAML catalogs)                      |
//! +---------------------------------------------------------------------+
//! |  Codec: Encoder / Decoder over WireWriter / WireReader             |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeRegistry`] | Tag -> descriptor table, filled at startup |
//! | [`TypeDescriptor`] | Ordered fields + factory of one type |
//! | [`Schema`] | Index-based field accessors every instance implements |
//! | [`Codec`] | Encode/decode against one registry with one set of limits |
//! | [`DynamicRecord`] | Instance shaped by a runtime descriptor |
//!
//! ## Features
//!
//! - `catalog` (default): YAML type catalogs ([`registry::catalog`])

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod localization;
pub mod registry;
pub mod schema;

pub use codec::{decode, encode, Codec};
pub use config::CodecConfig;
pub use descriptor::{
    EnumDescriptor, FieldDescriptor, FieldKind, PrimitiveKind, TypeDescriptor,
    TypeDescriptorBuilder,
};
pub use error::{CodecError, CodecResult, EncodingError, FieldError, RegistryError};
pub use registry::TypeRegistry;
pub use schema::{
    downcast, Describe, DynamicRecord, FromValue, IntoValue, RecordShape, Schema, SchemaObject,
    Value,
};

#[cfg(feature = "catalog")]
pub use registry::catalog::{Catalog, CatalogError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
