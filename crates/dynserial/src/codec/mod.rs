// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry-driven binary codec.
//!
//! Message layout: `[tag][field_1]..[field_n]`, fields in descriptor order,
//! nested instances re-emitting their own tag. No framing: a message is
//! exactly the bytes handed to [`Codec::decode`].
//!
//! # Example
//!
//! ```
//! use dynserial::{Codec, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! registry
//!     .register(
//!         TypeDescriptorBuilder::new("Ping")
//!             .field("seq", PrimitiveKind::U32)
//!             .record_factory()
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let codec = Codec::new(&registry);
//! let ping = registry.instantiate("Ping").unwrap();
//! let bytes = codec.encode(ping.as_ref()).unwrap();
//! assert_eq!(codec.peek_tag(&bytes).unwrap(), "Ping");
//! assert!(*codec.decode(&bytes).unwrap() == *ping);
//! ```

mod decoder;
mod encoder;
pub mod wire;

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::registry::TypeRegistry;
use crate::schema::{self, Schema};
use decoder::Decoder;
use encoder::Encoder;

/// Encoder/decoder bound to one registry snapshot and one set of limits.
///
/// Cheap to create; holds no state between calls, so one `Codec` can be
/// shared by any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'r> {
    registry: &'r TypeRegistry,
    config: CodecConfig,
}

impl<'r> Codec<'r> {
    /// Codec with default limits.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: &'r TypeRegistry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Encode `instance` into a fresh buffer.
    pub fn encode(&self, instance: &dyn Schema) -> CodecResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.encode_into(instance, &mut buffer)?;
        Ok(buffer)
    }

    /// Append the encoding of `instance` to `buffer`; returns bytes written.
    ///
    /// On error `buffer` is left at its original length.
    pub fn encode_into(&self, instance: &dyn Schema, buffer: &mut Vec<u8>) -> CodecResult<usize> {
        let start = buffer.len();
        let result = Encoder::new(self.registry, self.config, buffer).write_root(instance);
        match result {
            Ok(()) => {
                log::trace!("[codec] encoded {} bytes", buffer.len() - start);
                Ok(buffer.len() - start)
            }
            Err(e) => {
                buffer.truncate(start);
                Err(e)
            }
        }
    }

    /// Decode exactly one message occupying all of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<Box<dyn Schema>> {
        let (instance, consumed) = self.decode_prefix(bytes)?;
        if consumed < bytes.len() {
            return Err(CodecError::TrailingBytes {
                remaining: bytes.len() - consumed,
            });
        }
        Ok(instance)
    }

    /// Decode one message from the front of `bytes`; returns it with the
    /// number of bytes it occupied.
    pub fn decode_prefix(&self, bytes: &[u8]) -> CodecResult<(Box<dyn Schema>, usize)> {
        let mut decoder = Decoder::new(self.registry, self.config, bytes);
        let (_, instance) = decoder.read_root()?;
        Ok((instance, decoder.offset()))
    }

    /// Decode one message and downcast it to `T`.
    pub fn decode_as<T: Schema>(&self, bytes: &[u8]) -> CodecResult<T> {
        let mut decoder = Decoder::new(self.registry, self.config, bytes);
        let (descriptor, instance) = decoder.read_root()?;
        if decoder.offset() < bytes.len() {
            return Err(CodecError::TrailingBytes {
                remaining: bytes.len() - decoder.offset(),
            });
        }
        schema::downcast::<T>(instance).map_err(|_| CodecError::UnexpectedType {
            expected: std::any::type_name::<T>(),
            found: descriptor.tag().to_string(),
        })
    }

    /// Read the root tag without decoding the body.
    pub fn peek_tag<'b>(&self, bytes: &'b [u8]) -> CodecResult<&'b str> {
        Decoder::new(self.registry, self.config, bytes).read_root_tag()
    }
}

/// Encode with default limits.
pub fn encode(registry: &TypeRegistry, instance: &dyn Schema) -> CodecResult<Vec<u8>> {
    Codec::new(registry).encode(instance)
}

/// Decode with default limits.
pub fn decode(registry: &TypeRegistry, bytes: &[u8]) -> CodecResult<Box<dyn Schema>> {
    Codec::new(registry).decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NULL_LENGTH;
    use crate::descriptor::{EnumDescriptor, FieldDescriptor, FieldKind, PrimitiveKind, TypeDescriptorBuilder};
    use crate::error::EncodingError;
    use crate::schema::{DynamicRecord, Value};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeDescriptorBuilder::new("Sample")
                    .field("flag", PrimitiveKind::Bool)
                    .nullable_field("count", PrimitiveKind::U16)
                    .nullable_string_field("name")
                    .enum_field("level", EnumDescriptor::new("Level", ["LOW", "HIGH"]))
                    .list_field("values", FieldKind::Primitive(PrimitiveKind::I32))
                    .record_factory()
                    .build()
                    .expect("Sample"),
            )
            .expect("register");
        registry
    }

    fn sample(registry: &TypeRegistry) -> DynamicRecord {
        let instance = registry.instantiate("Sample").expect("instance");
        schema::downcast::<DynamicRecord>(instance).expect("record")
    }

    #[test]
    fn test_exact_layout() {
        let registry = registry();
        let record = sample(&registry)
            .with("flag", true)
            .and_then(|r| r.with("count", 0x0102u16))
            .and_then(|r| r.with("level", Value::Enum("HIGH".into())))
            .and_then(|r| r.with("values", vec![7i32]))
            .expect("fields");

        let bytes = encode(&registry, &record).expect("encode");

        let mut expected = Vec::new();
        expected.extend_from_slice(&6u32.to_le_bytes());
        expected.extend_from_slice(b"Sample");
        expected.push(1); // flag
        expected.extend_from_slice(&[1, 0x02, 0x01]); // count: present + u16
        expected.extend_from_slice(&NULL_LENGTH.to_le_bytes()); // name: null
        expected.extend_from_slice(&4u32.to_le_bytes());
        expected.extend_from_slice(b"HIGH");
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&7i32.to_le_bytes());
        assert_eq!(bytes, expected);

        let decoded = decode(&registry, &bytes).expect("decode");
        assert!(decoded.eq_schema(&record));
    }

    #[test]
    fn test_encode_into_leaves_buffer_on_error() {
        let mut registry = registry();
        registry
            .register(
                TypeDescriptorBuilder::new("Strict")
                    .string_field("id")
                    .nested_field("inner", "Sample")
                    .record_factory()
                    .build()
                    .expect("Strict"),
            )
            .expect("register");

        let strict = registry.instantiate("Strict").expect("Strict");
        let mut buffer = vec![0xAA, 0xBB];
        let err = Codec::new(&registry)
            .encode_into(strict.as_ref(), &mut buffer)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::Encoding(EncodingError::MissingField {
                tag: "Strict".into(),
                field: "inner".into()
            })
        );
        assert_eq!(buffer, [0xAA, 0xBB]);
    }

    #[test]
    fn test_decode_prefix_and_trailing_bytes() {
        let registry = registry();
        let codec = Codec::new(&registry);
        let mut buffer = Vec::new();
        let first = codec.encode_into(&sample(&registry), &mut buffer).expect("first");
        let second = codec.encode_into(&sample(&registry), &mut buffer).expect("second");
        assert_eq!(first, second);

        let (_, consumed) = codec.decode_prefix(&buffer).expect("prefix");
        assert_eq!(consumed, first);
        assert_eq!(
            codec.decode(&buffer).unwrap_err(),
            CodecError::TrailingBytes { remaining: second }
        );
    }

    #[test]
    fn test_decode_as_checks_type() {
        let registry = registry();
        let bytes = encode(&registry, &sample(&registry)).expect("encode");
        let codec = Codec::new(&registry);
        assert!(codec.decode_as::<DynamicRecord>(&bytes).is_ok());
        assert!(matches!(
            codec.decode_as::<crate::localization::User>(&bytes),
            Err(CodecError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn test_null_root_tag_rejected() {
        let registry = registry();
        let bytes = NULL_LENGTH.to_le_bytes();
        assert!(matches!(
            decode(&registry, &bytes),
            Err(CodecError::InvalidData { offset: 0, .. })
        ));
    }

    #[test]
    fn test_encoder_enforces_limits() {
        let registry = registry();
        let record = sample(&registry).with("values", vec![0i32; 7]).expect("values");
        // "Sample" itself is 6 bytes long.
        let codec = Codec::with_config(&registry, CodecConfig::default().with_max_length(6));
        assert!(matches!(
            codec.encode(&record),
            Err(CodecError::Encoding(EncodingError::LengthOverflow { length: 7, limit: 6, .. }))
        ));

        let codec = Codec::with_config(&registry, CodecConfig::default().with_max_depth(1));
        assert_eq!(
            codec.encode(&record),
            Err(CodecError::DepthExceeded { limit: 1 })
        );
    }

    #[test]
    fn test_nullable_list_elements() {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeDescriptorBuilder::new("Sparse")
                    .with_field(FieldDescriptor::list(
                        "slots",
                        FieldDescriptor::element(FieldKind::String).nullable(),
                    ))
                    .record_factory()
                    .build()
                    .expect("Sparse"),
            )
            .expect("register");
        let record = schema::downcast::<DynamicRecord>(registry.instantiate("Sparse").expect("i"))
            .expect("record")
            .with("slots", vec![Some("a"), None, Some("c")])
            .expect("slots");

        let bytes = registry.encode(&record).expect("encode");
        let decoded = registry.decode(&bytes).expect("decode");
        assert_eq!(
            decoded.field(0),
            Some(Value::List(vec![
                Value::from("a"),
                Value::Null,
                Value::from("c")
            ]))
        );
    }
}
