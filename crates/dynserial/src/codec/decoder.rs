// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoder: reads fields in descriptor order and populates instances
//! through their setters.

use super::wire::WireReader;
use crate::config::{CodecConfig, ABSENT, PRESENT};
use crate::descriptor::{FieldDescriptor, FieldKind, PrimitiveKind, TypeDescriptor};
use crate::error::{CodecError, CodecResult};
use crate::registry::TypeRegistry;
use crate::schema::{Schema, Value};
use std::sync::Arc;

pub(crate) struct Decoder<'r, 'b> {
    registry: &'r TypeRegistry,
    config: CodecConfig,
    reader: WireReader<'b>,
}

impl<'r, 'b> Decoder<'r, 'b> {
    pub(crate) fn new(registry: &'r TypeRegistry, config: CodecConfig, bytes: &'b [u8]) -> Self {
        Self {
            registry,
            config,
            reader: WireReader::new(bytes),
        }
    }

    /// Bytes consumed so far.
    pub(crate) fn offset(&self) -> usize {
        self.reader.offset()
    }

    /// Read the root tag only.
    pub(crate) fn read_root_tag(&mut self) -> CodecResult<&'b str> {
        let offset = self.reader.offset();
        self.read_tag()?.ok_or_else(|| CodecError::InvalidData {
            offset,
            reason: "null type tag at message root".into(),
        })
    }

    /// Decode one message; returns the concrete descriptor and the instance.
    pub(crate) fn read_root(&mut self) -> CodecResult<(Arc<TypeDescriptor>, Box<dyn Schema>)> {
        let tag = self.read_root_tag()?;
        let descriptor = self.resolve(tag)?;
        let instance = self.read_body(descriptor, 1)?;
        Ok((descriptor.clone(), instance))
    }

    fn read_tag(&mut self) -> CodecResult<Option<&'b str>> {
        match self.reader.read_length(self.config.max_length)? {
            None => Ok(None),
            Some(len) => self.reader.read_str(len).map(Some),
        }
    }

    fn resolve(&self, tag: &str) -> CodecResult<&'r Arc<TypeDescriptor>> {
        let registry = self.registry;
        registry.lookup(tag).inspect_err(|_| {
            log::debug!(
                "[codec] unknown type tag '{}' at offset {} (peer built with a newer schema set?)",
                tag,
                self.reader.offset()
            );
        })
    }

    fn read_body(&mut self, descriptor: &TypeDescriptor, depth: usize) -> CodecResult<Box<dyn Schema>> {
        self.check_depth(depth)?;

        let mut instance = descriptor.instantiate();
        for (index, field) in descriptor.fields().iter().enumerate() {
            let value = self.read_value(descriptor.tag(), field, field, depth)?;
            instance
                .set_field(index, value)
                .map_err(|source| CodecError::Field {
                    tag: descriptor.tag().to_string(),
                    field: field.name.clone(),
                    source,
                })?;
        }
        log::trace!("[codec] decoded '{}'", descriptor.tag());
        Ok(instance)
    }

    /// Read one value described by `desc`; `owner` is the enclosing field.
    fn read_value(
        &mut self,
        tag: &str,
        owner: &FieldDescriptor,
        desc: &FieldDescriptor,
        depth: usize,
    ) -> CodecResult<Value> {
        match &desc.kind {
            FieldKind::Primitive(kind) => {
                if desc.nullable {
                    let offset = self.reader.offset();
                    match self.reader.read_u8()? {
                        ABSENT => return Ok(Value::Null),
                        PRESENT => {}
                        other => {
                            return Err(CodecError::InvalidData {
                                offset,
                                reason: format!("invalid presence byte 0x{:02x}", other),
                            })
                        }
                    }
                }
                self.read_primitive(*kind)
            }
            FieldKind::String => match self.reader.read_length(self.config.max_length)? {
                None => self.null(tag, owner, desc),
                Some(len) => Ok(Value::String(self.reader.read_str(len)?.to_owned())),
            },
            FieldKind::Bytes => match self.reader.read_length(self.config.max_length)? {
                None => self.null(tag, owner, desc),
                Some(len) => Ok(Value::Bytes(self.reader.read_bytes(len as usize)?.to_vec())),
            },
            FieldKind::Enum(enum_desc) => {
                let offset = self.reader.offset();
                match self.reader.read_length(self.config.max_length)? {
                    None => self.null(tag, owner, desc),
                    Some(len) => {
                        let variant = self.reader.read_str(len)?;
                        if !enum_desc.contains(variant) {
                            return Err(CodecError::InvalidData {
                                offset,
                                reason: format!(
                                    "unknown variant '{}' for enum {}",
                                    variant,
                                    enum_desc.name()
                                ),
                            });
                        }
                        Ok(Value::Enum(variant.to_string()))
                    }
                }
            }
            FieldKind::Nested(declared) => match self.read_tag()? {
                None => self.null(tag, owner, desc),
                Some(found) => {
                    let concrete = self.resolve(found)?;
                    if !self.registry.is_assignable(concrete.tag(), declared) {
                        return Err(CodecError::NotAssignable {
                            tag: tag.to_string(),
                            field: owner.name.clone(),
                            declared: declared.clone(),
                            found: concrete.tag().to_string(),
                        });
                    }
                    Ok(Value::Struct(self.read_body(concrete, depth + 1)?))
                }
            },
            FieldKind::ListOf(element) => match self.reader.read_length(self.config.max_length)? {
                None => self.null(tag, owner, desc),
                Some(count) => {
                    self.check_depth(depth + 1)?;
                    // Never trust the count for allocation.
                    let mut items = Vec::with_capacity((count as usize).min(self.reader.remaining()));
                    for _ in 0..count {
                        items.push(self.read_value(tag, owner, element, depth + 1)?);
                    }
                    Ok(Value::List(items))
                }
            },
            FieldKind::MapOf(key, value) => match self.reader.read_length(self.config.max_length)? {
                None => self.null(tag, owner, desc),
                Some(count) => {
                    self.check_depth(depth + 1)?;
                    let mut entries = Vec::with_capacity((count as usize).min(self.reader.remaining()));
                    for _ in 0..count {
                        let k = self.read_value(tag, owner, key, depth + 1)?;
                        let v = self.read_value(tag, owner, value, depth + 1)?;
                        entries.push((k, v));
                    }
                    Ok(Value::Map(entries))
                }
            },
        }
    }

    fn read_primitive(&mut self, kind: PrimitiveKind) -> CodecResult<Value> {
        let r = &mut self.reader;
        Ok(match kind {
            PrimitiveKind::Bool => Value::Bool(r.read_bool()?),
            PrimitiveKind::I8 => Value::I8(r.read_i8()?),
            PrimitiveKind::I16 => Value::I16(r.read_i16()?),
            PrimitiveKind::I32 => Value::I32(r.read_i32()?),
            PrimitiveKind::I64 => Value::I64(r.read_i64()?),
            PrimitiveKind::U8 => Value::U8(r.read_u8()?),
            PrimitiveKind::U16 => Value::U16(r.read_u16()?),
            PrimitiveKind::U32 => Value::U32(r.read_u32()?),
            PrimitiveKind::U64 => Value::U64(r.read_u64()?),
            PrimitiveKind::F32 => Value::F32(r.read_f32()?),
            PrimitiveKind::F64 => Value::F64(r.read_f64()?),
            PrimitiveKind::Char => Value::Char(r.read_char()?),
        })
    }

    /// Null sentinel read for `desc`: legal only if it is nullable.
    fn null(&self, tag: &str, owner: &FieldDescriptor, desc: &FieldDescriptor) -> CodecResult<Value> {
        if desc.nullable {
            Ok(Value::Null)
        } else {
            Err(CodecError::UnexpectedNull {
                tag: tag.to_string(),
                field: owner.name.clone(),
            })
        }
    }

    fn check_depth(&self, depth: usize) -> CodecResult<()> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }
}
