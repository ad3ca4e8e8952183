// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Depth-first encoder: tag, then every field in descriptor order.

use super::wire::WireWriter;
use crate::config::{CodecConfig, ABSENT, PRESENT};
use crate::descriptor::{FieldDescriptor, FieldKind, PrimitiveKind, TypeDescriptor};
use crate::error::{CodecError, CodecResult, EncodingError};
use crate::registry::TypeRegistry;
use crate::schema::{Schema, Value};

/// Where a value sits, for error reports.
struct FieldContext<'a> {
    tag: &'a str,
    field: &'a str,
}

impl FieldContext<'_> {
    fn mismatch(&self, expected: String, found: &Value) -> CodecError {
        EncodingError::TypeMismatch {
            tag: self.tag.to_string(),
            field: self.field.to_string(),
            expected,
            found: found.kind_name().to_string(),
        }
        .into()
    }
}

pub(crate) struct Encoder<'r, 'b> {
    registry: &'r TypeRegistry,
    config: CodecConfig,
    writer: WireWriter<'b>,
}

impl<'r, 'b> Encoder<'r, 'b> {
    pub(crate) fn new(registry: &'r TypeRegistry, config: CodecConfig, buffer: &'b mut Vec<u8>) -> Self {
        Self {
            registry,
            config,
            writer: WireWriter::new(buffer),
        }
    }

    /// Encode a root instance.
    pub(crate) fn write_root(&mut self, instance: &dyn Schema) -> CodecResult<()> {
        let registry = self.registry;
        let descriptor = registry.lookup_by_instance(instance)?;
        self.write_instance(descriptor, instance, 1)
    }

    fn write_instance(
        &mut self,
        descriptor: &TypeDescriptor,
        instance: &dyn Schema,
        depth: usize,
    ) -> CodecResult<()> {
        self.check_depth(depth)?;

        let tag = descriptor.tag();
        self.check_length(tag, "<tag>", tag.len())?;
        self.writer.write_prefixed(tag.as_bytes());

        for (index, field) in descriptor.fields().iter().enumerate() {
            let value = instance
                .field(index)
                .ok_or_else(|| EncodingError::MissingAccessor {
                    tag: tag.to_string(),
                    field: field.name.clone(),
                    index,
                })?;
            let ctx = FieldContext {
                tag,
                field: &field.name,
            };
            self.write_value(&ctx, field, &value, depth)?;
        }
        Ok(())
    }

    fn write_value(
        &mut self,
        ctx: &FieldContext<'_>,
        field: &FieldDescriptor,
        value: &Value,
        depth: usize,
    ) -> CodecResult<()> {
        if value.is_null() {
            if !field.nullable {
                return Err(EncodingError::MissingField {
                    tag: ctx.tag.to_string(),
                    field: ctx.field.to_string(),
                }
                .into());
            }
            match field.kind {
                FieldKind::Primitive(_) => self.writer.write_u8(ABSENT),
                _ => self.writer.write_null(),
            }
            return Ok(());
        }

        match &field.kind {
            FieldKind::Primitive(kind) => {
                if field.nullable {
                    self.writer.write_u8(PRESENT);
                }
                self.write_primitive(ctx, *kind, value)
            }
            FieldKind::String => match value {
                Value::String(s) => self.write_str(ctx, s),
                other => Err(ctx.mismatch(field.kind.describe(), other)),
            },
            FieldKind::Bytes => match value {
                Value::Bytes(bytes) => {
                    self.check_length(ctx.tag, ctx.field, bytes.len())?;
                    self.writer.write_prefixed(bytes);
                    Ok(())
                }
                other => Err(ctx.mismatch(field.kind.describe(), other)),
            },
            FieldKind::Enum(desc) => match value {
                Value::Enum(variant) if desc.contains(variant) => self.write_str(ctx, variant),
                Value::Enum(variant) => Err(EncodingError::TypeMismatch {
                    tag: ctx.tag.to_string(),
                    field: ctx.field.to_string(),
                    expected: field.kind.describe(),
                    found: format!("undeclared variant '{}'", variant),
                }
                .into()),
                other => Err(ctx.mismatch(field.kind.describe(), other)),
            },
            FieldKind::Nested(declared) => match value {
                Value::Struct(inner) => {
                    let registry = self.registry;
                    let concrete = registry.lookup_by_instance(inner.as_ref())?;
                    if !registry.is_assignable(concrete.tag(), declared) {
                        return Err(CodecError::NotAssignable {
                            tag: ctx.tag.to_string(),
                            field: ctx.field.to_string(),
                            declared: declared.clone(),
                            found: concrete.tag().to_string(),
                        });
                    }
                    self.write_instance(concrete, inner.as_ref(), depth + 1)
                }
                other => Err(ctx.mismatch(field.kind.describe(), other)),
            },
            FieldKind::ListOf(element) => match value {
                Value::List(items) => {
                    self.check_depth(depth + 1)?;
                    self.check_length(ctx.tag, ctx.field, items.len())?;
                    self.writer.write_u32(items.len() as u32);
                    for item in items {
                        self.write_value(ctx, element, item, depth + 1)?;
                    }
                    Ok(())
                }
                other => Err(ctx.mismatch(field.kind.describe(), other)),
            },
            FieldKind::MapOf(key, val) => match value {
                Value::Map(entries) => {
                    self.check_depth(depth + 1)?;
                    self.check_length(ctx.tag, ctx.field, entries.len())?;
                    self.writer.write_u32(entries.len() as u32);
                    for (k, v) in entries {
                        self.write_value(ctx, key, k, depth + 1)?;
                        self.write_value(ctx, val, v, depth + 1)?;
                    }
                    Ok(())
                }
                other => Err(ctx.mismatch(field.kind.describe(), other)),
            },
        }
    }

    fn write_primitive(
        &mut self,
        ctx: &FieldContext<'_>,
        kind: PrimitiveKind,
        value: &Value,
    ) -> CodecResult<()> {
        let w = &mut self.writer;
        match (kind, value) {
            (PrimitiveKind::Bool, Value::Bool(v)) => w.write_bool(*v),
            (PrimitiveKind::I8, Value::I8(v)) => w.write_i8(*v),
            (PrimitiveKind::I16, Value::I16(v)) => w.write_i16(*v),
            (PrimitiveKind::I32, Value::I32(v)) => w.write_i32(*v),
            (PrimitiveKind::I64, Value::I64(v)) => w.write_i64(*v),
            (PrimitiveKind::U8, Value::U8(v)) => w.write_u8(*v),
            (PrimitiveKind::U16, Value::U16(v)) => w.write_u16(*v),
            (PrimitiveKind::U32, Value::U32(v)) => w.write_u32(*v),
            (PrimitiveKind::U64, Value::U64(v)) => w.write_u64(*v),
            (PrimitiveKind::F32, Value::F32(v)) => w.write_f32(*v),
            (PrimitiveKind::F64, Value::F64(v)) => w.write_f64(*v),
            (PrimitiveKind::Char, Value::Char(v)) => w.write_char(*v),
            (kind, other) => return Err(ctx.mismatch(kind.name().to_string(), other)),
        }
        Ok(())
    }

    fn write_str(&mut self, ctx: &FieldContext<'_>, s: &str) -> CodecResult<()> {
        self.check_length(ctx.tag, ctx.field, s.len())?;
        self.writer.write_prefixed(s.as_bytes());
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> CodecResult<()> {
        if depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn check_length(&self, tag: &str, field: &str, length: usize) -> CodecResult<()> {
        let limit = self.config.max_length as usize;
        if length > limit {
            return Err(EncodingError::LengthOverflow {
                tag: tag.to_string(),
                field: field.to_string(),
                length,
                limit,
            }
            .into());
        }
        Ok(())
    }
}
