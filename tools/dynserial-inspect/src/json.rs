// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON view of schema instances.
//!
//! Instances become objects whose first key is `$type` (the wire tag),
//! followed by the fields in wire order. Bytes are hex strings, chars and
//! enum variants are strings, maps are arrays of `[key, value]` pairs.
//! Reading JSON back is descriptor-driven: the field kind decides how a
//! JSON value is interpreted.

use anyhow::{anyhow, bail, Context, Result};
use dynserial::{FieldDescriptor, FieldKind, PrimitiveKind, Schema, TypeRegistry, Value};
use serde_json::{json, Map, Number, Value as Json};

/// Key carrying the wire tag of an instance.
pub const TYPE_KEY: &str = "$type";

// ============================================================================
// Instance -> JSON
// ============================================================================

/// Render an instance (and everything nested in it) as JSON.
pub fn instance_to_json(registry: &TypeRegistry, instance: &dyn Schema) -> Result<Json> {
    let descriptor = registry.lookup_by_instance(instance)?;
    let mut object = Map::new();
    object.insert(TYPE_KEY.to_string(), Json::String(descriptor.tag().to_string()));
    for (index, field) in descriptor.fields().iter().enumerate() {
        let value = instance
            .field(index)
            .ok_or_else(|| anyhow!("'{}' has no value for field '{}'", descriptor.tag(), field.name))?;
        object.insert(field.name.clone(), value_to_json(registry, &value)?);
    }
    Ok(Json::Object(object))
}

fn value_to_json(registry: &TypeRegistry, value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::I8(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::U8(v) => json!(v),
        Value::U16(v) => json!(v),
        Value::U32(v) => json!(v),
        Value::U64(v) => json!(v),
        // Non-finite floats have no JSON form.
        Value::F32(v) => Number::from_f64(f64::from(*v)).map_or(Json::Null, Json::Number),
        Value::F64(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::Char(c) => Json::String(c.to_string()),
        Value::String(s) | Value::Enum(s) => Json::String(s.clone()),
        Value::Bytes(bytes) => Json::String(to_hex(bytes)),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| value_to_json(registry, item))
                .collect::<Result<_>>()?,
        ),
        Value::Map(entries) => Json::Array(
            entries
                .iter()
                .map(|(k, v)| Ok(json!([value_to_json(registry, k)?, value_to_json(registry, v)?])))
                .collect::<Result<_>>()?,
        ),
        Value::Struct(nested) => instance_to_json(registry, nested.as_ref())?,
    })
}

// ============================================================================
// JSON -> instance
// ============================================================================

/// Build an instance of `tag` from a JSON object.
///
/// Fields missing from the object keep the value of a fresh instance;
/// unknown keys are an error.
pub fn instance_from_json(registry: &TypeRegistry, tag: &str, json: &Json) -> Result<Box<dyn Schema>> {
    let object = json
        .as_object()
        .ok_or_else(|| anyhow!("'{}' must be a JSON object", tag))?;
    let tag = match object.get(TYPE_KEY) {
        Some(Json::String(concrete)) => {
            if !registry.is_assignable(concrete, tag) {
                bail!("'{}' is not '{}' or one of its subtypes", concrete, tag);
            }
            concrete.as_str()
        }
        Some(other) => bail!("{} must be a string, found {}", TYPE_KEY, other),
        None => tag,
    };

    let descriptor = registry.lookup(tag)?;
    if let Some(unknown) = object
        .keys()
        .find(|key| *key != TYPE_KEY && descriptor.field(key).is_none())
    {
        bail!("'{}' has no field '{}'", tag, unknown);
    }

    let mut instance = descriptor.instantiate();
    for (index, field) in descriptor.fields().iter().enumerate() {
        let Some(raw) = object.get(&field.name) else {
            continue;
        };
        let value = value_from_json(registry, field, raw)
            .with_context(|| format!("field '{}' of '{}'", field.name, tag))?;
        instance
            .set_field(index, value)
            .with_context(|| format!("field '{}' of '{}'", field.name, tag))?;
    }
    Ok(instance)
}

fn value_from_json(registry: &TypeRegistry, desc: &FieldDescriptor, json: &Json) -> Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    Ok(match &desc.kind {
        FieldKind::Primitive(kind) => primitive_from_json(*kind, json)?,
        FieldKind::String => Value::String(expect_str(json)?.to_string()),
        FieldKind::Bytes => Value::Bytes(from_hex(expect_str(json)?)?),
        FieldKind::Enum(enum_desc) => {
            let variant = expect_str(json)?;
            if !enum_desc.contains(variant) {
                bail!(
                    "'{}' is not a variant of {} ({})",
                    variant,
                    enum_desc.name(),
                    enum_desc.variants().join(", ")
                );
            }
            Value::Enum(variant.to_string())
        }
        FieldKind::Nested(tag) => Value::Struct(instance_from_json(registry, tag, json)?),
        FieldKind::ListOf(element) => Value::List(
            expect_array(json)?
                .iter()
                .map(|item| value_from_json(registry, element, item))
                .collect::<Result<_>>()?,
        ),
        FieldKind::MapOf(key, value) => {
            let mut entries = Vec::new();
            for pair in expect_array(json)? {
                match pair.as_array().map(Vec::as_slice) {
                    Some([k, v]) => entries.push((
                        value_from_json(registry, key, k)?,
                        value_from_json(registry, value, v)?,
                    )),
                    _ => bail!("map entries are [key, value] pairs, found {}", pair),
                }
            }
            Value::Map(entries)
        }
    })
}

fn primitive_from_json(kind: PrimitiveKind, json: &Json) -> Result<Value> {
    let out_of_range = || anyhow!("{} is not a valid {}", json, kind.name());
    let signed = || json.as_i64().ok_or_else(out_of_range);
    let unsigned = || json.as_u64().ok_or_else(out_of_range);

    Ok(match kind {
        PrimitiveKind::Bool => Value::Bool(json.as_bool().ok_or_else(out_of_range)?),
        PrimitiveKind::I8 => Value::I8(i8::try_from(signed()?).map_err(|_| out_of_range())?),
        PrimitiveKind::I16 => Value::I16(i16::try_from(signed()?).map_err(|_| out_of_range())?),
        PrimitiveKind::I32 => Value::I32(i32::try_from(signed()?).map_err(|_| out_of_range())?),
        PrimitiveKind::I64 => Value::I64(signed()?),
        PrimitiveKind::U8 => Value::U8(u8::try_from(unsigned()?).map_err(|_| out_of_range())?),
        PrimitiveKind::U16 => Value::U16(u16::try_from(unsigned()?).map_err(|_| out_of_range())?),
        PrimitiveKind::U32 => Value::U32(u32::try_from(unsigned()?).map_err(|_| out_of_range())?),
        PrimitiveKind::U64 => Value::U64(unsigned()?),
        #[allow(clippy::cast_possible_truncation)]
        PrimitiveKind::F32 => Value::F32(json.as_f64().ok_or_else(out_of_range)? as f32),
        PrimitiveKind::F64 => Value::F64(json.as_f64().ok_or_else(out_of_range)?),
        PrimitiveKind::Char => {
            let s = expect_str(json)?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => bail!("char must be a one-character string, found {:?}", s),
            }
        }
    })
}

fn expect_str(json: &Json) -> Result<&str> {
    json.as_str()
        .ok_or_else(|| anyhow!("expected a string, found {}", json))
}

fn expect_array(json: &Json) -> Result<&Vec<Json>> {
    json.as_array()
        .ok_or_else(|| anyhow!("expected an array, found {}", json))
}

// ============================================================================
// Hex
// ============================================================================

/// Lowercase hex, no separators.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Parse hex text; whitespace is ignored.
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits ({})", digits.len());
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok(hi << 4 | lo)
        })
        .collect()
}

fn hex_digit(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => bail!("invalid hex digit {:?}", char::from(c)),
    }
}
