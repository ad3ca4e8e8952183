// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML type catalog.
//!
//! Declares record types (instantiated as [`DynamicRecord`](crate::DynamicRecord)s)
//! and optional codec limits in one central file.
//!
//! # Example YAML
//!
//! ```yaml
//! limits:
//!   max_depth: 16
//!   max_length: 65536
//!
//! types:
//!   - tag: Point
//!     fields:
//!       - { name: x, type: i32 }
//!       - { name: y, type: i32 }
//!       - { name: label, type: "string?" }
//!
//!   - tag: Point3
//!     extends: Point
//!     fields:
//!       - { name: z, type: i32 }
//!
//!   - tag: Polygon
//!     fields:
//!       - { name: vertices, type: { list: Point } }
//!       - { name: tags, type: { map: [string, "i64?"] } }
//!       - { name: color, type: { enum: [RED, GREEN, BLUE] } }
//!       - { name: owner, type: { nested: User }, nullable: true }
//! ```
//!
//! Scalar type names are the primitive names (`bool`, `i8` .. `u64`,
//! `f32`, `f64`, `char`), `string` and `bytes`; any other name refers to a
//! registered tag. A trailing `?` makes the type nullable.

use super::TypeRegistry;
use crate::config::CodecConfig;
use crate::descriptor::{EnumDescriptor, FieldDescriptor, FieldKind, PrimitiveKind, TypeDescriptorBuilder};
use crate::error::RegistryError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or registering a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("type '{tag}', field '{field}': {reason}")]
    InvalidType {
        tag: String,
        field: String,
        reason: String,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Root YAML document structure.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct YamlCatalog {
    /// Codec limits (optional).
    #[serde(default)]
    pub limits: Option<YamlLimits>,

    /// Types, registered in this order.
    #[serde(default)]
    pub types: Vec<YamlType>,
}

/// Codec limit overrides.
#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default, deny_unknown_fields)]
pub struct YamlLimits {
    pub max_depth: Option<usize>,
    pub max_length: Option<u32>,
}

/// One type declaration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlType {
    pub tag: String,

    /// Parent tag; its fields are prepended.
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub fields: Vec<YamlField>,
}

/// One field declaration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlField {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: YamlTypeSpec,

    #[serde(default)]
    pub nullable: bool,
}

/// Type of a field, list element or map entry.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum YamlTypeSpec {
    /// `i32`, `string?`, `User`, ...
    Name(String),
    /// `{ list: .. }`, `{ map: [k, v] }`, `{ enum: [..] }`, `{ nested: Tag }`
    Composite(Box<YamlComposite>),
}

/// Composite type spec: exactly one key must be present.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct YamlComposite {
    pub list: Option<YamlTypeSpec>,
    pub map: Option<(YamlTypeSpec, YamlTypeSpec)>,
    #[serde(rename = "enum")]
    pub variants: Option<Vec<String>>,
    pub nested: Option<String>,
}

/// A parsed catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    doc: YamlCatalog,
}

impl Catalog {
    /// Load a catalog from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("[catalog] loading {}", path.display());
        Self::from_yaml(&content)
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml(yaml_content: &str) -> Result<Self, CatalogError> {
        let doc: YamlCatalog = serde_yaml::from_str(yaml_content)?;
        Ok(Self { doc })
    }

    /// Declared tags, in file order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.doc.types.iter().map(|t| t.tag.as_str())
    }

    /// Codec limits: defaults overridden by the `limits` section.
    pub fn codec_config(&self) -> CodecConfig {
        let mut config = CodecConfig::default();
        if let Some(limits) = self.doc.limits {
            if let Some(depth) = limits.max_depth {
                config = config.with_max_depth(depth);
            }
            if let Some(length) = limits.max_length {
                config = config.with_max_length(length);
            }
        }
        config
    }

    /// Register every declared type, in file order, then validate the registry.
    ///
    /// A parent named by `extends` must be registered before the child
    /// (earlier in the file, or already in `registry`). On error `registry`
    /// is left as it was.
    pub fn register_into(&self, registry: &mut TypeRegistry) -> Result<(), CatalogError> {
        let mut staged = registry.clone();
        self.register_all(&mut staged)?;
        *registry = staged;
        log::debug!("[catalog] registered {} types", self.doc.types.len());
        Ok(())
    }

    fn register_all(&self, registry: &mut TypeRegistry) -> Result<(), CatalogError> {
        for ty in &self.doc.types {
            let mut builder = TypeDescriptorBuilder::new(ty.tag.as_str());
            if let Some(parent_tag) = &ty.extends {
                let parent = registry
                    .get(parent_tag)
                    .ok_or_else(|| RegistryError::UnknownParent {
                        tag: ty.tag.clone(),
                        parent: parent_tag.clone(),
                    })?;
                builder = builder.extends(parent);
            }
            for field in &ty.fields {
                let (kind, nullable) = resolve(&ty.tag, &field.name, &field.kind)?;
                let mut desc = FieldDescriptor::new(field.name.as_str(), kind);
                desc.nullable = nullable || field.nullable;
                builder = builder.with_field(desc);
            }
            registry.register(builder.record_factory().build()?)?;
        }
        registry.validate()?;
        Ok(())
    }

    /// Fresh registry holding only this catalog's types.
    pub fn to_registry(&self) -> Result<TypeRegistry, CatalogError> {
        let mut registry = TypeRegistry::new();
        self.register_into(&mut registry)?;
        Ok(registry)
    }
}

fn resolve(tag: &str, field: &str, spec: &YamlTypeSpec) -> Result<(FieldKind, bool), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidType {
        tag: tag.to_string(),
        field: field.to_string(),
        reason,
    };

    match spec {
        YamlTypeSpec::Name(name) => {
            let (name, nullable) = match name.strip_suffix('?') {
                Some(stripped) => (stripped.trim(), true),
                None => (name.trim(), false),
            };
            let kind = match name {
                "" => return Err(invalid("empty type name".into())),
                "string" => FieldKind::String,
                "bytes" => FieldKind::Bytes,
                other => PrimitiveKind::from_name(other)
                    .map_or_else(|| FieldKind::Nested(other.to_string()), FieldKind::Primitive),
            };
            Ok((kind, nullable))
        }
        YamlTypeSpec::Composite(composite) => {
            let YamlComposite {
                list,
                map,
                variants,
                nested,
            } = composite.as_ref();
            let present = [list.is_some(), map.is_some(), variants.is_some(), nested.is_some()]
                .into_iter()
                .filter(|p| *p)
                .count();
            if present != 1 {
                return Err(invalid(
                    "composite type needs exactly one of list, map, enum, nested".into(),
                ));
            }

            let kind = if let Some(element) = list {
                FieldKind::ListOf(Box::new(sub_descriptor(tag, field, "element", element)?))
            } else if let Some((key, value)) = map {
                FieldKind::MapOf(
                    Box::new(sub_descriptor(tag, field, "key", key)?),
                    Box::new(sub_descriptor(tag, field, "value", value)?),
                )
            } else if let Some(variants) = variants {
                if variants.is_empty() {
                    return Err(invalid("enum without variants".into()));
                }
                FieldKind::Enum(EnumDescriptor::new(field, variants.iter().cloned()))
            } else if let Some(nested) = nested {
                FieldKind::Nested(nested.clone())
            } else {
                return Err(invalid("empty composite type".into()));
            };
            Ok((kind, false))
        }
    }
}

fn sub_descriptor(
    tag: &str,
    field: &str,
    role: &str,
    spec: &YamlTypeSpec,
) -> Result<FieldDescriptor, CatalogError> {
    let (kind, nullable) = resolve(tag, field, spec)?;
    let mut desc = FieldDescriptor::new(role, kind);
    desc.nullable = nullable;
    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_yaml() {
        let catalog = Catalog::from_yaml(
            r#"
types:
  - tag: Point
    fields:
      - { name: x, type: i32 }
      - { name: label, type: "string?" }
"#,
        )
        .expect("parse");
        let registry = catalog.to_registry().expect("register");

        let desc = registry.lookup("Point").expect("Point");
        assert_eq!(desc.fields().len(), 2);
        assert_eq!(desc.fields()[0].kind, FieldKind::Primitive(PrimitiveKind::I32));
        assert!(desc.fields()[1].nullable);
        assert_eq!(catalog.codec_config(), CodecConfig::default());
    }

    #[test]
    fn test_composite_types() {
        let catalog = Catalog::from_yaml(
            r#"
types:
  - tag: Shape
    fields:
      - { name: points, type: { list: "i16?" } }
      - { name: attrs, type: { map: [string, bytes] } }
      - { name: color, type: { enum: [RED, GREEN] } }
"#,
        )
        .expect("parse");
        let registry = catalog.to_registry().expect("register");
        let desc = registry.lookup("Shape").expect("Shape");
        assert_eq!(desc.fields()[0].describe(), "list<i16?>");
        assert_eq!(desc.fields()[1].describe(), "map<string, bytes>");
        assert_eq!(desc.fields()[2].describe(), "enum<color>");
    }

    #[test]
    fn test_limits_section() {
        let catalog = Catalog::from_yaml("limits:\n  max_depth: 3\n").expect("parse");
        let config = catalog.codec_config();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_length, CodecConfig::default().max_length);
    }

    #[test]
    fn test_composite_with_two_keys_rejected() {
        let catalog = Catalog::from_yaml(
            r#"
types:
  - tag: Bad
    fields:
      - { name: f, type: { list: i32, nested: Other } }
"#,
        )
        .expect("parse");
        let err = catalog.to_registry().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidType { .. }), "{err}");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            Catalog::from_yaml("typez: []\n"),
            Err(CatalogError::Yaml(_))
        ));
    }

    #[test]
    fn test_failed_catalog_leaves_registry_untouched() {
        let mut registry = Catalog::from_yaml("types:\n  - tag: Existing\n")
            .expect("parse")
            .to_registry()
            .expect("registry");

        let partial = Catalog::from_yaml(
            r#"
types:
  - tag: Fine
    fields:
      - { name: n, type: u8 }
  - tag: Broken
    fields:
      - { name: inner, type: Missing }
"#,
        )
        .expect("parse");
        assert!(partial.register_into(&mut registry).is_err());
        assert_eq!(registry.tags().collect::<Vec<_>>(), ["Existing"]);
        assert!(!registry.contains("Fine"));

        let duplicate = Catalog::from_yaml("types:\n  - tag: Other\n  - tag: Existing\n")
            .expect("parse");
        assert!(matches!(
            duplicate.register_into(&mut registry),
            Err(CatalogError::Registry(RegistryError::DuplicateType(_)))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unresolved_nested_reported() {
        let catalog = Catalog::from_yaml(
            r#"
types:
  - tag: Holder
    fields:
      - { name: inner, type: Missing }
"#,
        )
        .expect("parse");
        let err = catalog.to_registry().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Registry(RegistryError::UnresolvedReference { .. })
        ));
    }
}
