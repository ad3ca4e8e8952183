// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Localization file-stream messages.
//!
//! A request names a file inside a localization context (type + level +
//! optional context name) on behalf of a user. `Get` requests read a byte
//! window of the file, `Put` requests write one. Both extend
//! [`LocalizationStreamRequest`], so a field declared with that tag can
//! carry either of them.
//!
//! The nested fields of these structs (`context`, `user`) hold concrete
//! types. A peer sending a registered subtype of `LocalizationContext` or
//! `User` there is rejected by the setter with [`CodecError::Field`];
//! fields that must carry subtypes are declared on records or held as
//! `Box<dyn Schema>`.
//!
//! [`CodecError::Field`]: crate::CodecError::Field
//!
//! ```
//! use dynserial::localization::{self, LocalizationLevel, LocalizationStreamRequest};
//! use dynserial::TypeRegistry;
//!
//! let mut registry = TypeRegistry::new();
//! localization::register(&mut registry).unwrap();
//!
//! let mut request = LocalizationStreamRequest::new();
//! request.set_file_name("/cfg/site.xml");
//! request.set_my_context_name(LocalizationLevel::Base);
//!
//! let bytes = registry.encode(&request).unwrap();
//! let decoded: LocalizationStreamRequest = registry.codec().decode_as(&bytes).unwrap();
//! assert_eq!(decoded.file_name(), Some("cfg/site.xml"));
//! assert_eq!(decoded.my_context_name(), Some("BASE"));
//! ```

use crate::descriptor::{EnumDescriptor, FieldDescriptor, PrimitiveKind};
use crate::error::{FieldError, RegistryError};
use crate::registry::TypeRegistry;
use crate::schema::{downcast, Describe, FromValue, IntoValue, Schema, Value};
use std::fmt;

/// Path separator stripped from the front of file names.
pub const SEPARATOR: char = '/';

/// Strip one leading [`SEPARATOR`].
pub fn normalize_file_name(name: &str) -> &str {
    name.strip_prefix(SEPARATOR).unwrap_or(name)
}

/// Generate a unit enum travelling as its variant name.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $enum_name:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in wire declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Wire name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Enum descriptor used by field registrations.
            pub fn descriptor() -> EnumDescriptor {
                EnumDescriptor::new($enum_name, Self::ALL.iter().map(|v| v.as_str()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl IntoValue for $name {
            fn into_value(self) -> Value {
                Value::Enum(self.as_str().to_string())
            }
        }

        impl FromValue for $name {
            fn from_value(value: Value) -> Result<Self, FieldError> {
                match value {
                    Value::Enum(variant) => Self::from_name(&variant).ok_or_else(|| {
                        FieldError::InvalidValue(format!(
                            "unknown {} variant '{}'",
                            $enum_name, variant
                        ))
                    }),
                    other => Err(FieldError::TypeMismatch {
                        expected: concat!("enum<", $enum_name, ">").to_string(),
                        got: other.kind_name().to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Which tree of localization files a context addresses.
    LocalizationType, "LocalizationType", {
        Unknown => "UNKNOWN",
        CommonStatic => "COMMON_STATIC",
        CaveStatic => "CAVE_STATIC",
        CaveConfig => "CAVE_CONFIG",
        EdexStatic => "EDEX_STATIC",
    }
);

wire_enum!(
    /// Override level inside a localization tree.
    LocalizationLevel, "LocalizationLevel", {
        Unknown => "UNKNOWN",
        Base => "BASE",
        Configured => "CONFIGURED",
        Site => "SITE",
        User => "USER",
        Workstation => "WORKSTATION",
    }
);

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Identity a request is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    user_id: Option<String>,
}

impl User {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }
}

impl Schema for User {
    fn field(&self, index: usize) -> Option<Value> {
        match index {
            0 => Some(self.user_id.clone().into_value()),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        match index {
            0 => self.set_user_id(Option::from_value(value)?),
            _ => return Err(FieldError::UnknownIndex(index)),
        }
        Ok(())
    }
}

impl Describe for User {
    const TYPE_TAG: &'static str = "User";

    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::string("userId").nullable()]
    }
}

// ---------------------------------------------------------------------------
// LocalizationContext
// ---------------------------------------------------------------------------

/// Localization type + level, optionally narrowed to a named context
/// (a site id, a user name, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationContext {
    localization_type: LocalizationType,
    localization_level: LocalizationLevel,
    context_name: Option<String>,
}

impl LocalizationContext {
    pub fn new(localization_type: LocalizationType, localization_level: LocalizationLevel) -> Self {
        Self {
            localization_type,
            localization_level,
            context_name: None,
        }
    }

    #[must_use]
    pub fn with_context_name(mut self, name: impl Into<String>) -> Self {
        self.context_name = Some(name.into());
        self
    }

    pub fn localization_type(&self) -> LocalizationType {
        self.localization_type
    }

    pub fn localization_level(&self) -> LocalizationLevel {
        self.localization_level
    }

    pub fn context_name(&self) -> Option<&str> {
        self.context_name.as_deref()
    }

    pub fn set_localization_type(&mut self, localization_type: LocalizationType) {
        self.localization_type = localization_type;
    }

    pub fn set_localization_level(&mut self, localization_level: LocalizationLevel) {
        self.localization_level = localization_level;
    }

    pub fn set_context_name(&mut self, name: Option<String>) {
        self.context_name = name;
    }
}

impl fmt::Display for LocalizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.localization_type, self.localization_level)?;
        if let Some(name) = &self.context_name {
            write!(f, ".{}", name)?;
        }
        Ok(())
    }
}

impl Schema for LocalizationContext {
    fn field(&self, index: usize) -> Option<Value> {
        match index {
            0 => Some(self.localization_type.into_value()),
            1 => Some(self.localization_level.into_value()),
            2 => Some(self.context_name.clone().into_value()),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        match index {
            0 => self.set_localization_type(LocalizationType::from_value(value)?),
            1 => self.set_localization_level(LocalizationLevel::from_value(value)?),
            2 => self.set_context_name(Option::from_value(value)?),
            _ => return Err(FieldError::UnknownIndex(index)),
        }
        Ok(())
    }
}

impl Describe for LocalizationContext {
    const TYPE_TAG: &'static str = "LocalizationContext";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::enumeration("localizationType", LocalizationType::descriptor()),
            FieldDescriptor::enumeration("localizationLevel", LocalizationLevel::descriptor()),
            FieldDescriptor::string("contextName").nullable(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Stream requests
// ---------------------------------------------------------------------------

/// Number of fields every stream request starts with.
const REQUEST_FIELDS: usize = 4;

/// File-stream request: context, file name, requester context name, user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationStreamRequest {
    context: Option<LocalizationContext>,
    file_name: Option<String>,
    my_context_name: Option<String>,
    user: User,
}

impl LocalizationStreamRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> Option<&LocalizationContext> {
        self.context.as_ref()
    }

    pub fn set_context(&mut self, context: Option<LocalizationContext>) {
        self.context = context;
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Store `name` without its leading [`SEPARATOR`], if any.
    pub fn set_file_name(&mut self, name: impl AsRef<str>) {
        self.file_name = Some(normalize_file_name(name.as_ref()).to_string());
    }

    pub fn clear_file_name(&mut self) {
        self.file_name = None;
    }

    pub fn my_context_name(&self) -> Option<&str> {
        self.my_context_name.as_deref()
    }

    /// Store the string form of `name` (a level, a site id, ...).
    pub fn set_my_context_name(&mut self, name: impl fmt::Display) {
        self.my_context_name = Some(name.to_string());
    }

    pub fn clear_my_context_name(&mut self) {
        self.my_context_name = None;
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn set_user(&mut self, user: User) {
        self.user = user;
    }
}

impl Schema for LocalizationStreamRequest {
    fn field(&self, index: usize) -> Option<Value> {
        match index {
            0 => Some(self.context.clone().map_or(Value::Null, Value::nested)),
            1 => Some(self.file_name.clone().into_value()),
            2 => Some(self.my_context_name.clone().into_value()),
            3 => Some(Value::nested(self.user.clone())),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        match index {
            0 => self.set_context(value.into_optional_nested()?),
            1 => match Option::<String>::from_value(value)? {
                Some(name) => self.set_file_name(name),
                None => self.clear_file_name(),
            },
            2 => match Option::<String>::from_value(value)? {
                Some(name) => self.set_my_context_name(name),
                None => self.clear_my_context_name(),
            },
            3 => self.set_user(value.into_nested()?),
            _ => return Err(FieldError::UnknownIndex(index)),
        }
        Ok(())
    }
}

impl Describe for LocalizationStreamRequest {
    const TYPE_TAG: &'static str = "LocalizationStreamRequest";

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::nested("context", LocalizationContext::TYPE_TAG).nullable(),
            FieldDescriptor::string("fileName").nullable(),
            FieldDescriptor::string("myContextName").nullable(),
            FieldDescriptor::nested("user", User::TYPE_TAG),
        ]
    }
}

/// Read `num_bytes` bytes of a file starting at `offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationStreamGetRequest {
    request: LocalizationStreamRequest,
    offset: i32,
    num_bytes: i32,
}

impl LocalizationStreamGetRequest {
    pub fn new(request: LocalizationStreamRequest, offset: i32, num_bytes: i32) -> Self {
        Self {
            request,
            offset,
            num_bytes,
        }
    }

    pub fn request(&self) -> &LocalizationStreamRequest {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut LocalizationStreamRequest {
        &mut self.request
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    pub fn num_bytes(&self) -> i32 {
        self.num_bytes
    }

    pub fn set_num_bytes(&mut self, num_bytes: i32) {
        self.num_bytes = num_bytes;
    }
}

impl Schema for LocalizationStreamGetRequest {
    fn field(&self, index: usize) -> Option<Value> {
        match index {
            i if i < REQUEST_FIELDS => self.request.field(i),
            4 => Some(self.offset.into_value()),
            5 => Some(self.num_bytes.into_value()),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        match index {
            i if i < REQUEST_FIELDS => return self.request.set_field(i, value),
            4 => self.set_offset(i32::from_value(value)?),
            5 => self.set_num_bytes(i32::from_value(value)?),
            _ => return Err(FieldError::UnknownIndex(index)),
        }
        Ok(())
    }
}

impl Describe for LocalizationStreamGetRequest {
    const TYPE_TAG: &'static str = "LocalizationStreamGetRequest";

    fn parent() -> Option<&'static str> {
        Some(LocalizationStreamRequest::TYPE_TAG)
    }

    fn fields() -> Vec<FieldDescriptor> {
        let mut fields = LocalizationStreamRequest::fields();
        fields.push(FieldDescriptor::primitive("offset", PrimitiveKind::I32));
        fields.push(FieldDescriptor::primitive("numBytes", PrimitiveKind::I32));
        fields
    }
}

/// Write a chunk of a file at `offset`; `end` marks the final chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationStreamPutRequest {
    request: LocalizationStreamRequest,
    bytes: Option<Vec<u8>>,
    offset: i32,
    end: bool,
}

impl LocalizationStreamPutRequest {
    pub fn new(request: LocalizationStreamRequest, offset: i32, bytes: Vec<u8>, end: bool) -> Self {
        Self {
            request,
            bytes: Some(bytes),
            offset,
            end,
        }
    }

    pub fn request(&self) -> &LocalizationStreamRequest {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut LocalizationStreamRequest {
        &mut self.request
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn set_bytes(&mut self, bytes: Option<Vec<u8>>) {
        self.bytes = bytes;
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    pub fn is_end(&self) -> bool {
        self.end
    }

    pub fn set_end(&mut self, end: bool) {
        self.end = end;
    }
}

impl Schema for LocalizationStreamPutRequest {
    fn field(&self, index: usize) -> Option<Value> {
        match index {
            i if i < REQUEST_FIELDS => self.request.field(i),
            4 => Some(self.bytes.clone().map_or(Value::Null, Value::Bytes)),
            5 => Some(self.offset.into_value()),
            6 => Some(self.end.into_value()),
            _ => None,
        }
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), FieldError> {
        match index {
            i if i < REQUEST_FIELDS => return self.request.set_field(i, value),
            4 => self.set_bytes(value.into_optional_bytes()?),
            5 => self.set_offset(i32::from_value(value)?),
            6 => self.set_end(bool::from_value(value)?),
            _ => return Err(FieldError::UnknownIndex(index)),
        }
        Ok(())
    }
}

impl Describe for LocalizationStreamPutRequest {
    const TYPE_TAG: &'static str = "LocalizationStreamPutRequest";

    fn parent() -> Option<&'static str> {
        Some(LocalizationStreamRequest::TYPE_TAG)
    }

    fn fields() -> Vec<FieldDescriptor> {
        let mut fields = LocalizationStreamRequest::fields();
        fields.push(FieldDescriptor::bytes("bytes").nullable());
        fields.push(FieldDescriptor::primitive("offset", PrimitiveKind::I32));
        fields.push(FieldDescriptor::primitive("end", PrimitiveKind::Bool));
        fields
    }
}

// ---------------------------------------------------------------------------
// Message family
// ---------------------------------------------------------------------------

/// Closed set of stream messages, for exhaustive handling after decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizationStreamMessage {
    Request(LocalizationStreamRequest),
    Get(LocalizationStreamGetRequest),
    Put(LocalizationStreamPutRequest),
}

impl LocalizationStreamMessage {
    /// Take a decoded instance; hands it back if it is not a stream message.
    pub fn from_schema(instance: Box<dyn Schema>) -> Result<Self, Box<dyn Schema>> {
        let instance = match downcast::<LocalizationStreamGetRequest>(instance) {
            Ok(get) => return Ok(Self::Get(get)),
            Err(other) => other,
        };
        let instance = match downcast::<LocalizationStreamPutRequest>(instance) {
            Ok(put) => return Ok(Self::Put(put)),
            Err(other) => other,
        };
        downcast::<LocalizationStreamRequest>(instance).map(Self::Request)
    }

    pub fn into_schema(self) -> Box<dyn Schema> {
        match self {
            Self::Request(request) => Box::new(request),
            Self::Get(get) => Box::new(get),
            Self::Put(put) => Box::new(put),
        }
    }

    /// Wire tag of the concrete message.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Request(_) => LocalizationStreamRequest::TYPE_TAG,
            Self::Get(_) => LocalizationStreamGetRequest::TYPE_TAG,
            Self::Put(_) => LocalizationStreamPutRequest::TYPE_TAG,
        }
    }

    /// Fields shared by every stream message.
    pub fn request(&self) -> &LocalizationStreamRequest {
        match self {
            Self::Request(request) => request,
            Self::Get(get) => get.request(),
            Self::Put(put) => put.request(),
        }
    }
}

/// Register the localization message family.
pub fn register(registry: &mut TypeRegistry) -> Result<(), RegistryError> {
    registry.register_type::<User>()?;
    registry.register_type::<LocalizationContext>()?;
    registry.register_type::<LocalizationStreamRequest>()?;
    registry.register_type::<LocalizationStreamGetRequest>()?;
    registry.register_type::<LocalizationStreamPutRequest>()?;
    Ok(())
}
