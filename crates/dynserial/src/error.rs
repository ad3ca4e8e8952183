// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for registration, encoding and decoding.
//!
//! Two families:
//!
//! - [`RegistryError`]: programmer errors raised while the registry is being
//!   populated. Treat them as startup-fatal.
//! - [`CodecError`]: returned synchronously by every encode/decode call.
//!   Corrupt input and unknown tags are recoverable per message (see
//!   [`CodecError::is_recoverable`]).

use thiserror::Error;

/// Errors raised while building or validating a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("type '{0}' is already registered")]
    DuplicateType(String),

    #[error("Rust type {rust_type} is already bound to '{existing}', cannot bind it to '{tag}'")]
    ConflictingBinding {
        tag: String,
        existing: String,
        rust_type: &'static str,
    },

    #[error("invalid descriptor for '{tag}': {reason}")]
    InvalidDescriptor { tag: String, reason: String },

    #[error("field '{field}' of '{tag}' references unregistered type '{target}'")]
    UnresolvedReference {
        tag: String,
        field: String,
        target: String,
    },

    #[error("type '{tag}' extends unregistered type '{parent}'")]
    UnknownParent { tag: String, parent: String },

    #[error("type '{tag}' does not start with the fields of its parent '{parent}'")]
    IncompatibleParent { tag: String, parent: String },
}

/// Encoder-side failures: the instance cannot be represented on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("required field '{field}' of '{tag}' is null")]
    MissingField { tag: String, field: String },

    #[error("field '{field}' of '{tag}': expected {expected}, found {found}")]
    TypeMismatch {
        tag: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("field '{field}' of '{tag}': length {length} exceeds limit {limit}")]
    LengthOverflow {
        tag: String,
        field: String,
        length: usize,
        limit: usize,
    },

    #[error("'{tag}' exposes no value for field #{index} ('{field}')")]
    MissingAccessor {
        tag: String,
        field: String,
        index: usize,
    },
}

/// Rejections returned by [`Schema::set_field`](crate::Schema::set_field).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("no field at index {0}")]
    UnknownIndex(usize),

    #[error("no field named '{0}'")]
    UnknownField(String),

    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Errors returned by encode/decode calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Decoded tag was never registered locally (typically version skew).
    #[error("unknown type tag '{0}'")]
    UnknownType(String),

    /// The instance's concrete type was never registered.
    #[error("instance of {0} is not registered")]
    UnregisteredInstance(String),

    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    /// Buffer ended in the middle of a field.
    #[error("truncated stream at offset {offset}: need {needed} bytes, {remaining} remaining")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// Length prefix or element count above the configured limit.
    #[error("malformed length {length} at offset {offset} (limit {limit})")]
    MalformedLength {
        offset: usize,
        length: u64,
        limit: u64,
    },

    #[error("invalid data at offset {offset}: {reason}")]
    InvalidData { offset: usize, reason: String },

    #[error("null value for required field '{field}' of '{tag}'")]
    UnexpectedNull { tag: String, field: String },

    /// Nested value's concrete type is not the declared type or one of its descendants.
    #[error("field '{field}' of '{tag}' declares '{declared}', got unrelated type '{found}'")]
    NotAssignable {
        tag: String,
        field: String,
        declared: String,
        found: String,
    },

    #[error("nesting depth exceeds {limit}")]
    DepthExceeded { limit: usize },

    #[error("{remaining} trailing bytes after message")]
    TrailingBytes { remaining: usize },

    #[error("field '{field}' of '{tag}' rejected value: {source}")]
    Field {
        tag: String,
        field: String,
        #[source]
        source: FieldError,
    },

    #[error("expected instance of {expected}, decoded '{found}'")]
    UnexpectedType { expected: &'static str, found: String },
}

impl CodecError {
    /// Whether the caller can drop the offending message and carry on.
    ///
    /// `false` means a programmer error (an instance type that was never
    /// registered, or an instance that does not match its own descriptor).
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::UnregisteredInstance(_)
                | Self::Encoding(EncodingError::MissingAccessor { .. })
        )
    }

    /// Whether this error was caused by incomplete input.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::TruncatedStream { .. })
    }
}

pub type CodecResult<T> = core::result::Result<T, CodecError>;
