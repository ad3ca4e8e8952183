// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Little-endian writer and bounds-checked reader for the wire format.

use crate::config::NULL_LENGTH;
use crate::error::{CodecError, CodecResult};

/// Generate little-endian write methods for primitive types.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Generate little-endian read methods for primitive types.
///
/// Each generated method returns `CodecError::TruncatedStream` (offset,
/// bytes needed, bytes left) when the buffer ends early, and advances the
/// offset only on success.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> CodecResult<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Appending writer over a caller-owned buffer.
pub struct WireWriter<'a> {
    buffer: &'a mut Vec<u8>,
}

impl<'a> WireWriter<'a> {
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self { buffer }
    }

    impl_write_le!(write_u8, u8);
    impl_write_le!(write_u16, u16);
    impl_write_le!(write_u32, u32);
    impl_write_le!(write_u64, u64);
    impl_write_le!(write_i8, i8);
    impl_write_le!(write_i16, i16);
    impl_write_le!(write_i32, i32);
    impl_write_le!(write_i64, i64);

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn write_char(&mut self, value: char) {
        self.write_u32(u32::from(value));
    }

    /// Null sentinel in place of a length, count or tag.
    pub fn write_null(&mut self) {
        self.write_u32(NULL_LENGTH);
    }

    /// u32 length prefix followed by the raw bytes.
    ///
    /// The caller has checked `data.len()` against the configured limit.
    pub fn write_prefixed(&mut self, data: &[u8]) {
        self.write_u32(data.len() as u32);
        self.buffer.extend_from_slice(data);
    }

    /// Bytes written so far (including anything already in the buffer).
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Forward-only reader (bounds-checked, zero-copy).
pub struct WireReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_u16, u16, 2);
    impl_read_le!(read_u32, u32, 4);
    impl_read_le!(read_u64, u64, 8);
    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_i16, i16, 2);
    impl_read_le!(read_i32, i32, 4);
    impl_read_le!(read_i64, i64, 8);

    pub fn read_f32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> CodecResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_bool(&mut self) -> CodecResult<bool> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidData {
                offset,
                reason: format!("invalid bool byte 0x{:02x}", other),
            }),
        }
    }

    pub fn read_char(&mut self) -> CodecResult<char> {
        let offset = self.offset;
        let raw = self.read_u32()?;
        char::from_u32(raw).ok_or_else(|| CodecError::InvalidData {
            offset,
            reason: format!("0x{:x} is not a unicode scalar value", raw),
        })
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::TruncatedStream {
                offset: self.offset,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Read a length/count prefix: `None` for the null sentinel.
    ///
    /// Values above `limit` fail with `CodecError::MalformedLength`.
    pub fn read_length(&mut self, limit: u32) -> CodecResult<Option<u32>> {
        let offset = self.offset;
        let length = self.read_u32()?;
        if length == NULL_LENGTH {
            return Ok(None);
        }
        if length > limit {
            return Err(CodecError::MalformedLength {
                offset,
                length: u64::from(length),
                limit: u64::from(limit),
            });
        }
        Ok(Some(length))
    }

    /// UTF-8 body of `len` bytes.
    pub fn read_str(&mut self, len: u32) -> CodecResult<&'a str> {
        let offset = self.offset;
        let bytes = self.read_bytes(len as usize)?;
        std::str::from_utf8(bytes).map_err(|e| CodecError::InvalidData {
            offset,
            reason: format!("invalid UTF-8: {}", e),
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}
