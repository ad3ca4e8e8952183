// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and codec runtime configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire-format constants shared by encoder and decoder.
//!   **Never hardcode them elsewhere.**
//! - **Level 2 (Dynamic)**: [`CodecConfig`] limits, overridable from the
//!   environment or from a YAML catalog.
//!
//! # Example
//!
//! ```
//! use dynserial::config::{CodecConfig, DEFAULT_MAX_DEPTH};
//!
//! let config = CodecConfig::default().with_max_length(1024);
//! assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
//! assert_eq!(config.max_length, 1024);
//! ```

// =======================================================================
// Wire constants
// =======================================================================

/// Length/count value standing for `null` (strings, bytes, lists, maps, tags).
pub const NULL_LENGTH: u32 = u32::MAX;

/// Largest length a prefix can carry (everything below the null sentinel).
pub const MAX_WIRE_LENGTH: u32 = NULL_LENGTH - 1;

/// Presence byte written before a nullable primitive.
pub const PRESENT: u8 = 1;

/// Presence byte for a null nullable primitive.
pub const ABSENT: u8 = 0;

// =======================================================================
// Default limits
// =======================================================================

/// Default maximum nesting (instances + collections) per message.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum length prefix / element count: 64 MiB.
pub const DEFAULT_MAX_LENGTH: u32 = 64 * 1024 * 1024;

/// Environment variable overriding [`CodecConfig::max_depth`].
pub const ENV_MAX_DEPTH: &str = "DYNSERIAL_MAX_DEPTH";

/// Environment variable overriding [`CodecConfig::max_length`].
pub const ENV_MAX_LENGTH: &str = "DYNSERIAL_MAX_LENGTH";

/// Limits applied by both the encoder and the decoder.
///
/// The encoder enforces the same limits as the decoder so that it never
/// produces a message a peer with identical configuration would reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum string/bytes length and list/map element count.
    pub max_length: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl CodecConfig {
    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum length/count, clamped to [`MAX_WIRE_LENGTH`].
    #[must_use]
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length.min(MAX_WIRE_LENGTH);
        self
    }

    /// Defaults overridden by `DYNSERIAL_MAX_DEPTH` / `DYNSERIAL_MAX_LENGTH`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(depth) = env_override::<usize>(ENV_MAX_DEPTH) {
            config = config.with_max_depth(depth);
        }
        if let Some(length) = env_override::<u32>(ENV_MAX_LENGTH) {
            config = config.with_max_length(length);
        }
        config
    }
}

fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("[config] ignoring {}={:?}: not a valid number", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.max_length, 64 * 1024 * 1024);
    }

    #[test]
    fn test_max_length_clamped_below_sentinel() {
        let config = CodecConfig::default().with_max_length(u32::MAX);
        assert_eq!(config.max_length, MAX_WIRE_LENGTH);
    }

    #[test]
    fn test_env_override_parse() {
        // Unique name so parallel tests never race on it.
        std::env::set_var("DYNSERIAL_TEST_OVERRIDE", " 17 ");
        assert_eq!(env_override::<usize>("DYNSERIAL_TEST_OVERRIDE"), Some(17));
        std::env::set_var("DYNSERIAL_TEST_OVERRIDE", "lots");
        assert_eq!(env_override::<usize>("DYNSERIAL_TEST_OVERRIDE"), None);
        std::env::remove_var("DYNSERIAL_TEST_OVERRIDE");
        assert_eq!(env_override::<usize>("DYNSERIAL_TEST_OVERRIDE"), None);
    }
}
