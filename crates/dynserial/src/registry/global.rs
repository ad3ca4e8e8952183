// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide registry.
//!
//! Readers take an immutable snapshot with [`global()`]; encode/decode on
//! a snapshot never takes a lock. Writers are serialized and publish a new
//! snapshot atomically, so registering while traffic is running never
//! tears a concurrent call (it only logs a warning once [`freeze()`] has
//! been called).
//!
//! # Example
//!
//! ```
//! use dynserial::registry::global;
//!
//! let mut registry = dynserial::TypeRegistry::new();
//! dynserial::localization::register(&mut registry).unwrap();
//! global::install(registry);
//! global::freeze();
//!
//! assert!(global::global().contains("LocalizationStreamRequest"));
//! ```

use super::TypeRegistry;
use crate::descriptor::TypeDescriptor;
use crate::error::RegistryError;
use crate::schema::Describe;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

struct GlobalRegistry {
    current: ArcSwap<TypeRegistry>,
    writer: Mutex<()>,
    frozen: AtomicBool,
}

static GLOBAL_REGISTRY: OnceLock<GlobalRegistry> = OnceLock::new();

fn state() -> &'static GlobalRegistry {
    GLOBAL_REGISTRY.get_or_init(|| GlobalRegistry {
        current: ArcSwap::from_pointee(TypeRegistry::new()),
        writer: Mutex::new(()),
        frozen: AtomicBool::new(false),
    })
}

fn warn_if_frozen(what: &str) {
    if is_frozen() {
        log::warn!(
            "[registry] {} after freeze(); traffic may already be running",
            what
        );
    }
}

/// Current snapshot of the process-wide registry.
pub fn global() -> Arc<TypeRegistry> {
    state().current.load_full()
}

/// Replace the process-wide registry.
pub fn install(registry: TypeRegistry) {
    let state = state();
    let _guard = state.writer.lock();
    warn_if_frozen("install");
    log::debug!("[registry] installing global registry ({} types)", registry.len());
    state.current.store(Arc::new(registry));
}

/// Register one descriptor into the process-wide registry.
pub fn register_global(descriptor: TypeDescriptor) -> Result<(), RegistryError> {
    let state = state();
    let _guard = state.writer.lock();
    warn_if_frozen(&format!("late registration of '{}'", descriptor.tag()));
    let mut next = TypeRegistry::clone(&state.current.load());
    next.register(descriptor)?;
    state.current.store(Arc::new(next));
    Ok(())
}

/// Register a Rust type into the process-wide registry.
pub fn register_global_type<T: Describe>() -> Result<(), RegistryError> {
    register_global(T::descriptor()?)
}

/// Mark the end of the registration phase.
pub fn freeze() {
    if !state().frozen.swap(true, Ordering::AcqRel) {
        log::debug!("[registry] global registry frozen ({} types)", global().len());
    }
}

/// Whether [`freeze()`] has been called.
pub fn is_frozen() -> bool {
    state().frozen.load(Ordering::Acquire)
}
