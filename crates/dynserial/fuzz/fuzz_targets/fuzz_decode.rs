// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use dynserial::{localization, Codec, CodecConfig, TypeRegistry};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

fn registry() -> &'static TypeRegistry {
    REGISTRY.get_or_init(|| {
        let mut registry = TypeRegistry::new();
        let _ = localization::register(&mut registry);
        registry
    })
}

fuzz_target!(|data: &[u8]| {
    // Small limits keep hostile counts cheap.
    let codec = Codec::with_config(
        registry(),
        CodecConfig::default().with_max_depth(16).with_max_length(1 << 16),
    );

    // Anything that decodes must re-encode, and the result must decode.
    // Bytes may differ: setters normalize file names on the way in.
    if let Ok((instance, consumed)) = codec.decode_prefix(data) {
        assert!(consumed <= data.len());
        let bytes = codec.encode(instance.as_ref()).expect("decoded instance re-encodes");
        codec.decode(&bytes).expect("re-encoded bytes decode");
    }
    let _ = codec.peek_tag(data);
});
