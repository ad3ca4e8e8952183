// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Many threads encoding and decoding against one frozen registry.

use dynserial::localization::{
    self, LocalizationContext, LocalizationLevel, LocalizationStreamGetRequest,
    LocalizationStreamMessage, LocalizationStreamPutRequest, LocalizationStreamRequest,
    LocalizationType, User,
};
use dynserial::registry::global;
use dynserial::{Codec, PrimitiveKind, TypeDescriptorBuilder, TypeRegistry};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const ITERATIONS: usize = 500;

fn message(thread: usize, i: usize) -> LocalizationStreamMessage {
    let mut request = LocalizationStreamRequest::new();
    request.set_file_name(format!("/t{}/file{}.xml", thread, i));
    request.set_user(User::new(format!("worker-{}", thread)));
    if i % 2 == 0 {
        request.set_context(Some(LocalizationContext::new(
            LocalizationType::CommonStatic,
            LocalizationLevel::ALL[i % LocalizationLevel::ALL.len()],
        )));
    }
    match i % 3 {
        0 => LocalizationStreamMessage::Request(request),
        1 => LocalizationStreamMessage::Get(LocalizationStreamGetRequest::new(
            request,
            i as i32,
            1024,
        )),
        _ => LocalizationStreamMessage::Put(LocalizationStreamPutRequest::new(
            request,
            i as i32,
            vec![thread as u8; i % 64],
            i % 5 == 0,
        )),
    }
}

#[test]
fn test_shared_registry_across_threads() {
    let mut registry = TypeRegistry::new();
    localization::register(&mut registry).expect("register");
    let registry = Arc::new(registry);

    thread::scope(|scope| {
        for t in 0..THREADS {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                let codec = Codec::new(&registry);
                let mut buffer = Vec::new();
                for i in 0..ITERATIONS {
                    let original = message(t, i);
                    buffer.clear();
                    codec
                        .encode_into(original.clone().into_schema().as_ref(), &mut buffer)
                        .expect("encode");
                    let decoded = LocalizationStreamMessage::from_schema(
                        codec.decode(&buffer).expect("decode"),
                    )
                    .expect("stream message");
                    assert_eq!(decoded, original);
                }
            });
        }
    });
}

#[test]
fn test_global_snapshot_survives_late_registration() {
    let mut registry = TypeRegistry::new();
    localization::register(&mut registry).expect("register");
    global::install(registry);
    global::freeze();
    assert!(global::is_frozen());

    let snapshot = global::global();
    let expected = snapshot.len();

    thread::scope(|scope| {
        for t in 0..THREADS {
            scope.spawn(move || {
                for i in 0..ITERATIONS / 5 {
                    // Each call takes whatever snapshot is current.
                    let registry = global::global();
                    let original = message(t, i);
                    let bytes = registry
                        .encode(original.clone().into_schema().as_ref())
                        .expect("encode");
                    let decoded = registry.decode(&bytes).expect("decode");
                    assert!(decoded.eq_schema(original.into_schema().as_ref()));
                }
            });
        }

        scope.spawn(|| {
            for n in 0..20 {
                global::register_global(
                    TypeDescriptorBuilder::new(format!("LateType{}", n))
                        .field("n", PrimitiveKind::U32)
                        .record_factory()
                        .build()
                        .expect("late"),
                )
                .expect("late registration");
            }
        });
    });

    // Snapshots taken earlier are never mutated.
    assert_eq!(snapshot.len(), expected);
    assert_eq!(global::global().len(), expected + 20);
    assert!(global::global().contains("LateType19"));
}
