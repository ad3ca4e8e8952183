// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]

//! Localization stream requests end to end: normalization, nested
//! defaults and polymorphic nested fields.

use dynserial::localization::{
    self, LocalizationContext, LocalizationLevel, LocalizationStreamGetRequest,
    LocalizationStreamMessage, LocalizationStreamPutRequest, LocalizationStreamRequest,
    LocalizationType, User,
};
use dynserial::{
    downcast, Codec, CodecError, DynamicRecord, Schema, TypeDescriptorBuilder, TypeRegistry, Value,
};

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    localization::register(&mut registry).expect("register localization family");
    registry
        .register(
            TypeDescriptorBuilder::new("Envelope")
                .string_field("id")
                .nested_field("request", "LocalizationStreamRequest")
                .record_factory()
                .build()
                .expect("envelope"),
        )
        .expect("register envelope");
    registry.validate().expect("validate");
    registry
}

fn envelope(registry: &TypeRegistry, request: Box<dyn Schema>) -> DynamicRecord {
    downcast::<DynamicRecord>(registry.instantiate("Envelope").expect("instantiate"))
        .expect("record")
        .with("id", "msg-1")
        .and_then(|e| e.with("request", request))
        .expect("fields")
}

#[test]
fn test_concrete_scenario() {
    let registry = registry();
    let codec = Codec::new(&registry);

    let mut request = LocalizationStreamRequest::new();
    request.set_file_name("/cfg/site.xml");
    request.set_my_context_name("BASE");
    assert_eq!(request.file_name(), Some("cfg/site.xml"));

    let bytes = codec.encode(&request).expect("encode");
    assert_eq!(codec.peek_tag(&bytes).expect("tag"), "LocalizationStreamRequest");

    let decoded: LocalizationStreamRequest = codec.decode_as(&bytes).expect("decode");
    assert_eq!(decoded.file_name(), Some("cfg/site.xml"));
    assert_eq!(decoded.my_context_name(), Some("BASE"));
    assert_eq!(decoded.context(), None);
    assert_eq!(decoded.user(), &User::default());
    assert_eq!(decoded, request);
}

#[test]
fn test_normalization_idempotence_round_trips() {
    let registry = registry();
    let codec = Codec::new(&registry);

    let mut with_separator = LocalizationStreamRequest::new();
    with_separator.set_file_name("/a/b");
    let mut without_separator = LocalizationStreamRequest::new();
    without_separator.set_file_name("a/b");
    assert_eq!(with_separator.file_name(), Some("a/b"));
    assert_eq!(with_separator, without_separator);

    let bytes = codec.encode(&with_separator).expect("encode");
    assert_eq!(bytes, codec.encode(&without_separator).expect("encode"));
    let decoded: LocalizationStreamRequest = codec.decode_as(&bytes).expect("decode");
    assert_eq!(decoded.file_name(), Some("a/b"));
}

#[test]
fn test_decoder_applies_setter_normalization() {
    let mut registry = TypeRegistry::new();
    localization::register(&mut registry).expect("register");
    // Same layout as LocalizationStreamRequest, without normalizing setters.
    let mut raw = TypeRegistry::new();
    raw.register(
        TypeDescriptorBuilder::new("LocalizationStreamRequest")
            .with_fields(
                registry
                    .lookup("LocalizationStreamRequest")
                    .expect("desc")
                    .fields()
                    .to_vec(),
            )
            .record_factory()
            .build()
            .expect("raw"),
    )
    .expect("raw register");
    raw.register_type::<User>().expect("user");
    raw.register_type::<LocalizationContext>().expect("context");

    let record = downcast::<DynamicRecord>(raw.instantiate("LocalizationStreamRequest").expect("i"))
        .expect("record")
        .with("fileName", Some("/etc/x.xml"))
        .and_then(|r| r.with("user", Value::nested(User::new("ops"))))
        .expect("fields");
    let bytes = raw.encode(&record).expect("encode raw");

    let decoded: LocalizationStreamRequest = registry.codec().decode_as(&bytes).expect("decode");
    assert_eq!(decoded.file_name(), Some("etc/x.xml"));
    assert_eq!(decoded.user().user_id(), Some("ops"));
}

#[test]
fn test_full_request_round_trip() {
    let registry = registry();
    let codec = Codec::new(&registry);

    let mut request = LocalizationStreamRequest::new();
    request.set_context(Some(
        LocalizationContext::new(LocalizationType::CommonStatic, LocalizationLevel::Site)
            .with_context_name("OAX"),
    ));
    request.set_file_name("/bundles/maps.xml");
    request.set_my_context_name(LocalizationLevel::User);
    request.set_user(User::new("awips"));

    let bytes = codec.encode(&request).expect("encode");
    let decoded: LocalizationStreamRequest = codec.decode_as(&bytes).expect("decode");
    assert_eq!(decoded, request);
    assert_eq!(
        decoded.context().map(ToString::to_string).as_deref(),
        Some("COMMON_STATIC.SITE.OAX")
    );
    assert_eq!(decoded.my_context_name(), Some("USER"));
}

#[test]
fn test_nested_polymorphism_keeps_subtype() {
    let registry = registry();
    let codec = Codec::new(&registry);

    let mut base = LocalizationStreamRequest::new();
    base.set_file_name("/data/grid.bin");
    let get = LocalizationStreamGetRequest::new(base.clone(), 4096, 1024);
    let put = LocalizationStreamPutRequest::new(base, 0, vec![0xDE, 0xAD, 0xBE, 0xEF], true);

    for (request, expected_tag) in [
        (Box::new(get.clone()) as Box<dyn Schema>, "LocalizationStreamGetRequest"),
        (Box::new(put.clone()) as Box<dyn Schema>, "LocalizationStreamPutRequest"),
    ] {
        let outer = envelope(&registry, request);
        let bytes = codec.encode(&outer).expect("encode");
        let decoded: DynamicRecord = codec.decode_as(&bytes).expect("decode");
        assert_eq!(decoded, outer);

        let inner = decoded
            .get::<Box<dyn Schema>>("request")
            .expect("nested request");
        let message = LocalizationStreamMessage::from_schema(inner).expect("stream message");
        assert_eq!(message.tag(), expected_tag);
        assert_eq!(message.request().file_name(), Some("data/grid.bin"));
        match message {
            LocalizationStreamMessage::Get(decoded_get) => assert_eq!(decoded_get, get),
            LocalizationStreamMessage::Put(decoded_put) => {
                assert_eq!(decoded_put.bytes(), Some(&[0xDE_u8, 0xAD, 0xBE, 0xEF][..]));
                assert!(decoded_put.is_end());
                assert_eq!(decoded_put, put);
            }
            LocalizationStreamMessage::Request(_) => panic!("subtype decoded as its parent"),
        }
    }
}

#[test]
fn test_unrelated_nested_type_rejected() {
    let registry = registry();
    let codec = Codec::new(&registry);

    let outer = envelope(&registry, Box::new(User::new("intruder")));
    assert!(matches!(
        codec.encode(&outer),
        Err(CodecError::NotAssignable { ref declared, ref found, .. })
            if declared == "LocalizationStreamRequest" && found == "User"
    ));
}

#[test]
fn test_missing_required_nested_reported() {
    let registry = registry();
    let outer = downcast::<DynamicRecord>(registry.instantiate("Envelope").expect("i"))
        .expect("record");
    let err = registry.encode(&outer).unwrap_err();
    assert!(matches!(err, CodecError::Encoding(_)), "{err}");
    assert!(err.is_recoverable());
}

#[test]
fn test_file_name_strip_reapplied_on_decode() {
    let registry = registry();
    let codec = Codec::new(&registry);

    let mut request = LocalizationStreamRequest::new();
    request.set_file_name("//x");
    assert_eq!(request.file_name(), Some("/x"));

    let bytes = codec.encode(&request).expect("encode");
    let decoded: LocalizationStreamRequest = codec.decode_as(&bytes).expect("decode");
    assert_eq!(decoded.file_name(), Some("x"));
    assert_ne!(decoded, request);
}

#[test]
fn test_context_subtype_rejected_by_typed_field() {
    let site_context = |registry: &TypeRegistry| {
        TypeDescriptorBuilder::new("SiteContext")
            .extends(registry.get("LocalizationContext").expect("context"))
            .string_field("siteId")
            .record_factory()
            .build()
            .expect("site context")
    };

    let mut typed = TypeRegistry::new();
    localization::register(&mut typed).expect("register");
    let site = site_context(&typed);
    typed.register(site).expect("site");

    // Same layout as LocalizationStreamRequest, with a record in place of the struct.
    let mut peer = TypeRegistry::new();
    peer.register_type::<User>().expect("user");
    peer.register_type::<LocalizationContext>().expect("context");
    let site = site_context(&peer);
    peer.register(site).expect("site");
    peer.register(
        TypeDescriptorBuilder::new("LocalizationStreamRequest")
            .with_fields(
                typed
                    .lookup("LocalizationStreamRequest")
                    .expect("desc")
                    .fields()
                    .to_vec(),
            )
            .record_factory()
            .build()
            .expect("raw"),
    )
    .expect("raw register");

    let context = downcast::<DynamicRecord>(peer.instantiate("SiteContext").expect("i"))
        .expect("record")
        .with("siteId", "OAX")
        .expect("siteId");
    let request = downcast::<DynamicRecord>(peer.instantiate("LocalizationStreamRequest").expect("i"))
        .expect("record")
        .with("context", Value::nested(context))
        .and_then(|r| r.with("user", Value::nested(User::new("ops"))))
        .expect("fields");
    let bytes = peer.encode(&request).expect("peer encode");

    assert!(matches!(
        typed.decode(&bytes),
        Err(CodecError::Field { ref tag, ref field, .. })
            if tag == "LocalizationStreamRequest" && field == "context"
    ));
    // A record-shaped receiver keeps the subtype.
    let decoded: DynamicRecord = peer.codec().decode_as(&bytes).expect("record decode");
    assert_eq!(decoded, request);
}
