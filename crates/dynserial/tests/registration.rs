// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registration phase: ordering, duplicates, bindings, deferred validation.

use dynserial::localization::{
    LocalizationContext, LocalizationLevel, LocalizationStreamGetRequest,
    LocalizationStreamPutRequest, LocalizationStreamRequest, LocalizationType, User,
};
use dynserial::{
    CodecError, Describe, DynamicRecord, PrimitiveKind, RecordShape, RegistryError, Schema,
    TypeDescriptorBuilder, TypeRegistry,
};
use std::sync::Arc;

fn forward() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register_type::<User>().expect("user");
    registry.register_type::<LocalizationContext>().expect("context");
    registry.register_type::<LocalizationStreamRequest>().expect("request");
    registry.register_type::<LocalizationStreamGetRequest>().expect("get");
    registry.register_type::<LocalizationStreamPutRequest>().expect("put");
    registry
}

fn backward() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register_type::<LocalizationStreamPutRequest>().expect("put");
    registry.register_type::<LocalizationStreamGetRequest>().expect("get");
    registry.register_type::<LocalizationStreamRequest>().expect("request");
    registry.register_type::<LocalizationContext>().expect("context");
    registry.register_type::<User>().expect("user");
    registry
}

fn sample_get() -> LocalizationStreamGetRequest {
    let mut request = LocalizationStreamRequest::new();
    request.set_context(Some(LocalizationContext::new(
        LocalizationType::EdexStatic,
        LocalizationLevel::Configured,
    )));
    request.set_file_name("/purge/purgeRules.xml");
    request.set_user(User::new("edex"));
    LocalizationStreamGetRequest::new(request, 0, 65_536)
}

#[test]
fn test_registration_order_does_not_matter() {
    let forward = forward();
    let backward = backward();
    forward.validate().expect("forward");
    backward.validate().expect("backward");

    let get = sample_get();
    let a = forward.encode(&get).expect("forward encode");
    let b = backward.encode(&get).expect("backward encode");
    assert_eq!(a, b);

    let decoded = backward.decode(&a).expect("decode");
    assert!(decoded.eq_schema(&get));
    assert_eq!(
        backward.tags().collect::<Vec<_>>()[0],
        "LocalizationStreamPutRequest"
    );
}

#[test]
fn test_duplicate_tag_rejected() {
    let mut registry = forward();
    assert_eq!(
        registry.register_type::<User>(),
        Err(RegistryError::DuplicateType("User".into()))
    );
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_rust_type_bound_once() {
    let mut registry = forward();
    let alias = TypeDescriptorBuilder::new("Operator")
        .with_fields(User::fields())
        .factory(|| Box::new(User::default()) as Box<dyn Schema>)
        .build()
        .expect("alias");

    match registry.register(alias) {
        Err(RegistryError::ConflictingBinding { tag, existing, .. }) => {
            assert_eq!(tag, "Operator");
            assert_eq!(existing, "User");
        }
        other => panic!("expected ConflictingBinding, got {:?}", other),
    }
    assert_eq!(registry.tag_of::<User>(), Some("User"));
}

#[test]
fn test_record_factory_must_match_tag() {
    let shape = Arc::new(RecordShape::new("Elsewhere".into(), Vec::new()));
    let descriptor = TypeDescriptorBuilder::new("Here")
        .factory(move || Box::new(DynamicRecord::new(&shape)) as Box<dyn Schema>)
        .build()
        .expect("descriptor");

    assert!(matches!(
        TypeRegistry::new().register(descriptor),
        Err(RegistryError::InvalidDescriptor { ref tag, .. }) if tag == "Here"
    ));
}

#[test]
fn test_incompatible_parent_detected_eagerly_and_late() {
    let base = || {
        TypeDescriptorBuilder::new("Base")
            .field("id", PrimitiveKind::U32)
            .record_factory()
            .build()
            .expect("base")
    };
    let child = || {
        TypeDescriptorBuilder::new("Child")
            .parent("Base")
            .field("name", PrimitiveKind::Char)
            .record_factory()
            .build()
            .expect("child")
    };

    let mut eager = TypeRegistry::new();
    eager.register(base()).expect("base");
    assert!(matches!(
        eager.register(child()),
        Err(RegistryError::IncompatibleParent { .. })
    ));

    let mut late = TypeRegistry::new();
    late.register(child()).expect("child first");
    late.register(base()).expect("base second");
    assert_eq!(
        late.validate(),
        Err(RegistryError::IncompatibleParent {
            tag: "Child".into(),
            parent: "Base".into()
        })
    );
}

#[test]
fn test_validate_reports_dangling_references() {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeDescriptorBuilder::new("Orphan")
                .parent("Missing")
                .record_factory()
                .build()
                .expect("orphan"),
        )
        .expect("register");
    assert!(matches!(
        registry.validate(),
        Err(RegistryError::UnknownParent { ref parent, .. }) if parent == "Missing"
    ));

    let mut registry = TypeRegistry::new();
    registry.register_type::<LocalizationStreamRequest>().expect("request");
    assert!(matches!(
        registry.validate(),
        Err(RegistryError::UnresolvedReference { ref target, .. })
            if target == "LocalizationContext" || target == "User"
    ));
}

#[test]
fn test_inheritance_cycle_rejected() {
    let mut registry = TypeRegistry::new();
    for (tag, parent) in [("A", "B"), ("B", "A")] {
        registry
            .register(
                TypeDescriptorBuilder::new(tag)
                    .parent(parent)
                    .record_factory()
                    .build()
                    .expect("descriptor"),
            )
            .expect("register");
    }
    assert!(matches!(
        registry.validate(),
        Err(RegistryError::InvalidDescriptor { ref reason, .. }) if reason.contains("cycle")
    ));
    assert!(!registry.is_assignable("A", "C"));
}

#[test]
fn test_unregistered_instance_is_programmer_error() {
    let mut registry = TypeRegistry::new();
    registry.register_type::<User>().expect("user");

    let err = registry
        .encode(&LocalizationContext::default())
        .unwrap_err();
    assert!(matches!(err, CodecError::UnregisteredInstance(_)));
    assert!(!err.is_recoverable());
}

#[test]
fn test_assignability_follows_parent_chain() {
    let registry = forward();
    assert!(registry.is_assignable("LocalizationStreamPutRequest", "LocalizationStreamRequest"));
    assert!(registry.is_assignable("LocalizationStreamRequest", "LocalizationStreamRequest"));
    assert!(!registry.is_assignable("LocalizationStreamRequest", "LocalizationStreamGetRequest"));
    assert!(!registry.is_assignable("LocalizationStreamGetRequest", "LocalizationStreamPutRequest"));
    assert!(!registry.is_assignable("User", "LocalizationContext"));
}
