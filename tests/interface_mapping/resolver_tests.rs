//! Contract resolver behaviour during reads

use crate::test_utils::*;
use std::sync::Arc;
use std::thread;

// =============================================================================
// Refused construction
// =============================================================================

#[test]
fn test_refusing_interface_is_construction_failure() {
    let refusing = interface_resolver();
    let resolver = FnResolver::new(move |shape, args| refusing.create(shape, args))
        .with_can_create(|shape| shape.name() != "IB");
    let mapper = RecordMapper::new().with_resolver(Arc::new(resolver));
    mapper.register(nested_reference_map());

    let err = mapper.read::<A>(&abcd_row()).unwrap_err();
    assert!(err.is_construction_failure());
    assert!(err.to_string().contains("IB"));
}

#[test]
fn test_default_resolver_cannot_build_interfaces() {
    let mapper = RecordMapper::new().with_resolver(Arc::new(DefaultResolver));
    mapper.register(nested_reference_map());

    let err = mapper.read::<A>(&abcd_row()).unwrap_err();
    assert!(matches!(
        err,
        Error::ConstructionFailure { ref type_name, .. } if type_name == "IB"
    ));
}

#[test]
fn test_resolver_can_pick_a_different_implementation() {
    let resolver = FnResolver::new(|shape, args| match shape.name() {
        "ID" => Ok(Object::new("SpecialD")),
        _ => interface_resolver().create(shape, args),
    });
    let mapper = RecordMapper::new().with_resolver(Arc::new(resolver));
    mapper.register(nested_reference_map());

    let object = mapper.read::<A>(&abcd_row()).unwrap();
    assert_eq!(type_at(&object, "B.C.D"), Some("SpecialD"));
    assert_eq!(int_at(&object, "B.C.D.DId"), Some(4));
}

// =============================================================================
// Process-wide resolver
// =============================================================================

#[test]
fn test_injected_resolver_ignores_process_wide_one() {
    let refuse_all = FnResolver::new(|shape, _| Ok(Object::new(shape.name())))
        .with_can_create(|_| false)
        .with_label("refuse-all");
    let _guard = install(Arc::new(refuse_all));

    let mapper = RecordMapper::new().with_resolver(Arc::new(interface_resolver()));
    mapper.register(nested_reference_map());
    assert!(mapper.read::<A>(&abcd_row()).is_ok());
    assert_eq!(current().name(), "refuse-all");
}

#[test]
fn test_install_affects_only_later_reads() {
    let guard = lock_resolver();
    let mapper = RecordMapper::new();
    mapper.register(nested_reference_map());

    assert!(mapper.read::<A>(&abcd_row()).is_err());

    set_current(Arc::new(interface_resolver()));
    let object = mapper.read::<A>(&abcd_row()).unwrap();

    let previous = reset_current();
    assert_eq!(previous.name(), "interfaces");
    assert_eq!(int_at(&object, "B.C.D.DId"), Some(4));
    assert!(mapper.read::<A>(&abcd_row()).is_err());
    drop(guard);
}

#[test]
fn test_set_current_returns_previous() {
    let _guard = lock_resolver();
    let first = set_current(Arc::new(interface_resolver()));
    assert_eq!(first.name(), "default");
    let second = set_current(Arc::new(DefaultResolver));
    assert_eq!(second.name(), "interfaces");
}

fn tagged(tag: &'static str) -> FnResolver {
    FnResolver::new(move |shape, _| {
        Ok(Object::new(format!("{}-{}", shape.name(), tag)).with("tag", tag))
    })
    .with_label(tag)
}

/// An object either comes from the default resolver or carries the tag that
/// its type name was built with
fn assert_consistent(object: &Object) {
    match object.get("tag").and_then(Value::as_str) {
        Some(tag) => assert_eq!(object.type_name(), format!("Probe-{}", tag)),
        None => assert_eq!(object.type_name(), "Probe"),
    }
}

#[test]
fn test_concurrent_installs_never_blend() {
    let _guard = lock_resolver();
    let probe = TypeShape::concrete("Probe");

    let installers: Vec<_> = ["x", "y"]
        .into_iter()
        .map(|tag| {
            let resolver: Arc<dyn ContractResolver> = Arc::new(tagged(tag));
            thread::spawn(move || {
                for _ in 0..500 {
                    set_current(Arc::clone(&resolver));
                }
            })
        })
        .collect();

    let reader = {
        let probe = probe.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                let object = create_object(&probe, &[]).unwrap().unwrap();
                assert_consistent(&object);
                assert!(["default", "x", "y"].contains(&current().name()));
            }
        })
    };

    for handle in installers {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    // Once the installers are done, every call sees one of the two, whole
    let settled = current().name().to_string();
    assert!(settled == "x" || settled == "y");
    for _ in 0..10 {
        let object = create_object(&probe, &[]).unwrap().unwrap();
        assert_consistent(&object);
        assert_eq!(object.get("tag").and_then(Value::as_str), Some(settled.as_str()));
    }
}
