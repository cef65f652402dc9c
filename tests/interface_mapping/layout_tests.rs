//! Prefixes, max-index and field layout

use crate::test_utils::*;
use std::sync::Arc;

struct Outer;
struct Inner;

impl Mapped for Outer {
    fn shape() -> TypeShape {
        TypeShape::concrete("Outer")
            .scalar("Id", ScalarKind::Int)
            .reference::<Inner>("Child")
    }
}

impl Mapped for Inner {
    fn shape() -> TypeShape {
        TypeShape::concrete("Inner")
            .scalar("Value", ScalarKind::String)
            .scalar("Rank", ScalarKind::Int)
    }
}

fn inner_value() -> Member<Inner, String> {
    Member::new("Value")
}

#[test]
fn test_prefix_is_prepended_to_nested_names() {
    let inner = ClassMap::<Inner>::builder()
        .map(inner_value())
        .name(["X"])
        .build()
        .unwrap();
    let outer = ClassMap::<Outer>::builder()
        .references_prefixed(Member::new("Child"), inner, Some("B."))
        .build()
        .unwrap();

    let layout = outer.layout();
    let binding = layout
        .binding(&Member::<Outer, Inner>::new("Child").then(inner_value()).path().clone())
        .unwrap();
    assert_eq!(binding.names(), ["B.X".to_string()]);

    let mapper = RecordMapper::new().with_resolver(Arc::new(DefaultResolver));
    mapper.register(outer);
    let row = StringRecord::new(["hello"]).with_header(Arc::new(HeaderRecord::new(["B.X"])));
    let object = mapper.read::<Outer>(&row).unwrap();
    let child = object.get("Child").and_then(Value::as_object).unwrap();
    assert_eq!(child.get("Value"), Some(&Value::from("hello")));
}

#[test]
fn test_default_prefix_is_member_name() {
    let inner = ClassMap::<Inner>::builder()
        .map(inner_value())
        .build()
        .unwrap();
    let mut outer = ClassMap::<Outer>::new();
    outer
        .references(&Member::new("Child"), inner)
        .unwrap()
        .set_prefix(None);

    assert_eq!(outer.layout().header(), vec!["Child.Value"]);
}

#[test]
fn test_unprefixed_unindexed_siblings_fall_back_to_member_names() {
    let map = nested_reference_map();
    assert_eq!(map.max_index(), None);
    assert!(map.layout().collisions().is_empty());
}

#[test]
fn test_max_index_over_nested_reference() {
    let inner = ClassMap::<Inner>::builder()
        .map(Member::<Inner, i64>::new("Rank"))
        .index(7)
        .build()
        .unwrap();
    let outer = ClassMap::<Outer>::builder()
        .map(Member::<Outer, i64>::new("Id"))
        .index(3)
        .references(Member::new("Child"), inner)
        .build()
        .unwrap();

    assert_eq!(ClassMap::<Outer>::new().max_index(), None);
    assert_eq!(outer.max_index(), Some(7));

    let mapper = RecordMapper::new();
    mapper.register(outer);
    assert_eq!(mapper.max_index::<Outer>().unwrap(), Some(7));
}

#[test]
fn test_max_index_of_positional_graph() {
    let map = ClassMap::<A>::builder()
        .map(a_id())
        .index(0)
        .map(b().then(c()).then(d()).then(d_id()))
        .index(5)
        .build()
        .unwrap();
    assert_eq!(map.max_index(), Some(5));
}

#[test]
fn test_prefix_reference_headers_config() {
    let config = MappingConfig::from_toml_str("prefix_reference_headers = true").unwrap();
    let mapper = RecordMapper::with_config(config).with_resolver(Arc::new(interface_resolver()));

    let map = mapper.class_map::<A>().unwrap();
    assert_eq!(
        map.layout().header(),
        vec!["AId", "B.BId", "B.C.CId", "B.C.D.DId"]
    );

    let header = Arc::new(HeaderRecord::new(["B.C.D.DId", "B.C.CId", "B.BId", "AId"]));
    let row = StringRecord::new(["4", "3", "2", "1"]).with_header(header);
    let object = mapper.read::<A>(&row).unwrap();
    assert_eq!(int_at(&object, "B.C.D.DId"), Some(4));
    assert_eq!(int_at(&object, "AId"), Some(1));
}
