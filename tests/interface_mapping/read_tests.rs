//! Reading the A -> B -> C -> D graph

use crate::test_utils::*;
use std::sync::Arc;

fn assert_abcd(object: &Object) {
    assert_eq!(object.type_name(), "A");
    assert_eq!(int_at(object, "AId"), Some(1));
    assert_eq!(int_at(object, "B.BId"), Some(2));
    assert_eq!(int_at(object, "B.C.CId"), Some(3));
    assert_eq!(int_at(object, "B.C.D.DId"), Some(4));

    assert_eq!(type_at(object, "B"), Some("B"));
    assert_eq!(type_at(object, "B.C"), Some("C"));
    assert_eq!(type_at(object, "B.C.D"), Some("D"));
}

#[test]
fn test_nested_references_with_injected_resolver() {
    let mapper = RecordMapper::new().with_resolver(Arc::new(interface_resolver()));
    mapper.register(nested_reference_map());

    let object = mapper.read::<A>(&abcd_row()).unwrap();
    assert_abcd(&object);
}

#[test]
fn test_nested_references_with_process_wide_resolver() {
    let _guard = install(Arc::new(interface_resolver()));

    let mapper = RecordMapper::new();
    mapper.register(nested_reference_map());

    let object = mapper.read::<A>(&abcd_row()).unwrap();
    assert_abcd(&object);
}

#[test]
fn test_multi_level_member_paths() {
    let map = ClassMap::<A>::builder()
        .map(a_id())
        .map(b().then(b_id()))
        .map(b().then(c()).then(c_id()))
        .map(b().then(c()).then(d()).then(d_id()))
        .build()
        .unwrap();

    // One nested map per level, created on the way
    assert_eq!(map.property_maps().len(), 1);
    assert_eq!(map.reference_maps().len(), 1);
    let b_map = map.reference_maps()[0].map();
    assert_eq!(b_map.type_name(), "IB");
    assert_eq!(b_map.reference_maps()[0].map().type_name(), "IC");

    let mapper = RecordMapper::new().with_resolver(Arc::new(interface_resolver()));
    mapper.register(map);
    let object = mapper.read::<A>(&abcd_row()).unwrap();
    assert_abcd(&object);
}

#[test]
fn test_paths_merge_into_declared_references() {
    // A nested map declared with `references`, then extended through a path
    let c_map = ClassMap::<IC>::builder().map(c_id()).build().unwrap();
    let b_map = ClassMap::<IB>::builder()
        .map(b_id())
        .references(c(), c_map)
        .build()
        .unwrap();
    let map = ClassMap::<A>::builder()
        .map(a_id())
        .references(b(), b_map)
        .map(b().then(c()).then(d()).then(d_id()))
        .build()
        .unwrap();

    let mapper = RecordMapper::new().with_resolver(Arc::new(interface_resolver()));
    mapper.register(map);
    assert_abcd(&mapper.read::<A>(&abcd_row()).unwrap());
}

#[test]
fn test_auto_mapped_graph() {
    let mapper = RecordMapper::new().with_resolver(Arc::new(interface_resolver()));
    let object = mapper.read::<A>(&abcd_row()).unwrap();
    assert_abcd(&object);

    let map = mapper.class_map::<A>().unwrap();
    assert_eq!(
        map.layout().header(),
        vec!["AId", "BId", "CId", "DId"]
    );
}

#[test]
fn test_positional_read_of_the_graph() {
    let map = ClassMap::<A>::builder()
        .map(a_id())
        .index(3)
        .map(b().then(b_id()))
        .index(2)
        .map(b().then(c()).then(c_id()))
        .index(1)
        .map(b().then(c()).then(d()).then(d_id()))
        .index(0)
        .build()
        .unwrap();

    let mapper = RecordMapper::new().with_resolver(Arc::new(interface_resolver()));
    mapper.register(map);
    let row = StringRecord::new(["4", "3", "2", "1"]);
    assert_abcd(&mapper.read::<A>(&row).unwrap());
}

#[test]
fn test_write_back_reproduces_record() {
    let mapper = RecordMapper::new().with_resolver(Arc::new(interface_resolver()));
    mapper.register(nested_reference_map());
    let object = mapper.read::<A>(&abcd_row()).unwrap();

    let mut sink = RecordBuffer::new();
    mapper.write_header::<A>(&mut sink).unwrap();
    mapper.write_record::<A>(&object, &mut sink).unwrap();
    assert_eq!(sink.records()[0], vec!["AId", "BId", "CId", "DId"]);
    assert_eq!(sink.records()[1], vec!["1", "2", "3", "4"]);
}
