//! Shared types and helpers
//!
//! The graph under test: `A` holds an `IB` in `B`, `IB` holds an `IC` in
//! `C`, `IC` holds an `ID` in `D`. Every level carries one integer id.

#![allow(dead_code)]

use std::sync::Arc;

pub use csvmap::*;
use parking_lot::{Mutex, MutexGuard};

pub struct A;
pub struct IB;
pub struct B;
pub struct IC;
pub struct C;
pub struct ID;
pub struct D;

impl Mapped for A {
    fn shape() -> TypeShape {
        TypeShape::concrete("A")
            .scalar("AId", ScalarKind::Int)
            .reference::<IB>("B")
    }
}

impl Mapped for IB {
    fn shape() -> TypeShape {
        TypeShape::interface("IB")
            .scalar("BId", ScalarKind::Int)
            .reference::<IC>("C")
    }
}

impl Mapped for B {
    fn shape() -> TypeShape {
        TypeShape::concrete("B")
            .scalar("BId", ScalarKind::Int)
            .reference::<IC>("C")
    }
}

impl Mapped for IC {
    fn shape() -> TypeShape {
        TypeShape::interface("IC")
            .scalar("CId", ScalarKind::Int)
            .reference::<ID>("D")
    }
}

impl Mapped for C {
    fn shape() -> TypeShape {
        TypeShape::concrete("C")
            .scalar("CId", ScalarKind::Int)
            .reference::<ID>("D")
    }
}

impl Mapped for ID {
    fn shape() -> TypeShape {
        TypeShape::interface("ID").scalar("DId", ScalarKind::Int)
    }
}

impl Mapped for D {
    fn shape() -> TypeShape {
        TypeShape::concrete("D").scalar("DId", ScalarKind::Int)
    }
}

// Selectors

pub fn a_id() -> Member<A, i64> {
    Member::new("AId")
}

pub fn b() -> Member<A, IB> {
    Member::new("B")
}

pub fn b_id() -> Member<IB, i64> {
    Member::new("BId")
}

pub fn c() -> Member<IB, IC> {
    Member::new("C")
}

pub fn c_id() -> Member<IC, i64> {
    Member::new("CId")
}

pub fn d() -> Member<IC, ID> {
    Member::new("D")
}

pub fn d_id() -> Member<ID, i64> {
    Member::new("DId")
}

/// Resolver constructing the concrete type behind each interface
pub fn interface_resolver() -> FnResolver {
    FnResolver::new(|shape, args| {
        let concrete = match shape.name() {
            "IB" => B::shape(),
            "IC" => C::shape(),
            "ID" => D::shape(),
            _ => shape.clone(),
        };
        DefaultResolver.create(&concrete, args)
    })
    .with_label("interfaces")
}

/// Class map for `A` built from nested `references` calls
pub fn nested_reference_map() -> ClassMap<A> {
    let d_map = ClassMap::<ID>::builder().map(d_id()).build().unwrap();
    let c_map = ClassMap::<IC>::builder()
        .map(c_id())
        .references(d(), d_map)
        .build()
        .unwrap();
    let b_map = ClassMap::<IB>::builder()
        .map(b_id())
        .references(c(), c_map)
        .build()
        .unwrap();
    ClassMap::<A>::builder()
        .map(a_id())
        .references(b(), b_map)
        .build()
        .unwrap()
}

/// The `AId,BId,CId,DId` / `1,2,3,4` record
pub fn abcd_row() -> StringRecord {
    let header = Arc::new(HeaderRecord::new(["AId", "BId", "CId", "DId"]));
    StringRecord::new(["1", "2", "3", "4"])
        .with_header(header)
        .with_context(RowContext::at(1))
}

pub fn int_at(object: &Object, path: &str) -> Option<i64> {
    let path: MemberPath = path.parse().ok()?;
    object.get_path(&path).and_then(Value::as_int)
}

pub fn type_at<'o>(object: &'o Object, path: &str) -> Option<&'o str> {
    let path: MemberPath = path.parse().ok()?;
    object
        .get_path(&path)
        .and_then(Value::as_object)
        .map(Object::type_name)
}

// =============================================================================
// Process-wide resolver
// =============================================================================

static RESOLVER_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Holds the process-wide resolver for one test and restores the default
/// on drop
pub struct ResolverGuard {
    _lock: MutexGuard<'static, ()>,
}

impl Drop for ResolverGuard {
    fn drop(&mut self) {
        reset_current();
    }
}

/// Take exclusive use of the process-wide resolver, starting from the default
pub fn lock_resolver() -> ResolverGuard {
    let lock = RESOLVER_LOCK.lock();
    reset_current();
    ResolverGuard { _lock: lock }
}

/// Take exclusive use of the process-wide resolver and install `resolver`
pub fn install(resolver: Arc<dyn ContractResolver>) -> ResolverGuard {
    let guard = lock_resolver();
    set_current(resolver);
    guard
}
