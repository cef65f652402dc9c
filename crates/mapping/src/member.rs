//! Typed member selectors
//!
//! A [`Member<T, P>`] names a property of type `P` on the mapped type `T`.
//! Selectors compose with [`Member::then`], so `B.C.CId` can only be built
//! from a member of `T` holding `B`, a member of `B` holding `C`, and a
//! member of `C` holding the scalar. The compiler rejects chains whose types
//! do not line up; the names are checked against the type shapes when the
//! selector is handed to a class map.
//!
//! ```
//! use csvmap_core::{Mapped, ScalarKind, TypeShape};
//! use csvmap_mapping::Member;
//!
//! struct Order;
//! struct Customer;
//!
//! impl Mapped for Order {
//!     fn shape() -> TypeShape {
//!         TypeShape::concrete("Order").reference::<Customer>("Customer")
//!     }
//! }
//! impl Mapped for Customer {
//!     fn shape() -> TypeShape {
//!         TypeShape::concrete("Customer").scalar("Name", ScalarKind::String)
//!     }
//! }
//!
//! let name: Member<Order, String> =
//!     Member::<Order, Customer>::new("Customer").then(Member::new("Name"));
//! assert_eq!(name.path().to_path_string(), "Customer.Name");
//! ```

use std::fmt;
use std::marker::PhantomData;

use csvmap_core::{Mapped, MemberPath, ScalarKind, Value};

/// Rust types that can be the value of a mapped scalar property
pub trait FieldValue: Into<Value> + 'static {
    /// Declared scalar kind; `None` accepts any member
    fn kind() -> Option<ScalarKind>;
}

impl FieldValue for i64 {
    fn kind() -> Option<ScalarKind> {
        Some(ScalarKind::Int)
    }
}

impl FieldValue for i32 {
    fn kind() -> Option<ScalarKind> {
        Some(ScalarKind::Int)
    }
}

impl FieldValue for f64 {
    fn kind() -> Option<ScalarKind> {
        Some(ScalarKind::Float)
    }
}

impl FieldValue for bool {
    fn kind() -> Option<ScalarKind> {
        Some(ScalarKind::Bool)
    }
}

impl FieldValue for String {
    fn kind() -> Option<ScalarKind> {
        Some(ScalarKind::String)
    }
}

/// Untyped members may bind any property, including references whose value
/// is produced by a custom read closure.
impl FieldValue for Value {
    fn kind() -> Option<ScalarKind> {
        None
    }
}

/// Selector for a member of type `P` on type `T`
pub struct Member<T, P> {
    path: MemberPath,
    _marker: PhantomData<fn(&T) -> P>,
}

impl<T: Mapped, P> Member<T, P> {
    /// Select the direct member `name`
    pub fn new(name: impl Into<String>) -> Self {
        Member {
            path: MemberPath::single(name),
            _marker: PhantomData,
        }
    }

    /// The untyped path
    pub fn path(&self) -> &MemberPath {
        &self.path
    }

    /// Continue the path into the object held by this member
    pub fn then<Q>(self, next: Member<P, Q>) -> Member<T, Q>
    where
        P: Mapped,
    {
        Member {
            path: self.path.join(&next.path),
            _marker: PhantomData,
        }
    }
}

impl<T, P> Clone for Member<T, P> {
    fn clone(&self) -> Self {
        Member {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, P> fmt::Debug for Member<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Member").field(&self.path.to_path_string()).finish()
    }
}

/// Selector for a constructor parameter of type `U` on type `T`
pub struct Param<T, U> {
    name: String,
    _marker: PhantomData<fn(&T) -> U>,
}

impl<T: Mapped, U: Mapped> Param<T, U> {
    /// Select the constructor parameter `name`
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T, U> Clone for Param<T, U> {
    fn clone(&self) -> Self {
        Param {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, U> fmt::Debug for Param<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Param").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvmap_core::TypeShape;

    struct Outer;
    struct Inner;

    impl Mapped for Outer {
        fn shape() -> TypeShape {
            TypeShape::concrete("Outer").reference::<Inner>("Inner")
        }
    }

    impl Mapped for Inner {
        fn shape() -> TypeShape {
            TypeShape::concrete("Inner").scalar("Id", ScalarKind::Int)
        }
    }

    #[test]
    fn test_then_composes_paths() {
        let inner: Member<Outer, Inner> = Member::new("Inner");
        let id: Member<Outer, i64> = inner.clone().then(Member::<Inner, i64>::new("Id"));
        assert_eq!(inner.path().len(), 1);
        assert_eq!(id.path().to_path_string(), "Inner.Id");
    }

    #[test]
    fn test_field_value_kinds() {
        assert_eq!(<i32 as FieldValue>::kind(), Some(ScalarKind::Int));
        assert_eq!(<bool as FieldValue>::kind(), Some(ScalarKind::Bool));
        assert_eq!(<Value as FieldValue>::kind(), None);
    }

    #[test]
    fn test_debug_shows_path() {
        let m: Member<Outer, Inner> = Member::new("Inner");
        assert_eq!(format!("{:?}", m), "Member(\"Inner\")");
        let p: Param<Outer, Inner> = Param::new("inner");
        assert_eq!(p.name(), "inner");
    }
}
