//! Type shapes
//!
//! Rust has no runtime reflection, so every mapped type publishes a
//! [`TypeShape`] through the [`Mapped`] trait: its name, whether it can be
//! instantiated directly, its properties and its constructor parameters.
//! Mapping declarations are validated against shapes, and the contract
//! resolver receives the shape of the type it is asked to construct.
//!
//! Reference properties point at other shapes through a [`ShapeRef`], which
//! is resolved lazily so that recursive type graphs can be described.

use std::any::TypeId;
use std::fmt;

/// Scalar property types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// UTF-8 text
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "Bool",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
        };
        f.write_str(name)
    }
}

/// Lazily resolved link to another type's shape
///
/// A link made with [`ShapeRef::of`] also knows the Rust type behind the
/// shape, so two types publishing the same shape name stay distinct.
#[derive(Clone, Copy)]
pub struct ShapeRef {
    resolve: fn() -> TypeShape,
    type_id: Option<TypeId>,
}

impl ShapeRef {
    /// Link to the shape of `T`
    pub fn of<T: Mapped>() -> Self {
        ShapeRef {
            resolve: T::shape,
            type_id: Some(TypeId::of::<T>()),
        }
    }

    /// Link through an arbitrary shape function
    pub fn new(resolve: fn() -> TypeShape) -> Self {
        ShapeRef {
            resolve,
            type_id: None,
        }
    }

    /// Resolve the linked shape
    pub fn resolve(&self) -> TypeShape {
        (self.resolve)()
    }

    /// Rust type behind the shape, if the link was made from one
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }
}

/// Whether two targets denote the same type
///
/// Type ids decide when both sides have one; shape names otherwise.
pub fn same_target(a: Option<TypeId>, a_name: &str, b: Option<TypeId>, b_name: &str) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => a_name == b_name,
    }
}

impl PartialEq for ShapeRef {
    fn eq(&self, other: &Self) -> bool {
        same_target(
            self.type_id,
            &self.resolve().name,
            other.type_id,
            &other.resolve().name,
        )
    }
}

impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShapeRef").field(&self.resolve().name).finish()
    }
}

/// What a property holds
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// A single scalar value read from one field
    Scalar(ScalarKind),
    /// A nested object of another mapped type
    Reference(ShapeRef),
}

impl PropertyKind {
    /// Human readable description used in error messages
    pub fn describe(&self) -> String {
        match self {
            PropertyKind::Scalar(kind) => kind.to_string(),
            PropertyKind::Reference(shape) => format!("reference to {}", shape.resolve().name),
        }
    }

    /// The referenced shape, if this is a reference
    pub fn as_reference(&self) -> Option<&ShapeRef> {
        match self {
            PropertyKind::Reference(shape) => Some(shape),
            PropertyKind::Scalar(_) => None,
        }
    }
}

/// One property of a type
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyShape {
    /// Property name
    pub name: String,
    /// Property type
    pub kind: PropertyKind,
}

/// One constructor parameter of a type
///
/// Constructor parameters are always nested objects; they are filled by
/// parameter reference maps before the owning instance is created.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterShape {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub shape: ShapeRef,
}

/// Whether a type can be instantiated directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Plain instantiable type
    Concrete,
    /// Interface / abstract type; a contract resolver must pick an implementation
    Abstract,
}

/// Description of a mapped type
///
/// # Examples
///
/// ```
/// use csvmap_core::shape::{ScalarKind, TypeShape};
///
/// let shape = TypeShape::interface("IB").scalar("BId", ScalarKind::Int);
/// assert!(shape.is_abstract());
/// assert!(shape.property("BId").is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypeShape {
    name: String,
    kind: TypeKind,
    properties: Vec<PropertyShape>,
    constructor: Vec<ParameterShape>,
}

impl TypeShape {
    /// Start describing a concrete type
    pub fn concrete(name: impl Into<String>) -> Self {
        TypeShape {
            name: name.into(),
            kind: TypeKind::Concrete,
            properties: Vec::new(),
            constructor: Vec::new(),
        }
    }

    /// Start describing an interface / abstract type
    pub fn interface(name: impl Into<String>) -> Self {
        TypeShape {
            kind: TypeKind::Abstract,
            ..TypeShape::concrete(name)
        }
    }

    /// Add a scalar property
    pub fn scalar(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.properties.push(PropertyShape {
            name: name.into(),
            kind: PropertyKind::Scalar(kind),
        });
        self
    }

    /// Add a reference property holding a `T`
    pub fn reference<T: Mapped>(self, name: impl Into<String>) -> Self {
        self.reference_to(name, ShapeRef::of::<T>())
    }

    /// Add a reference property through an explicit [`ShapeRef`]
    pub fn reference_to(mut self, name: impl Into<String>, shape: ShapeRef) -> Self {
        self.properties.push(PropertyShape {
            name: name.into(),
            kind: PropertyKind::Reference(shape),
        });
        self
    }

    /// Add a constructor parameter holding a `T`
    pub fn parameter<T: Mapped>(mut self, name: impl Into<String>) -> Self {
        self.constructor.push(ParameterShape {
            name: name.into(),
            shape: ShapeRef::of::<T>(),
        });
        self
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type kind
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// True for interface / abstract types
    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[PropertyShape] {
        &self.properties
    }

    /// Constructor parameters in declaration order
    pub fn constructor(&self) -> &[ParameterShape] {
        &self.constructor
    }

    /// Look up a property by exact name
    pub fn property(&self, name: &str) -> Option<&PropertyShape> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Look up a constructor parameter by exact name
    pub fn parameter_named(&self, name: &str) -> Option<&ParameterShape> {
        self.constructor.iter().find(|p| p.name == name)
    }
}

/// Implemented by every type that can be the target of a class map
///
/// # Examples
///
/// ```
/// use csvmap_core::shape::{Mapped, ScalarKind, TypeShape};
///
/// struct Customer;
///
/// impl Mapped for Customer {
///     fn shape() -> TypeShape {
///         TypeShape::concrete("Customer")
///             .scalar("Id", ScalarKind::Int)
///             .scalar("Name", ScalarKind::String)
///     }
/// }
///
/// assert_eq!(Customer::shape().properties().len(), 2);
/// ```
pub trait Mapped: 'static {
    /// The shape of this type
    fn shape() -> TypeShape;
}
