//! Contract resolvers
//!
//! A contract resolver decides how an instance of a requested type comes
//! into existence. The mapping engine asks it for every object it needs:
//! the record's root object, every nested object behind a reference map and
//! every constructor argument behind a parameter reference map.
//!
//! Abstract types cannot be constructed by the engine itself, so mapping an
//! interface-typed member needs a resolver that picks an implementation.
//!
//! ## Process-wide resolver
//!
//! [`current`] and [`set_current`] manage one resolver for the whole
//! process, held behind a single lock. Installing a resolver only affects
//! constructions that fetch the resolver afterwards. A [`RecordMapper`]
//! fetches it once per read call, or uses the resolver injected with
//! [`RecordMapper::with_resolver`] and never touches the global one.
//!
//! [`RecordMapper`]: crate::RecordMapper
//! [`RecordMapper::with_resolver`]: crate::RecordMapper::with_resolver

use std::fmt;
use std::sync::Arc;

use csvmap_core::{Error, Object, Result, TypeShape, Value};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::info;

/// Predicate deciding whether a type can be constructed
pub type CanCreateFn = Arc<dyn Fn(&TypeShape) -> bool + Send + Sync>;

/// Factory producing an instance from a shape and constructor arguments
pub type CreateFn = Arc<dyn Fn(&TypeShape, &[Value]) -> Result<Object> + Send + Sync>;

/// Strategy for constructing target instances
pub trait ContractResolver: Send + Sync {
    /// Whether this resolver is willing to construct `shape` at all
    fn can_create(&self, _shape: &TypeShape) -> bool {
        true
    }

    /// Construct an instance of `shape` from constructor arguments
    ///
    /// `args` holds one value per constructor parameter, in declaration order.
    fn create(&self, shape: &TypeShape, args: &[Value]) -> Result<Object>;

    /// Construct an instance if [`ContractResolver::can_create`] allows it
    ///
    /// `Ok(None)` signals that no instance was produced. That is not an
    /// error here; the caller decides whether it can do without one.
    fn create_object(&self, shape: &TypeShape, args: &[Value]) -> Result<Option<Object>> {
        if !self.can_create(shape) {
            return Ok(None);
        }
        self.create(shape, args).map(Some)
    }

    /// Name used in log output
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Plain construction of concrete types
///
/// Constructor arguments are stored on the new object under the property
/// whose name matches the parameter ignoring ASCII case, or under the
/// parameter name when there is no such property.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl ContractResolver for DefaultResolver {
    fn create(&self, shape: &TypeShape, args: &[Value]) -> Result<Object> {
        if shape.is_abstract() {
            return Err(Error::construction(
                shape.name(),
                "abstract type needs a contract resolver that selects an implementation",
            ));
        }
        let parameters = shape.constructor();
        if parameters.len() != args.len() {
            return Err(Error::construction(
                shape.name(),
                format!(
                    "expected {} constructor arguments, got {}",
                    parameters.len(),
                    args.len()
                ),
            ));
        }

        let mut object = Object::new(shape.name());
        for (parameter, arg) in parameters.iter().zip(args) {
            let target = shape
                .properties()
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(&parameter.name))
                .map_or(parameter.name.as_str(), |p| p.name.as_str());
            object.set(target, arg.clone());
        }
        Ok(object)
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// Resolver assembled from closures
///
/// ```
/// use csvmap_core::{Object, TypeShape};
/// use csvmap_engine::{ContractResolver, DefaultResolver, FnResolver};
///
/// let resolver = FnResolver::new(|shape, args| match shape.name() {
///     "IShape" => Ok(Object::new("Circle")),
///     _ => DefaultResolver.create(shape, args),
/// });
///
/// let made = resolver
///     .create_object(&TypeShape::interface("IShape"), &[])
///     .unwrap()
///     .unwrap();
/// assert_eq!(made.type_name(), "Circle");
/// ```
#[derive(Clone)]
pub struct FnResolver {
    label: String,
    can_create: Option<CanCreateFn>,
    create: CreateFn,
}

impl FnResolver {
    /// Resolver that accepts every type and builds it with `create`
    pub fn new<F>(create: F) -> Self
    where
        F: Fn(&TypeShape, &[Value]) -> Result<Object> + Send + Sync + 'static,
    {
        FnResolver {
            label: "fn".to_string(),
            can_create: None,
            create: Arc::new(create),
        }
    }

    /// Only construct types accepted by `can_create`
    pub fn with_can_create<F>(mut self, can_create: F) -> Self
    where
        F: Fn(&TypeShape) -> bool + Send + Sync + 'static,
    {
        self.can_create = Some(Arc::new(can_create));
        self
    }

    /// Name shown in log output
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl ContractResolver for FnResolver {
    fn can_create(&self, shape: &TypeShape) -> bool {
        self.can_create.as_ref().map_or(true, |f| f(shape))
    }

    fn create(&self, shape: &TypeShape, args: &[Value]) -> Result<Object> {
        (self.create)(shape, args)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for FnResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver")
            .field("label", &self.label)
            .field("can_create", &self.can_create.is_some())
            .finish()
    }
}

// =============================================================================
// Process-wide current resolver
// =============================================================================

/// The current resolver
///
/// Reads and replacements both go through this one lock, so nobody ever
/// sees a half-installed resolver.
static CURRENT: Lazy<Mutex<Arc<dyn ContractResolver>>> =
    Lazy::new(|| Mutex::new(Arc::new(DefaultResolver)));

/// The resolver currently installed for the process
pub fn current() -> Arc<dyn ContractResolver> {
    Arc::clone(&CURRENT.lock())
}

/// Install `resolver` for the process, returning the previous one
///
/// Constructions already running keep the resolver they fetched.
pub fn set_current(resolver: Arc<dyn ContractResolver>) -> Arc<dyn ContractResolver> {
    let mut guard = CURRENT.lock();
    info!(
        previous = guard.name(),
        resolver = resolver.name(),
        "Installed contract resolver"
    );
    std::mem::replace(&mut *guard, resolver)
}

/// Reinstall [`DefaultResolver`], returning the previous resolver
pub fn reset_current() -> Arc<dyn ContractResolver> {
    set_current(Arc::new(DefaultResolver))
}

/// Construct through the current resolver
pub fn create_object(shape: &TypeShape, args: &[Value]) -> Result<Option<Object>> {
    current().create_object(shape, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvmap_core::{Mapped, ScalarKind};

    struct Point;
    struct Segment;

    impl Mapped for Point {
        fn shape() -> TypeShape {
            TypeShape::concrete("Point")
                .scalar("X", ScalarKind::Int)
                .scalar("Y", ScalarKind::Int)
        }
    }

    impl Mapped for Segment {
        fn shape() -> TypeShape {
            TypeShape::concrete("Segment")
                .reference::<Point>("Start")
                .parameter::<Point>("start")
                .parameter::<Point>("end")
        }
    }

    #[test]
    fn test_default_creates_empty_object() {
        let object = DefaultResolver.create(&Point::shape(), &[]).unwrap();
        assert_eq!(object.type_name(), "Point");
        assert!(object.is_empty());
    }

    #[test]
    fn test_default_assigns_arguments() {
        let start = Object::new("Point").with("X", 1i64);
        let end = Object::new("Point").with("X", 2i64);
        let object = DefaultResolver
            .create(&Segment::shape(), &[start.clone().into(), end.clone().into()])
            .unwrap();
        assert_eq!(object.get("Start"), Some(&Value::Object(start)));
        assert_eq!(object.get("end"), Some(&Value::Object(end)));
    }

    #[test]
    fn test_default_rejects_wrong_arity() {
        let err = DefaultResolver.create(&Segment::shape(), &[]).unwrap_err();
        assert!(err.is_construction_failure());
    }

    #[test]
    fn test_default_rejects_abstract() {
        let err = DefaultResolver
            .create(&TypeShape::interface("IPoint"), &[])
            .unwrap_err();
        assert!(err.is_construction_failure());
    }

    #[test]
    fn test_can_create_false_yields_none() {
        let resolver = FnResolver::new(|shape, _| Ok(Object::new(shape.name())))
            .with_can_create(|shape| !shape.is_abstract());
        assert!(resolver
            .create_object(&TypeShape::interface("IPoint"), &[])
            .unwrap()
            .is_none());
        assert!(resolver
            .create_object(&Point::shape(), &[])
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_fn_resolver_debug_and_label() {
        let resolver = FnResolver::new(|shape, _| Ok(Object::new(shape.name()))).with_label("points");
        assert_eq!(resolver.name(), "points");
        assert!(format!("{:?}", resolver).contains("points"));
    }
}
