//! Class maps
//!
//! A class map is the complete binding description for one target type: an
//! ordered list of property maps, an ordered list of property reference maps
//! and an ordered list of constructor parameter reference maps.
//!
//! [`ClassMap<T>`] is the typed surface used by callers. It wraps a
//! [`RawClassMap`], the type-erased form that reference maps own for their
//! nested types and that the registry and the engine work with.
//!
//! ## Multi-level paths
//!
//! Mapping `B.C.CId` on a map for `A` is the same as mapping `CId` on the
//! nested map of the reference `C` inside the nested map of the reference
//! `B`. Missing intermediate reference maps are created on the way, so
//! declarations through the same reference always merge into one nested map.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use csvmap_core::{
    same_target, ConfigurationError, MappingConfig, Mapped, MemberPath, PropertyKind,
    PropertyShape, Result, ScalarKind, ShapeRef, TypeShape,
};
use tracing::debug;

use crate::builder::{ClassMapBuilder, MapStage};
use crate::layout::FieldLayout;
use crate::member::{FieldValue, Member, Param};
use crate::property_map::PropertyMap;
use crate::reference_map::{ParameterReferenceMap, PropertyReferenceMap};

// =============================================================================
// RawClassMap
// =============================================================================

/// Type-erased class map
#[derive(Debug, Clone)]
pub struct RawClassMap {
    shape: TypeShape,
    type_id: Option<TypeId>,
    property_maps: Vec<PropertyMap>,
    reference_maps: Vec<PropertyReferenceMap>,
    parameter_maps: Vec<ParameterReferenceMap>,
}

impl RawClassMap {
    /// Empty map for `shape`, not tied to a Rust type
    pub fn new(shape: TypeShape) -> Self {
        RawClassMap {
            shape,
            type_id: None,
            property_maps: Vec::new(),
            reference_maps: Vec::new(),
            parameter_maps: Vec::new(),
        }
    }

    /// Empty map for `T`
    pub fn of<T: Mapped>() -> Self {
        Self::linked(ShapeRef::of::<T>())
    }

    fn linked(target: ShapeRef) -> Self {
        RawClassMap {
            type_id: target.type_id(),
            ..RawClassMap::new(target.resolve())
        }
    }

    /// Shape of the target type
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    /// Rust type the map was declared for, if known
    pub fn target_type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Name of the target type
    pub fn type_name(&self) -> &str {
        self.shape.name()
    }

    /// Direct property maps in declaration order
    pub fn property_maps(&self) -> &[PropertyMap] {
        &self.property_maps
    }

    /// Property reference maps in declaration order
    pub fn reference_maps(&self) -> &[PropertyReferenceMap] {
        &self.reference_maps
    }

    /// Parameter reference maps in declaration order
    pub fn parameter_maps(&self) -> &[ParameterReferenceMap] {
        &self.parameter_maps
    }

    /// True when nothing at all is mapped
    pub fn is_empty(&self) -> bool {
        self.property_maps.is_empty()
            && self.reference_maps.is_empty()
            && self.parameter_maps.is_empty()
    }

    /// Highest explicit field index anywhere in the tree
    ///
    /// `None` means no binding has an explicit index and every field must be
    /// resolved by name.
    pub fn max_index(&self) -> Option<usize> {
        let direct = self.property_maps.iter().filter_map(PropertyMap::index);
        let references = self
            .reference_maps
            .iter()
            .filter_map(PropertyReferenceMap::max_index);
        let parameters = self
            .parameter_maps
            .iter()
            .filter_map(ParameterReferenceMap::max_index);
        direct.chain(references).chain(parameters).max()
    }

    /// Flatten into a [`FieldLayout`] with the default prefix separator
    pub fn layout(&self) -> FieldLayout<'_> {
        FieldLayout::new(self)
    }

    /// Flatten into a [`FieldLayout`] for `config`
    pub fn layout_with(&self, config: &MappingConfig) -> FieldLayout<'_> {
        FieldLayout::with_config(self, config)
    }

    // -------------------------------------------------------------------------
    // Declaration
    // -------------------------------------------------------------------------

    /// Return or create the property map for `path`
    ///
    /// With `use_existing_map` an existing map for the same path is returned
    /// unchanged; otherwise any existing map is dropped and a fresh one is
    /// appended. `kind` is the declared scalar type, `None` for untyped
    /// members.
    pub fn map_path(
        &mut self,
        path: &MemberPath,
        kind: Option<ScalarKind>,
        use_existing_map: bool,
    ) -> Result<&mut PropertyMap> {
        let (head, rest) = path.split_first().ok_or(ConfigurationError::EmptyPath)?;
        let property = self.property_shape(head.name())?;

        if !rest.is_empty() {
            return self
                .nested_for(&property)?
                .map_path(&rest, kind, use_existing_map);
        }

        self.check_kind(&property, kind)?;
        if self.reference_position(&property.name).is_some() {
            return Err(ConfigurationError::ReferenceCollision {
                path: property.name.clone(),
            }
            .into());
        }

        let position = match self.property_position(&property.name) {
            Some(i) if use_existing_map => i,
            existing => {
                if let Some(i) = existing {
                    self.property_maps.remove(i);
                }
                self.property_maps
                    .push(PropertyMap::new(property.name.clone(), kind));
                self.property_maps.len() - 1
            }
        };
        Ok(&mut self.property_maps[position])
    }

    /// Bind the reference member at `path` to `nested`
    ///
    /// A later declaration for the same member replaces the nested map and
    /// keeps any prefix already set.
    pub fn references_path(
        &mut self,
        path: &MemberPath,
        nested: RawClassMap,
    ) -> Result<&mut PropertyReferenceMap> {
        let (head, rest) = path.split_first().ok_or(ConfigurationError::EmptyPath)?;
        let property = self.property_shape(head.name())?;

        if !rest.is_empty() {
            return self.nested_for(&property)?.references_path(&rest, nested);
        }

        let target = self.reference_target(&property)?;
        if !nested.is_target_of(&target) {
            return Err(ConfigurationError::TypeMismatch {
                type_name: self.type_name().to_string(),
                member: property.name.clone(),
                expected: nested.type_name().to_string(),
                found: property.kind.describe(),
            }
            .into());
        }
        if self.property_position(&property.name).is_some() {
            return Err(ConfigurationError::ReferenceCollision {
                path: property.name.clone(),
            }
            .into());
        }

        let position = match self.reference_position(&property.name) {
            Some(i) => {
                self.reference_maps[i].replace_map(nested);
                i
            }
            None => {
                self.reference_maps
                    .push(PropertyReferenceMap::new(property.name.clone(), nested));
                self.reference_maps.len() - 1
            }
        };
        Ok(&mut self.reference_maps[position])
    }

    /// Bind the constructor parameter `parameter` to `nested`
    pub fn parameter_references(
        &mut self,
        parameter: &str,
        nested: RawClassMap,
    ) -> Result<&mut ParameterReferenceMap> {
        let shape = self
            .shape
            .parameter_named(parameter)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownParameter {
                type_name: self.type_name().to_string(),
                parameter: parameter.to_string(),
            })?;

        if !nested.is_target_of(&shape.shape) {
            return Err(ConfigurationError::TypeMismatch {
                type_name: self.type_name().to_string(),
                member: parameter.to_string(),
                expected: nested.type_name().to_string(),
                found: format!("reference to {}", shape.shape.resolve().name()),
            }
            .into());
        }

        let existing = self
            .parameter_maps
            .iter()
            .position(|p| p.parameter().name == parameter);
        let position = match existing {
            Some(i) => {
                self.parameter_maps[i].replace_map(nested);
                i
            }
            None => {
                self.parameter_maps
                    .push(ParameterReferenceMap::new(shape, nested));
                self.parameter_maps.len() - 1
            }
        };
        Ok(&mut self.parameter_maps[position])
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Property map declared for `path`, following reference maps
    pub fn property_map(&self, path: &MemberPath) -> Option<&PropertyMap> {
        let (head, rest) = path.split_first()?;
        if rest.is_empty() {
            self.property_maps.iter().find(|pm| pm.member() == head.name())
        } else {
            self.reference_map(&MemberPath::single(head.name()))?
                .map()
                .property_map(&rest)
        }
    }

    /// Mutable variant of [`RawClassMap::property_map`]
    pub fn property_map_mut(&mut self, path: &MemberPath) -> Option<&mut PropertyMap> {
        let (head, rest) = path.split_first()?;
        if rest.is_empty() {
            self.property_maps
                .iter_mut()
                .find(|pm| pm.member() == head.name())
        } else {
            self.reference_maps
                .iter_mut()
                .find(|rm| rm.member() == head.name())?
                .map_mut()
                .property_map_mut(&rest)
        }
    }

    /// Reference map declared for `path`, following reference maps
    pub fn reference_map(&self, path: &MemberPath) -> Option<&PropertyReferenceMap> {
        let (head, rest) = path.split_first()?;
        let direct = self
            .reference_maps
            .iter()
            .find(|rm| rm.member() == head.name())?;
        if rest.is_empty() {
            Some(direct)
        } else {
            direct.map().reference_map(&rest)
        }
    }

    /// Mutable variant of [`RawClassMap::reference_map`]
    pub fn reference_map_mut(&mut self, path: &MemberPath) -> Option<&mut PropertyReferenceMap> {
        let (head, rest) = path.split_first()?;
        let direct = self
            .reference_maps
            .iter_mut()
            .find(|rm| rm.member() == head.name())?;
        if rest.is_empty() {
            Some(direct)
        } else {
            direct.map_mut().reference_map_mut(&rest)
        }
    }

    /// Parameter reference map for the constructor parameter `name`
    pub fn parameter_map(&self, name: &str) -> Option<&ParameterReferenceMap> {
        self.parameter_maps
            .iter()
            .find(|p| p.parameter().name == name)
    }

    // -------------------------------------------------------------------------
    // Convention mapping
    // -------------------------------------------------------------------------

    /// Map every member of `shape` by convention
    ///
    /// Scalars are mapped by property name. References and constructor
    /// parameters get recursively auto-mapped nested maps. A type is never
    /// re-entered while it is already on the current path, and recursion
    /// stops at `max_reference_depth`.
    pub fn auto_map(shape: TypeShape, config: &MappingConfig) -> Result<Self> {
        Self::auto_map_from(RawClassMap::new(shape), config)
    }

    /// [`RawClassMap::auto_map`] for the Rust type `T`
    pub fn auto_map_of<T: Mapped>(config: &MappingConfig) -> Result<Self> {
        Self::auto_map_from(RawClassMap::of::<T>(), config)
    }

    fn auto_map_from(root: RawClassMap, config: &MappingConfig) -> Result<Self> {
        config.validate()?;
        let mut ancestors = Vec::new();
        let map = Self::auto_map_inner(root, config, &mut ancestors);
        debug!(type_name = map.type_name(), "Auto-mapped class map");
        Ok(map)
    }

    fn auto_map_inner(
        mut map: RawClassMap,
        config: &MappingConfig,
        ancestors: &mut Vec<String>,
    ) -> Self {
        let shape = map.shape.clone();
        ancestors.push(shape.name().to_string());

        let enterable = |nested: &TypeShape, ancestors: &Vec<String>| {
            ancestors.len() < config.max_reference_depth
                && !ancestors.iter().any(|a| a == nested.name())
        };

        for parameter in shape.constructor() {
            let nested = RawClassMap::linked(parameter.shape);
            if !enterable(&nested.shape, ancestors) {
                debug!(parameter = %parameter.name, "Skipping recursive constructor parameter");
                continue;
            }
            let nested = Self::auto_map_inner(nested, config, ancestors);
            let mut pm = ParameterReferenceMap::new(parameter.clone(), nested);
            if config.prefix_reference_headers {
                pm.set_prefix(None);
            }
            map.parameter_maps.push(pm);
        }

        for property in shape.properties() {
            match &property.kind {
                PropertyKind::Scalar(kind) => {
                    map.property_maps
                        .push(PropertyMap::new(property.name.clone(), Some(*kind)));
                }
                PropertyKind::Reference(target) => {
                    let filled_by_constructor = shape
                        .constructor()
                        .iter()
                        .any(|p| p.name.eq_ignore_ascii_case(&property.name));
                    if filled_by_constructor {
                        continue;
                    }
                    let nested = RawClassMap::linked(*target);
                    if !enterable(&nested.shape, ancestors) {
                        debug!(member = %property.name, "Skipping recursive reference");
                        continue;
                    }
                    let nested = Self::auto_map_inner(nested, config, ancestors);
                    let mut rm = PropertyReferenceMap::new(property.name.clone(), nested);
                    if config.prefix_reference_headers {
                        rm.set_prefix(None);
                    }
                    map.reference_maps.push(rm);
                }
            }
        }

        ancestors.pop();
        map
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn property_shape(&self, name: &str) -> Result<PropertyShape> {
        self.shape.property(name).cloned().ok_or_else(|| {
            ConfigurationError::UnknownMember {
                type_name: self.type_name().to_string(),
                member: name.to_string(),
            }
            .into()
        })
    }

    fn property_position(&self, name: &str) -> Option<usize> {
        self.property_maps.iter().position(|pm| pm.member() == name)
    }

    fn reference_position(&self, name: &str) -> Option<usize> {
        self.reference_maps.iter().position(|rm| rm.member() == name)
    }

    fn reference_target(&self, property: &PropertyShape) -> Result<ShapeRef> {
        match &property.kind {
            PropertyKind::Reference(target) => Ok(*target),
            PropertyKind::Scalar(_) => Err(ConfigurationError::NotAReference {
                type_name: self.type_name().to_string(),
                member: property.name.clone(),
            }
            .into()),
        }
    }

    fn is_target_of(&self, target: &ShapeRef) -> bool {
        same_target(
            self.type_id,
            self.type_name(),
            target.type_id(),
            target.resolve().name(),
        )
    }

    fn check_kind(&self, property: &PropertyShape, kind: Option<ScalarKind>) -> Result<()> {
        let Some(expected) = kind else {
            return Ok(());
        };
        match &property.kind {
            PropertyKind::Scalar(found) if *found == expected => Ok(()),
            found => Err(ConfigurationError::TypeMismatch {
                type_name: self.type_name().to_string(),
                member: property.name.clone(),
                expected: expected.to_string(),
                found: found.describe(),
            }
            .into()),
        }
    }

    /// Nested map behind the reference `property`, created on demand
    fn nested_for(&mut self, property: &PropertyShape) -> Result<&mut RawClassMap> {
        let target = self.reference_target(property)?;
        if self.property_position(&property.name).is_some() {
            return Err(ConfigurationError::ReferenceCollision {
                path: property.name.clone(),
            }
            .into());
        }
        let position = match self.reference_position(&property.name) {
            Some(i) => i,
            None => {
                self.reference_maps.push(PropertyReferenceMap::new(
                    property.name.clone(),
                    RawClassMap::linked(target),
                ));
                self.reference_maps.len() - 1
            }
        };
        Ok(self.reference_maps[position].map_mut())
    }
}

// =============================================================================
// ClassMap<T>
// =============================================================================

/// Typed class map for `T`
///
/// Read access to the underlying [`RawClassMap`] is available through
/// `Deref`; all mutation goes through typed selectors.
pub struct ClassMap<T> {
    pub(crate) raw: RawClassMap,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Mapped> ClassMap<T> {
    /// Empty class map for `T`
    pub fn new() -> Self {
        ClassMap {
            raw: RawClassMap::of::<T>(),
            _marker: PhantomData,
        }
    }

    /// Start a type-state builder
    pub fn builder() -> ClassMapBuilder<T, MapStage> {
        ClassMapBuilder::new()
    }

    /// Convention-based map for `T`, see [`RawClassMap::auto_map`]
    pub fn auto_map(config: &MappingConfig) -> Result<Self> {
        Ok(ClassMap {
            raw: RawClassMap::auto_map_of::<T>(config)?,
            _marker: PhantomData,
        })
    }

    /// Return or create the property map for `member`
    ///
    /// Re-declaring the same member returns the existing map unchanged.
    pub fn map<P: FieldValue>(&mut self, member: &Member<T, P>) -> Result<&mut PropertyMap> {
        self.map_with(member, true)
    }

    /// [`ClassMap::map`] with explicit control over reuse
    ///
    /// With `use_existing_map == false` any existing map for the member is
    /// replaced by a fresh one.
    pub fn map_with<P: FieldValue>(
        &mut self,
        member: &Member<T, P>,
        use_existing_map: bool,
    ) -> Result<&mut PropertyMap> {
        self.raw.map_path(member.path(), P::kind(), use_existing_map)
    }

    /// Map `member` to the nested class map `nested`
    pub fn references<U: Mapped>(
        &mut self,
        member: &Member<T, U>,
        nested: ClassMap<U>,
    ) -> Result<&mut PropertyReferenceMap> {
        self.raw.references_path(member.path(), nested.raw)
    }

    /// Map `member` to the class map produced by the definition `D`
    pub fn references_to<D: MapDefinition>(
        &mut self,
        member: &Member<T, D::Target>,
    ) -> Result<&mut PropertyReferenceMap> {
        self.references(member, D::define()?)
    }

    /// Map the constructor parameter `param` to `nested`
    pub fn parameter_references<U: Mapped>(
        &mut self,
        param: &Param<T, U>,
        nested: ClassMap<U>,
    ) -> Result<&mut ParameterReferenceMap> {
        self.raw.parameter_references(param.name(), nested.raw)
    }

    /// Property map for `member`, if declared
    pub fn property_map_for<P>(&self, member: &Member<T, P>) -> Option<&PropertyMap> {
        self.raw.property_map(member.path())
    }

    /// Reference map for `member`, if declared
    pub fn reference_map_for<U>(&self, member: &Member<T, U>) -> Option<&PropertyReferenceMap> {
        self.raw.reference_map(member.path())
    }

    /// Mutable reference map for `member`, e.g. to set a prefix later
    pub fn reference_map_for_mut<U>(
        &mut self,
        member: &Member<T, U>,
    ) -> Option<&mut PropertyReferenceMap> {
        self.raw.reference_map_mut(member.path())
    }

    /// Borrow the erased form
    pub fn as_raw(&self) -> &RawClassMap {
        &self.raw
    }

    /// Convert into the erased form
    pub fn into_raw(self) -> RawClassMap {
        self.raw
    }
}

impl<T: Mapped> Default for ClassMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ClassMap<T> {
    fn clone(&self) -> Self {
        ClassMap {
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ClassMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassMap").field(&self.raw).finish()
    }
}

impl<T> Deref for ClassMap<T> {
    type Target = RawClassMap;

    fn deref(&self) -> &RawClassMap {
        &self.raw
    }
}

/// A reusable class map declaration for one target type
///
/// ```
/// use csvmap_core::{Mapped, Result, ScalarKind, TypeShape};
/// use csvmap_mapping::{ClassMap, MapDefinition, Member};
///
/// struct Customer;
/// impl Mapped for Customer {
///     fn shape() -> TypeShape {
///         TypeShape::concrete("Customer").scalar("Id", ScalarKind::Int)
///     }
/// }
///
/// struct CustomerMap;
/// impl MapDefinition for CustomerMap {
///     type Target = Customer;
///
///     fn define() -> Result<ClassMap<Customer>> {
///         ClassMap::builder()
///             .map(Member::<Customer, i64>::new("Id"))
///             .index(0)
///             .build()
///     }
/// }
///
/// assert_eq!(CustomerMap::define().unwrap().max_index(), Some(0));
/// ```
pub trait MapDefinition {
    /// The mapped type
    type Target: Mapped;

    /// Build the class map
    fn define() -> Result<ClassMap<Self::Target>>;
}
