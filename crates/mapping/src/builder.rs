//! Type-state class map builder
//!
//! The builder moves through a small set of stages. Each stage is a marker
//! type, and the methods available on [`ClassMapBuilder`] depend on the
//! marker, so a call that is not legal after the previous one does not
//! compile:
//!
//! | stage | operations |
//! |-------|-----------|
//! | [`MapStage`] | `map`, `references`, `build` |
//! | [`MapOptions`] | `type_converter`, `index`, `name`, `convert_using`, `write_using`, `default`, `constant`, `ignore` |
//! | [`TypeConverterOptions`] | `default` |
//! | [`IndexOptions`] | `type_converter`, `name`, `default` |
//! | [`NameOptions`] | `type_converter`, `name_index`, `default` |
//! | [`NameIndexOptions`] | `type_converter`, `default` |
//!
//! `map`, `references` and `build` are available from every stage. Every
//! option call configures the property map created by the most recent
//! `map`; only `map` creates a new one.
//!
//! Declaration errors (unknown member, type mismatch, reference collision)
//! are held until [`ClassMapBuilder::build`], which returns the first one.
//!
//! ```
//! use csvmap_core::{Mapped, ScalarKind, TypeShape};
//! use csvmap_mapping::{ClassMap, Member};
//!
//! struct Order;
//! impl Mapped for Order {
//!     fn shape() -> TypeShape {
//!         TypeShape::concrete("Order")
//!             .scalar("Id", ScalarKind::Int)
//!             .scalar("Note", ScalarKind::String)
//!     }
//! }
//!
//! let map = ClassMap::<Order>::builder()
//!     .map(Member::<Order, i64>::new("Id"))
//!     .index(0)
//!     .name(["OrderId"])
//!     .name_index(1)
//!     .map(Member::<Order, String>::new("Note"))
//!     .default("n/a".to_string())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(map.max_index(), Some(0));
//! ```
//!
//! An index cannot follow a type converter:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use csvmap_core::{DefaultConverter, Mapped, ScalarKind, TypeShape};
//! use csvmap_mapping::{ClassMap, Member};
//!
//! struct Order;
//! impl Mapped for Order {
//!     fn shape() -> TypeShape {
//!         TypeShape::concrete("Order").scalar("Id", ScalarKind::Int)
//!     }
//! }
//!
//! let _ = ClassMap::<Order>::builder()
//!     .map(Member::<Order, i64>::new("Id"))
//!     .type_converter(Arc::new(DefaultConverter))
//!     .index(0);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use csvmap_core::{
    Error, Mapped, MemberPath, Object, ReaderRow, Result, TypeConverter, Value,
};
use tracing::debug;

use crate::class_map::ClassMap;
use crate::member::{FieldValue, Member, Param};
use crate::property_map::PropertyMap;

// =============================================================================
// Stages
// =============================================================================

/// Runtime name of a builder stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Entry stage; also reached after a terminal option
    Map,
    /// Right after `map`
    MapOptions,
    /// After `type_converter`
    TypeConverterOptions,
    /// After `index`
    IndexOptions,
    /// After `name`
    NameOptions,
    /// After `name_index`
    NameIndexOptions,
}

impl Stage {
    /// Whether a single builder call can move from `self` to `next`
    pub fn can_transition_to(self, next: Stage) -> bool {
        match (self, next) {
            (_, Stage::Map) | (_, Stage::MapOptions) => true,
            (
                Stage::MapOptions,
                Stage::TypeConverterOptions | Stage::IndexOptions | Stage::NameOptions,
            ) => true,
            (Stage::IndexOptions, Stage::TypeConverterOptions | Stage::NameOptions) => true,
            (Stage::NameOptions, Stage::TypeConverterOptions | Stage::NameIndexOptions) => true,
            (Stage::NameIndexOptions, Stage::TypeConverterOptions) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Marker types for builder stages
pub trait BuilderStage: sealed::Sealed {
    /// Runtime name of the stage
    const STAGE: Stage;
}

/// A stage positioned on a property map whose value type is known
pub trait PropertyStage: BuilderStage {
    /// Value type of the selected member
    type Property: FieldValue;
}

/// Stages from which `type_converter` is callable
pub trait HasTypeConverter: PropertyStage {}

/// Stages from which `name` is callable
pub trait HasName: PropertyStage {}

/// Stages from which `default` is callable
pub trait HasDefault: PropertyStage {}

/// Entry stage
#[derive(Debug)]
pub struct MapStage;

macro_rules! property_stages {
    ($($(#[$doc:meta])* $name:ident => $stage:ident;)*) => {
        $(
            $(#[$doc])*
            pub struct $name<P>(PhantomData<fn() -> P>);

            impl<P> fmt::Debug for $name<P> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(stringify!($name))
                }
            }

            impl<P> sealed::Sealed for $name<P> {}

            impl<P> BuilderStage for $name<P> {
                const STAGE: Stage = Stage::$stage;
            }

            impl<P: FieldValue> PropertyStage for $name<P> {
                type Property = P;
            }

            impl<P: FieldValue> HasDefault for $name<P> {}
        )*
    };
}

property_stages! {
    /// After `map`
    MapOptions => MapOptions;
    /// After `type_converter`
    TypeConverterOptions => TypeConverterOptions;
    /// After `index`
    IndexOptions => IndexOptions;
    /// After `name`
    NameOptions => NameOptions;
    /// After `name_index`
    NameIndexOptions => NameIndexOptions;
}

impl sealed::Sealed for MapStage {}

impl BuilderStage for MapStage {
    const STAGE: Stage = Stage::Map;
}

impl<P: FieldValue> HasTypeConverter for MapOptions<P> {}
impl<P: FieldValue> HasTypeConverter for IndexOptions<P> {}
impl<P: FieldValue> HasTypeConverter for NameOptions<P> {}
impl<P: FieldValue> HasTypeConverter for NameIndexOptions<P> {}

impl<P: FieldValue> HasName for MapOptions<P> {}
impl<P: FieldValue> HasName for IndexOptions<P> {}

// =============================================================================
// Builder
// =============================================================================

/// Fluent, type-state construction of a [`ClassMap`]
pub struct ClassMapBuilder<T, S = MapStage> {
    map: ClassMap<T>,
    current: Option<MemberPath>,
    error: Option<Error>,
    _stage: PhantomData<S>,
}

impl<T: Mapped> ClassMapBuilder<T, MapStage> {
    /// Start with an empty class map
    pub fn new() -> Self {
        Self::from_map(ClassMap::new())
    }

    /// Continue configuring an existing class map
    pub fn from_map(map: ClassMap<T>) -> Self {
        ClassMapBuilder {
            map,
            current: None,
            error: None,
            _stage: PhantomData,
        }
    }
}

impl<T, S> ClassMapBuilder<T, S>
where
    T: Mapped,
    S: BuilderStage,
{
    fn transition<N: BuilderStage>(self) -> ClassMapBuilder<T, N> {
        debug_assert!(
            S::STAGE.can_transition_to(N::STAGE),
            "illegal builder transition {} -> {}",
            S::STAGE,
            N::STAGE
        );
        ClassMapBuilder {
            map: self.map,
            current: self.current,
            error: self.error,
            _stage: PhantomData,
        }
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self.current = None;
    }

    fn configure(mut self, f: impl FnOnce(&mut PropertyMap)) -> Self {
        if let Some(path) = &self.current {
            if let Some(property) = self.map.raw.property_map_mut(path) {
                f(property);
            }
        }
        self
    }

    /// Current stage
    pub fn stage(&self) -> Stage {
        S::STAGE
    }

    /// Select `member` for configuration, reusing an existing map for it
    pub fn map<P: FieldValue>(self, member: Member<T, P>) -> ClassMapBuilder<T, MapOptions<P>> {
        self.map_with(member, true)
    }

    /// Select `member`, replacing any existing map unless `use_existing_map`
    pub fn map_with<P: FieldValue>(
        mut self,
        member: Member<T, P>,
        use_existing_map: bool,
    ) -> ClassMapBuilder<T, MapOptions<P>> {
        if self.error.is_none() {
            let declared = self.map.map_with(&member, use_existing_map).map(|_| ());
            match declared {
                Ok(()) => self.current = Some(member.path().clone()),
                Err(e) => self.fail(e),
            }
        } else {
            self.current = None;
        }
        self.transition()
    }

    /// Map `member` to the nested class map `nested`
    pub fn references<U: Mapped>(
        self,
        member: Member<T, U>,
        nested: ClassMap<U>,
    ) -> ClassMapBuilder<T, MapStage> {
        self.reference_with(member, nested, None)
    }

    /// Map `member` to `nested` and prefix its header names
    ///
    /// `None` selects the default prefix, the member name followed by the
    /// `prefix_separator` of the configuration the map is read or written with.
    pub fn references_prefixed<U: Mapped>(
        self,
        member: Member<T, U>,
        nested: ClassMap<U>,
        prefix: Option<&str>,
    ) -> ClassMapBuilder<T, MapStage> {
        self.reference_with(member, nested, Some(prefix))
    }

    fn reference_with<U: Mapped>(
        mut self,
        member: Member<T, U>,
        nested: ClassMap<U>,
        prefix: Option<Option<&str>>,
    ) -> ClassMapBuilder<T, MapStage> {
        self.current = None;
        if self.error.is_none() {
            let declared = self.map.references(&member, nested).map(|reference| {
                if let Some(prefix) = prefix {
                    reference.set_prefix(prefix);
                }
            });
            if let Err(e) = declared {
                self.fail(e);
            }
        }
        self.transition()
    }

    /// Map the constructor parameter `param` to `nested`
    pub fn parameter_references<U: Mapped>(
        mut self,
        param: Param<T, U>,
        nested: ClassMap<U>,
    ) -> ClassMapBuilder<T, MapStage> {
        self.current = None;
        if self.error.is_none() {
            if let Some(e) = self.map.parameter_references(&param, nested).err() {
                self.fail(e);
            }
        }
        self.transition()
    }

    /// Finish, returning the first declaration error if any
    pub fn build(self) -> Result<ClassMap<T>> {
        match self.error {
            Some(error) => Err(error),
            None => {
                debug!(
                    type_name = self.map.type_name(),
                    properties = self.map.property_maps().len(),
                    references = self.map.reference_maps().len(),
                    "Built class map"
                );
                Ok(self.map)
            }
        }
    }
}

impl<T: Mapped, P: FieldValue> ClassMapBuilder<T, MapOptions<P>> {
    /// Read from / write to the field at `index`
    pub fn index(self, index: usize) -> ClassMapBuilder<T, IndexOptions<P>> {
        self.configure(|pm| {
            pm.set_index(index);
        })
        .transition()
    }

    /// Claim the fields `index..=index_end`
    ///
    /// Reads use the first field and writes emit one field, see
    /// [`PropertyMap::set_index_range`].
    pub fn index_range(
        self,
        index: usize,
        index_end: usize,
    ) -> ClassMapBuilder<T, IndexOptions<P>> {
        self.configure(|pm| {
            pm.set_index_range(index, index_end);
        })
        .transition()
    }

    /// Compute the value from the whole row
    pub fn convert_using<F>(self, convert: F) -> ClassMapBuilder<T, MapStage>
    where
        F: Fn(&dyn ReaderRow) -> Result<P> + Send + Sync + 'static,
    {
        self.configure(|pm| {
            pm.set_read_using(Arc::new(move |row: &dyn ReaderRow| {
                convert(row).map(Into::into)
            }));
        })
        .transition()
    }

    /// Compute the field text from the owning instance
    pub fn write_using<F>(self, write: F) -> ClassMapBuilder<T, MapStage>
    where
        F: Fn(&Object) -> String + Send + Sync + 'static,
    {
        self.configure(|pm| {
            pm.set_write_using(Arc::new(write));
        })
        .transition()
    }

    /// Use `value` for every record
    pub fn constant(self, value: P) -> ClassMapBuilder<T, MapStage> {
        self.configure(|pm| {
            pm.set_constant(value);
        })
        .transition()
    }

    /// Skip the member when reading and writing
    pub fn ignore(self) -> ClassMapBuilder<T, MapStage> {
        self.configure(|pm| {
            pm.set_ignore(true);
        })
        .transition()
    }
}

impl<T: Mapped, P: FieldValue> ClassMapBuilder<T, NameOptions<P>> {
    /// Use the `name_index`-th occurrence of a duplicated header name
    pub fn name_index(self, name_index: usize) -> ClassMapBuilder<T, NameIndexOptions<P>> {
        self.configure(|pm| {
            pm.set_name_index(name_index);
        })
        .transition()
    }
}

impl<T: Mapped, S: HasTypeConverter> ClassMapBuilder<T, S> {
    /// Convert this member with `converter` instead of the ambient one
    pub fn type_converter(
        self,
        converter: Arc<dyn TypeConverter>,
    ) -> ClassMapBuilder<T, TypeConverterOptions<S::Property>> {
        self.configure(|pm| {
            pm.set_type_converter(converter);
        })
        .transition()
    }

    /// [`ClassMapBuilder::type_converter`] with a default-constructed `C`
    pub fn type_converter_of<C>(self) -> ClassMapBuilder<T, TypeConverterOptions<S::Property>>
    where
        C: TypeConverter + Default + 'static,
    {
        self.type_converter(Arc::new(C::default()))
    }
}

impl<T: Mapped, S: HasName> ClassMapBuilder<T, S> {
    /// Candidate header names, tried in order
    pub fn name<I, N>(self, names: I) -> ClassMapBuilder<T, NameOptions<S::Property>>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.configure(|pm| {
            pm.set_names(names);
        })
        .transition()
    }
}

impl<T: Mapped, S: HasDefault> ClassMapBuilder<T, S> {
    /// Value used when the field is empty or missing
    pub fn default(self, value: S::Property) -> ClassMapBuilder<T, MapStage> {
        let value: Value = value.into();
        self.configure(|pm| {
            pm.set_default(value);
        })
        .transition()
    }

    /// Default given as field text, converted like field text
    pub fn default_text(self, text: impl Into<String>) -> ClassMapBuilder<T, MapStage> {
        let text = text.into();
        self.configure(|pm| {
            pm.set_default_text(text);
        })
        .transition()
    }
}

impl<T, S: BuilderStage> fmt::Debug for ClassMapBuilder<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMapBuilder")
            .field("stage", &S::STAGE)
            .field("map", &self.map)
            .field("current", &self.current)
            .field("error", &self.error)
            .finish()
    }
}
