//! Mapping declarations for csvmap
//!
//! This crate holds the data model that describes how record fields bind to
//! the properties of a target type:
//! - PropertyMap: one scalar property bound to one field locator
//! - PropertyReferenceMap / ParameterReferenceMap: nested objects with their own class map
//! - ClassMap: the complete description for one target type
//! - ClassMapBuilder: type-state fluent construction of a class map
//! - FieldLayout: flat arena view of a class map tree
//! - ClassMapRegistry: maps keyed by target type, shared by sessions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod class_map;
pub mod layout;
pub mod member;
pub mod property_map;
pub mod reference_map;
pub mod registry;

pub use builder::{
    BuilderStage, ClassMapBuilder, HasDefault, HasName, HasTypeConverter, IndexOptions,
    MapOptions, MapStage, NameIndexOptions, NameOptions, PropertyStage, Stage,
    TypeConverterOptions,
};
pub use class_map::{ClassMap, MapDefinition, RawClassMap};
pub use layout::{FieldBinding, FieldCollision, FieldLayout, LayoutNode, NodeId, NodeOrigin};
pub use member::{FieldValue, Member, Param};
pub use property_map::{DefaultValue, PropertyMap, ReadFn, WriteFn};
pub use reference_map::{HeaderPrefix, ParameterReferenceMap, PropertyReferenceMap};
pub use registry::ClassMapRegistry;
