//! Core types and traits for csvmap
//!
//! This crate defines the foundational types used throughout the workspace:
//! - Error: Error type hierarchy (configuration, construction, field errors)
//! - Value / Object: Dynamic property values and constructed instances
//! - MemberPath: Path from a type to a (possibly nested) member
//! - TypeShape / Mapped: Explicit type descriptions standing in for reflection
//! - ReaderRow / RecordSink: Boundary to the record reader and writer
//! - TypeConverter: Boundary to the type-conversion library
//! - MappingConfig: TOML-backed settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod convert;
pub mod error;
pub mod path;
pub mod record;
pub mod shape;
pub mod value;

// Re-export commonly used types and traits
pub use config::{MappingConfig, DEFAULT_PREFIX_SEPARATOR};
pub use convert::{DefaultConverter, TypeConverter};
pub use error::{ConfigurationError, Error, Result};
pub use path::{MemberPath, PathSegment};
pub use record::{HeaderRecord, ReaderRow, RecordBuffer, RecordSink, RowContext, StringRecord};
pub use shape::{
    same_target, Mapped, ParameterShape, PropertyKind, PropertyShape, ScalarKind, ShapeRef,
    TypeKind, TypeShape,
};
pub use value::{Object, Value};
