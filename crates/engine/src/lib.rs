//! Record engine for csvmap
//!
//! This crate puts class maps to work:
//! - ContractResolver: pluggable construction of target instances
//! - Process-wide current resolver with explicit get/set
//! - Materializer: one record into one object
//! - RecordWriter: one object into one record
//! - RecordMapper: registry, converter and resolver for a read/write session

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mapper;
pub mod materialize;
pub mod resolver;
pub mod writer;

pub use mapper::RecordMapper;
pub use materialize::Materializer;
pub use resolver::{
    create_object, current, reset_current, set_current, CanCreateFn, ContractResolver,
    CreateFn, DefaultResolver, FnResolver,
};
pub use writer::RecordWriter;
