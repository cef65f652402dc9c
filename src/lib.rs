//! csvmap - declarative mapping between flat records and object graphs
//!
//! A class map describes, for one target type, which record field feeds
//! which property: by index, by name, by a closure, by a constant, or by
//! delegating a nested object to its own class map. A contract resolver
//! decides how instances are constructed, which is what makes interface-typed
//! members mappable.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use csvmap::{
//!     ClassMap, HeaderRecord, Mapped, Member, RecordMapper, ScalarKind, StringRecord,
//!     TypeShape, Value,
//! };
//!
//! struct Order;
//! struct Customer;
//!
//! impl Mapped for Order {
//!     fn shape() -> TypeShape {
//!         TypeShape::concrete("Order")
//!             .scalar("Id", ScalarKind::Int)
//!             .reference::<Customer>("Customer")
//!     }
//! }
//!
//! impl Mapped for Customer {
//!     fn shape() -> TypeShape {
//!         TypeShape::concrete("Customer").scalar("Name", ScalarKind::String)
//!     }
//! }
//!
//! let customer = ClassMap::<Customer>::builder()
//!     .map(Member::<Customer, String>::new("Name"))
//!     .build()?;
//! let order = ClassMap::<Order>::builder()
//!     .map(Member::<Order, i64>::new("Id"))
//!     .index(0)
//!     .references_prefixed(Member::new("Customer"), customer, None)
//!     .build()?;
//!
//! let mapper = RecordMapper::new();
//! mapper.register(order);
//!
//! let header = Arc::new(HeaderRecord::new(["Id", "Customer.Name"]));
//! let row = StringRecord::new(["7", "Ada"]).with_header(header);
//! let object = mapper.read::<Order>(&row)?;
//!
//! let name = object.get("Customer").and_then(Value::as_object).and_then(|c| c.get("Name"));
//! assert_eq!(name, Some(&Value::from("Ada")));
//! # Ok::<(), csvmap::Error>(())
//! ```
//!
//! # Crates
//!
//! - `csvmap-core`: errors, values, type shapes, record and converter interfaces, config
//! - `csvmap-mapping`: property, reference and class maps, the builder, layout, registry
//! - `csvmap-engine`: contract resolvers and the record mapper

pub use csvmap_core::*;
pub use csvmap_engine::*;
pub use csvmap_mapping::*;
