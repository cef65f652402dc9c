//! Record materialization
//!
//! Turns one record into one [`Object`] by walking the [`FieldLayout`] of a
//! class map. For every node, constructor arguments are materialized first,
//! then the contract resolver creates the instance, then the node's property
//! maps are read and finally every property reference map is materialized
//! and stored on the instance.
//!
//! A property map resolves its value in this order: constant, read closure,
//! field text located by index or by prefixed name, default value when the
//! text is empty or missing. Field text goes through the property's type
//! converter override, or the ambient converter otherwise.

use csvmap_core::{Error, MappingConfig, Object, ReaderRow, Result, TypeConverter, Value};
use csvmap_mapping::{DefaultValue, FieldBinding, FieldLayout, NodeId, NodeOrigin, RawClassMap};
use tracing::{debug, warn};

use crate::resolver::ContractResolver;

/// Reads records into objects for one class map
pub struct Materializer<'a> {
    layout: FieldLayout<'a>,
    resolver: &'a dyn ContractResolver,
    converter: &'a dyn TypeConverter,
    config: &'a MappingConfig,
}

impl<'a> Materializer<'a> {
    /// Prepare reading with `map`
    pub fn new(
        map: &'a RawClassMap,
        resolver: &'a dyn ContractResolver,
        converter: &'a dyn TypeConverter,
        config: &'a MappingConfig,
    ) -> Self {
        Materializer {
            layout: map.layout_with(config),
            resolver,
            converter,
            config,
        }
    }

    /// The layout being read
    pub fn layout(&self) -> &FieldLayout<'a> {
        &self.layout
    }

    /// Materialize the current record
    pub fn read(&self, row: &dyn ReaderRow) -> Result<Object> {
        let root = self.layout.node(self.layout.root());
        debug!(
            type_name = root.map().type_name(),
            row = row.context().row,
            "Materializing record"
        );
        self.read_node(self.layout.root(), row)
    }

    fn read_node(&self, id: NodeId, row: &dyn ReaderRow) -> Result<Object> {
        let node = self.layout.node(id);
        let shape = node.map().shape();

        let mut args = Vec::with_capacity(shape.constructor().len());
        for parameter in shape.constructor() {
            let child = node.children().iter().copied().find(|&c| {
                matches!(
                    self.layout.node(c).origin(),
                    NodeOrigin::Parameter(name) if *name == parameter.name
                )
            });
            let arg = match child {
                Some(child) => Value::Object(self.read_node(child, row)?),
                None => Value::Null,
            };
            args.push(arg);
        }

        let mut object = match self.resolver.create_object(shape, &args)? {
            Some(object) => object,
            None => {
                warn!(
                    type_name = shape.name(),
                    resolver = self.resolver.name(),
                    row = row.context().row,
                    "Contract resolver refused construction"
                );
                return Err(Error::construction(
                    shape.name(),
                    format!("contract resolver '{}' produced no instance", self.resolver.name()),
                ));
            }
        };

        for binding in self.layout.bindings_of(id) {
            if binding.property().is_ignored() {
                continue;
            }
            let value = self.read_binding(binding, row)?;
            object.set(binding.property().member(), value);
        }

        for &child in node.children() {
            if let NodeOrigin::Property(member) = self.layout.node(child).origin() {
                let nested = self.read_node(child, row)?;
                object.set(member.as_str(), nested);
            }
        }

        Ok(object)
    }

    fn read_binding(&self, binding: &FieldBinding<'_>, row: &dyn ReaderRow) -> Result<Value> {
        let property = binding.property();
        if let Some(constant) = property.constant() {
            return Ok(constant.clone());
        }
        if let Some(read) = property.read_using() {
            return read(row);
        }

        let context = row.context();
        let converter: &dyn TypeConverter = match property.type_converter() {
            Some(converter) => converter.as_ref(),
            None => self.converter,
        };
        let text = locate(binding, row);

        if let Some(text) = text.filter(|t| !t.is_empty()) {
            return converter.convert_from_string(text, property.kind(), context);
        }
        match property.default_value() {
            Some(DefaultValue::Value(value)) => return Ok(value.clone()),
            Some(DefaultValue::Text(text)) => {
                return converter.convert_from_string(text, property.kind(), context)
            }
            None => {}
        }
        match text {
            Some(empty) => converter.convert_from_string(empty, property.kind(), context),
            None if self.config.allow_missing_fields => Ok(Value::Null),
            None => Err(Error::MissingField {
                field: describe_locator(binding),
                row: context.row,
            }),
        }
    }
}

/// Field text for `binding`, by index if one is set, else by the first
/// candidate name present in the row
fn locate<'r>(binding: &FieldBinding<'_>, row: &'r dyn ReaderRow) -> Option<&'r str> {
    let property = binding.property();
    if let Some(index) = property.index() {
        return row.field(index);
    }
    binding
        .names()
        .iter()
        .find_map(|name| row.field_by_name(name, property.name_index()))
}

fn describe_locator(binding: &FieldBinding<'_>) -> String {
    match binding.property().index() {
        Some(index) => format!("#{}", index),
        None => binding.names().join("|"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{DefaultResolver, FnResolver};
    use csvmap_core::{DefaultConverter, HeaderRecord, Mapped, ScalarKind, StringRecord, TypeShape};
    use csvmap_mapping::{ClassMap, Member, Param};
    use std::sync::Arc;

    struct Person;
    struct Address;
    struct Trip;

    impl Mapped for Person {
        fn shape() -> TypeShape {
            TypeShape::concrete("Person")
                .scalar("Name", ScalarKind::String)
                .scalar("Age", ScalarKind::Int)
                .scalar("Vip", ScalarKind::Bool)
                .reference::<Address>("Home")
        }
    }

    impl Mapped for Address {
        fn shape() -> TypeShape {
            TypeShape::concrete("Address").scalar("City", ScalarKind::String)
        }
    }

    impl Mapped for Trip {
        fn shape() -> TypeShape {
            TypeShape::concrete("Trip")
                .scalar("Code", ScalarKind::String)
                .reference::<Address>("From")
                .parameter::<Address>("from")
        }
    }

    fn row(header: &[&str], fields: &[&str]) -> StringRecord {
        StringRecord::new(fields.iter().copied())
            .with_header(Arc::new(HeaderRecord::new(header.iter().copied())))
    }

    fn read(map: &RawClassMap, row: &StringRecord) -> Result<Object> {
        let config = MappingConfig::default();
        Materializer::new(map, &DefaultResolver, &DefaultConverter, &config).read(row)
    }

    fn person_map() -> ClassMap<Person> {
        ClassMap::<Person>::builder()
            .map(Member::<Person, String>::new("Name"))
            .map(Member::<Person, i64>::new("Age"))
            .map(Member::<Person, bool>::new("Vip"))
            .default(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_reads_by_name() {
        let map = person_map();
        let object = read(&map, &row(&["Age", "Name", "Vip"], &["41", "Ada", "true"])).unwrap();
        assert_eq!(object.type_name(), "Person");
        assert_eq!(object.get("Name"), Some(&Value::from("Ada")));
        assert_eq!(object.get("Age"), Some(&Value::Int(41)));
        assert_eq!(object.get("Vip"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_default_applies_to_empty_and_missing() {
        let map = person_map();
        let empty = read(&map, &row(&["Name", "Age", "Vip"], &["Ada", "1", ""])).unwrap();
        assert_eq!(empty.get("Vip"), Some(&Value::Bool(false)));
        let missing = read(&map, &row(&["Name", "Age"], &["Ada", "1"])).unwrap();
        assert_eq!(missing.get("Vip"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_missing_field_is_error_unless_allowed() {
        let map = person_map();
        let record = row(&["Name"], &["Ada"]).with_context(csvmap_core::RowContext::at(3));
        let err = read(&map, &record).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref field, row: 3 } if field == "Age"));

        let config = MappingConfig {
            allow_missing_fields: true,
            ..MappingConfig::default()
        };
        let object = Materializer::new(&map, &DefaultResolver, &DefaultConverter, &config)
            .read(&record)
            .unwrap();
        assert_eq!(object.get("Age"), Some(&Value::Null));
    }

    #[test]
    fn test_index_and_name_index() {
        let map = ClassMap::<Person>::builder()
            .map(Member::<Person, String>::new("Name"))
            .name(["N"])
            .name_index(1)
            .map(Member::<Person, i64>::new("Age"))
            .index(0)
            .build()
            .unwrap();
        let object = read(&map, &row(&["A", "N", "N"], &["7", "first", "second"])).unwrap();
        assert_eq!(object.get("Name"), Some(&Value::from("second")));
        assert_eq!(object.get("Age"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_constant_and_convert_using_skip_fields() {
        let map = ClassMap::<Person>::builder()
            .map(Member::<Person, String>::new("Name"))
            .constant("fixed".to_string())
            .map(Member::<Person, i64>::new("Age"))
            .convert_using(|row| Ok(row.len() as i64 * 10))
            .build()
            .unwrap();
        let object = read(&map, &row(&[], &["a", "b"])).unwrap();
        assert_eq!(object.get("Name"), Some(&Value::from("fixed")));
        assert_eq!(object.get("Age"), Some(&Value::Int(20)));
    }

    #[test]
    fn test_conversion_error_carries_row() {
        let map = person_map();
        let record = row(&["Name", "Age", "Vip"], &["Ada", "old", "no"])
            .with_context(csvmap_core::RowContext::at(5));
        let err = read(&map, &record).unwrap_err();
        assert!(matches!(err, Error::Conversion { row: 5, .. }));
    }

    #[test]
    fn test_nested_reference_with_prefix() {
        let address = ClassMap::<Address>::builder()
            .map(Member::<Address, String>::new("City"))
            .build()
            .unwrap();
        let map = ClassMap::<Person>::builder()
            .map(Member::<Person, String>::new("Name"))
            .references_prefixed(Member::new("Home"), address, None)
            .build()
            .unwrap();

        let object = read(&map, &row(&["Name", "Home.City"], &["Ada", "Paris"])).unwrap();
        let home = object.get("Home").and_then(Value::as_object).unwrap();
        assert_eq!(home.type_name(), "Address");
        assert_eq!(home.get("City"), Some(&Value::from("Paris")));
    }

    #[test]
    fn test_parameter_reference_is_passed_to_resolver() {
        let address = ClassMap::<Address>::builder()
            .map(Member::<Address, String>::new("City"))
            .index(1)
            .build()
            .unwrap();
        let map = ClassMap::<Trip>::builder()
            .map(Member::<Trip, String>::new("Code"))
            .index(0)
            .parameter_references(Param::new("from"), address)
            .build()
            .unwrap();

        let object = read(&map, &row(&[], &["T1", "Oslo"])).unwrap();
        let from = object.get("From").and_then(Value::as_object).unwrap();
        assert_eq!(from.get("City"), Some(&Value::from("Oslo")));
    }

    #[test]
    fn test_refused_construction_is_construction_failure() {
        let map = person_map();
        let resolver = FnResolver::new(|shape, _| Ok(Object::new(shape.name())))
            .with_can_create(|shape| shape.name() != "Person");
        let config = MappingConfig::default();
        let err = Materializer::new(&map, &resolver, &DefaultConverter, &config)
            .read(&row(&["Name", "Age"], &["Ada", "1"]))
            .unwrap_err();
        assert!(err.is_construction_failure());
    }
}
