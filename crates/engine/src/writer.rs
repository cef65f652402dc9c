//! Record extraction
//!
//! The reverse of materialization: every field binding of the layout is
//! turned back into field text, in the layout's write order. The owning
//! object of each binding is found by walking down from the root object
//! along the layout's nodes; a missing nested object yields empty fields.

use csvmap_core::{MappingConfig, Object, RecordSink, Result, RowContext, TypeConverter, Value};
use csvmap_mapping::{FieldBinding, FieldLayout, NodeOrigin, RawClassMap};

/// Writes objects of one class map as records
pub struct RecordWriter<'a> {
    layout: FieldLayout<'a>,
    converter: &'a dyn TypeConverter,
}

impl<'a> RecordWriter<'a> {
    /// Prepare writing with `map`, naming headers per `config`
    pub fn new(
        map: &'a RawClassMap,
        converter: &'a dyn TypeConverter,
        config: &MappingConfig,
    ) -> Self {
        RecordWriter {
            layout: map.layout_with(config),
            converter,
        }
    }

    /// Write the header record
    pub fn write_header(&self, sink: &mut dyn RecordSink) -> Result<()> {
        for name in self.layout.header() {
            sink.write_field(&name)?;
        }
        sink.end_record()
    }

    /// Write `object` as one record
    pub fn write_record(
        &self,
        object: &Object,
        context: RowContext,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        let owners = self.owners(object);
        for binding in self.layout.write_order() {
            let text = match owners[binding.node().index()] {
                Some(owner) => self.field_text(binding, owner, context)?,
                None => String::new(),
            };
            sink.write_field(&text)?;
        }
        sink.end_record()
    }

    /// Object owning each node's properties, indexed by node
    fn owners<'o>(&self, root: &'o Object) -> Vec<Option<&'o Object>> {
        let mut owners: Vec<Option<&'o Object>> = Vec::with_capacity(self.layout.nodes().len());
        for node in self.layout.nodes() {
            let owner = match (node.parent(), node.origin()) {
                (None, _) | (_, NodeOrigin::Root) => Some(root),
                (Some(parent), NodeOrigin::Property(member)) => owners[parent.index()]
                    .and_then(|p| p.get(member))
                    .and_then(Value::as_object),
                (Some(parent), NodeOrigin::Parameter(name)) => owners[parent.index()]
                    .and_then(|p| {
                        p.get(name).or_else(|| {
                            p.fields()
                                .find(|(field, _)| field.eq_ignore_ascii_case(name))
                                .map(|(_, value)| value)
                        })
                    })
                    .and_then(Value::as_object),
            };
            owners.push(owner);
        }
        owners
    }

    fn field_text(
        &self,
        binding: &FieldBinding<'_>,
        owner: &Object,
        context: RowContext,
    ) -> Result<String> {
        let property = binding.property();
        let converter: &dyn TypeConverter = match property.type_converter() {
            Some(converter) => converter.as_ref(),
            None => self.converter,
        };
        if let Some(constant) = property.constant() {
            return converter.convert_to_string(constant, context);
        }
        if let Some(write) = property.write_using() {
            return Ok(write(owner));
        }
        let value = owner.get(property.member()).unwrap_or(&Value::Null);
        converter.convert_to_string(value, context)
    }
}
