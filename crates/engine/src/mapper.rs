//! Record mapper
//!
//! [`RecordMapper`] is the entry point of a read or write session. It owns a
//! [`ClassMapRegistry`], a type converter and, optionally, an injected
//! contract resolver. Without an injected resolver every read call fetches
//! the process-wide current resolver once and uses it for the whole call.

use std::sync::Arc;

use csvmap_core::{
    DefaultConverter, MappingConfig, Mapped, Object, ReaderRow, RecordSink, Result, RowContext,
    TypeConverter,
};
use csvmap_mapping::{ClassMap, ClassMapRegistry, MapDefinition, RawClassMap};
use tracing::warn;

use crate::materialize::Materializer;
use crate::resolver::{self, ContractResolver};
use crate::writer::RecordWriter;

/// Reads and writes records through registered class maps
pub struct RecordMapper {
    registry: ClassMapRegistry,
    resolver: Option<Arc<dyn ContractResolver>>,
    converter: Arc<dyn TypeConverter>,
}

impl Default for RecordMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordMapper {
    /// Mapper with the default configuration
    pub fn new() -> Self {
        Self::with_config(MappingConfig::default())
    }

    /// Mapper using `config`
    pub fn with_config(config: MappingConfig) -> Self {
        RecordMapper {
            registry: ClassMapRegistry::with_config(config),
            resolver: None,
            converter: Arc::new(DefaultConverter),
        }
    }

    /// Use `resolver` instead of the process-wide one
    pub fn with_resolver(mut self, resolver: Arc<dyn ContractResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Use `converter` as the ambient type converter
    pub fn with_converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &MappingConfig {
        self.registry.config()
    }

    /// The registry holding this mapper's class maps
    pub fn registry(&self) -> &ClassMapRegistry {
        &self.registry
    }

    /// Resolver used by the next read call
    pub fn resolver(&self) -> Arc<dyn ContractResolver> {
        match &self.resolver {
            Some(resolver) => Arc::clone(resolver),
            None => resolver::current(),
        }
    }

    /// Register `map` for its target type
    ///
    /// Field collisions between sibling reference maps are logged, not rejected.
    pub fn register<T: Mapped>(&self, map: ClassMap<T>) -> Arc<RawClassMap> {
        for collision in map.layout_with(self.config()).collisions() {
            warn!(type_name = map.type_name(), %collision, "Overlapping field bindings");
        }
        self.registry.register(map)
    }

    /// Build the map of `D` and register it
    pub fn register_definition<D: MapDefinition>(&self) -> Result<Arc<RawClassMap>> {
        Ok(self.register(D::define()?))
    }

    /// Class map used for `T`
    pub fn class_map<T: Mapped>(&self) -> Result<Arc<RawClassMap>> {
        self.registry.resolve::<T>()
    }

    /// Highest explicit field index of the map for `T`
    pub fn max_index<T: Mapped>(&self) -> Result<Option<usize>> {
        Ok(self.class_map::<T>()?.max_index())
    }

    /// Read one record as a `T`
    pub fn read<T: Mapped>(&self, row: &dyn ReaderRow) -> Result<Object> {
        let map = self.class_map::<T>()?;
        let resolver = self.resolver();
        Materializer::new(&map, resolver.as_ref(), self.converter.as_ref(), self.config())
            .read(row)
    }

    /// Read every record of `rows` as a `T`, stopping at the first error
    pub fn read_all<T: Mapped, R: ReaderRow>(&self, rows: &[R]) -> Result<Vec<Object>> {
        let map = self.class_map::<T>()?;
        let resolver = self.resolver();
        let materializer =
            Materializer::new(&map, resolver.as_ref(), self.converter.as_ref(), self.config());
        rows.iter().map(|row| materializer.read(row)).collect()
    }

    /// Write the header record for `T`
    pub fn write_header<T: Mapped>(&self, sink: &mut dyn RecordSink) -> Result<()> {
        let map = self.class_map::<T>()?;
        RecordWriter::new(&map, self.converter.as_ref(), self.config()).write_header(sink)
    }

    /// Write `object` as one record of `T`
    pub fn write_record<T: Mapped>(
        &self,
        object: &Object,
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        let map = self.class_map::<T>()?;
        RecordWriter::new(&map, self.converter.as_ref(), self.config()).write_record(
            object,
            RowContext::at(1),
            sink,
        )
    }

    /// Write every object as a record of `T`, without a header
    pub fn write_records<T: Mapped>(
        &self,
        objects: &[Object],
        sink: &mut dyn RecordSink,
    ) -> Result<()> {
        let map = self.class_map::<T>()?;
        let writer = RecordWriter::new(&map, self.converter.as_ref(), self.config());
        for (n, object) in objects.iter().enumerate() {
            writer.write_record(object, RowContext::at(n as u64 + 1), sink)?;
        }
        Ok(())
    }
}
