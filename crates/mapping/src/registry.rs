//! Class map registry
//!
//! Maps are keyed by the Rust type they target, so two types publishing the
//! same shape name never share a map. Registering hands the map over: it is
//! frozen behind an `Arc` and shared by every read and write session from
//! then on. Types without a registered map are auto-mapped on first use and
//! the result is cached.

use std::any::TypeId;
use std::sync::Arc;

use csvmap_core::{ConfigurationError, MappingConfig, Mapped, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::class_map::{ClassMap, MapDefinition, RawClassMap};

/// Registered class maps by target type
#[derive(Debug, Default)]
pub struct ClassMapRegistry {
    maps: RwLock<FxHashMap<TypeId, Arc<RawClassMap>>>,
    config: MappingConfig,
}

impl ClassMapRegistry {
    /// Empty registry with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry using `config` for auto-mapping
    pub fn with_config(config: MappingConfig) -> Self {
        ClassMapRegistry {
            maps: RwLock::new(FxHashMap::default()),
            config,
        }
    }

    /// Configuration used for auto-mapping
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Register `map`, replacing any map for the same type
    pub fn register<T: Mapped>(&self, map: ClassMap<T>) -> Arc<RawClassMap> {
        self.insert(TypeId::of::<T>(), map.into_raw())
    }

    /// Build the map of `D` and register it
    pub fn register_definition<D: MapDefinition>(&self) -> Result<Arc<RawClassMap>> {
        Ok(self.register(D::define()?))
    }

    /// Register an already erased map under the type it was declared for
    ///
    /// Maps built from a bare [`csvmap_core::TypeShape`] carry no target type
    /// and are rejected.
    pub fn register_raw(&self, map: RawClassMap) -> Result<Arc<RawClassMap>> {
        let type_id = map.target_type_id().ok_or_else(|| {
            ConfigurationError::Invalid(format!(
                "class map for '{}' is not tied to a Rust type",
                map.type_name()
            ))
        })?;
        Ok(self.insert(type_id, map))
    }

    fn insert(&self, type_id: TypeId, map: RawClassMap) -> Arc<RawClassMap> {
        let map = Arc::new(map);
        info!(
            type_name = map.type_name(),
            max_index = ?map.max_index(),
            "Registered class map"
        );
        self.maps.write().insert(type_id, Arc::clone(&map));
        map
    }

    /// Registered map for `T`
    pub fn get<T: Mapped>(&self) -> Option<Arc<RawClassMap>> {
        self.maps.read().get(&TypeId::of::<T>()).cloned()
    }

    /// Remove the map for `T`
    pub fn unregister<T: Mapped>(&self) -> Option<Arc<RawClassMap>> {
        self.maps.write().remove(&TypeId::of::<T>())
    }

    /// Whether a map for `T` is registered or cached
    pub fn contains<T: Mapped>(&self) -> bool {
        self.maps.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of maps held
    pub fn len(&self) -> usize {
        self.maps.read().len()
    }

    /// True if no map is held
    pub fn is_empty(&self) -> bool {
        self.maps.read().is_empty()
    }

    /// Shape names of all types with a map, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .maps
            .read()
            .values()
            .map(|map| map.type_name().to_string())
            .collect();
        names.sort();
        names
    }

    /// The map for `T`, auto-mapping and caching it if none is registered
    pub fn resolve<T: Mapped>(&self) -> Result<Arc<RawClassMap>> {
        if let Some(map) = self.get::<T>() {
            return Ok(map);
        }

        let map = Arc::new(RawClassMap::auto_map_of::<T>(&self.config)?);
        let mut maps = self.maps.write();
        let cached = maps.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(type_name = map.type_name(), "Caching auto-mapped class map");
            Arc::clone(&map)
        });
        Ok(Arc::clone(cached))
    }
}
