//! Reference maps
//!
//! A reference map binds a member whose value is a whole nested object to
//! the class map describing that object. [`PropertyReferenceMap`] targets a
//! property; [`ParameterReferenceMap`] targets a constructor parameter, whose
//! object is built before the owning instance and handed to the contract
//! resolver as a constructor argument.
//!
//! The reference map owns its nested class map. Nested indices address the
//! parent record's flat field space directly; nested names get the prefix
//! prepended. Keeping sibling field spaces apart is up to the caller, see
//! [`crate::layout::FieldLayout::collisions`] for a diagnostic.
//!
//! A default prefix stays symbolic until a layout is built, so it picks up
//! the separator of the configuration the layout is built with.

use csvmap_core::ParameterShape;

use crate::class_map::RawClassMap;

/// Header prefix of a reference map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPrefix {
    /// Member or parameter name followed by the configured separator
    Member,
    /// Literal prefix
    Explicit(String),
}

impl HeaderPrefix {
    fn from_option(prefix: Option<&str>) -> Self {
        match prefix {
            Some(p) if !p.is_empty() => HeaderPrefix::Explicit(p.to_string()),
            _ => HeaderPrefix::Member,
        }
    }

    /// Prefix text for `member` with `separator`
    pub fn resolve(&self, member: &str, separator: &str) -> String {
        match self {
            HeaderPrefix::Member => format!("{}{}", member, separator),
            HeaderPrefix::Explicit(p) => p.clone(),
        }
    }
}

/// A property whose value is a mapped nested object
#[derive(Debug, Clone)]
pub struct PropertyReferenceMap {
    member: String,
    map: RawClassMap,
    prefix: Option<HeaderPrefix>,
}

impl PropertyReferenceMap {
    /// Bind `member` to `map`
    pub fn new(member: impl Into<String>, map: RawClassMap) -> Self {
        PropertyReferenceMap {
            member: member.into(),
            map,
            prefix: None,
        }
    }

    /// Property name within the owning class map
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The nested class map
    pub fn map(&self) -> &RawClassMap {
        &self.map
    }

    /// The nested class map, mutably
    pub fn map_mut(&mut self) -> &mut RawClassMap {
        &mut self.map
    }

    pub(crate) fn replace_map(&mut self, map: RawClassMap) {
        self.map = map;
    }

    /// Header prefix applied to every nested name
    pub fn prefix(&self) -> Option<&HeaderPrefix> {
        self.prefix.as_ref()
    }

    /// Prefix text using `separator` for a default prefix
    pub fn resolved_prefix(&self, separator: &str) -> Option<String> {
        self.prefix
            .as_ref()
            .map(|p| p.resolve(&self.member, separator))
    }

    /// Set the header prefix
    ///
    /// `None` or an empty string selects the default, the member name
    /// followed by the configured `prefix_separator`.
    pub fn set_prefix(&mut self, prefix: Option<&str>) -> &mut Self {
        self.prefix = Some(HeaderPrefix::from_option(prefix));
        self
    }

    /// Remove the header prefix
    pub fn clear_prefix(&mut self) -> &mut Self {
        self.prefix = None;
        self
    }

    /// Largest explicit index within the nested map
    pub fn max_index(&self) -> Option<usize> {
        self.map.max_index()
    }
}

/// A constructor parameter whose value is a mapped nested object
#[derive(Debug, Clone)]
pub struct ParameterReferenceMap {
    parameter: ParameterShape,
    map: RawClassMap,
    prefix: Option<HeaderPrefix>,
}

impl ParameterReferenceMap {
    /// Bind `parameter` to `map`
    pub fn new(parameter: ParameterShape, map: RawClassMap) -> Self {
        ParameterReferenceMap {
            parameter,
            map,
            prefix: None,
        }
    }

    /// The parameter descriptor
    pub fn parameter(&self) -> &ParameterShape {
        &self.parameter
    }

    /// The nested class map
    pub fn map(&self) -> &RawClassMap {
        &self.map
    }

    /// The nested class map, mutably
    pub fn map_mut(&mut self) -> &mut RawClassMap {
        &mut self.map
    }

    pub(crate) fn replace_map(&mut self, map: RawClassMap) {
        self.map = map;
    }

    /// Header prefix applied to every nested name
    pub fn prefix(&self) -> Option<&HeaderPrefix> {
        self.prefix.as_ref()
    }

    /// Prefix text using `separator` for a default prefix
    pub fn resolved_prefix(&self, separator: &str) -> Option<String> {
        self.prefix
            .as_ref()
            .map(|p| p.resolve(&self.parameter.name, separator))
    }

    /// Set the header prefix; `None` selects `"<parameter><separator>"`
    pub fn set_prefix(&mut self, prefix: Option<&str>) -> &mut Self {
        self.prefix = Some(HeaderPrefix::from_option(prefix));
        self
    }

    /// Largest explicit index within the nested map
    pub fn max_index(&self) -> Option<usize> {
        self.map.max_index()
    }
}
