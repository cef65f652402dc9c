//! Property maps
//!
//! A [`PropertyMap`] binds one scalar property of its owning class map to
//! one field of the record. Resolution precedence when reading:
//!
//! 1. constant value (nothing else is consulted)
//! 2. read closure
//! 3. explicit index, else candidate names (first match wins)
//! 4. default value when the field is empty or missing
//! 5. type converter override, else the ambient converter

use std::fmt;
use std::sync::Arc;

use csvmap_core::{Object, ReaderRow, Result, ScalarKind, TypeConverter, Value};
use smallvec::SmallVec;

/// Custom read-direction conversion
pub type ReadFn = Arc<dyn Fn(&dyn ReaderRow) -> Result<Value> + Send + Sync>;

/// Custom write-direction conversion; receives the instance that owns the property
pub type WriteFn = Arc<dyn Fn(&Object) -> String + Send + Sync>;

/// Value used when the field is empty or missing
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Already typed value
    Value(Value),
    /// Text run through the type converter, like field text
    Text(String),
}

/// Binding of one scalar property to one record field
#[derive(Clone)]
pub struct PropertyMap {
    member: String,
    kind: Option<ScalarKind>,
    index: Option<usize>,
    index_end: Option<usize>,
    names: SmallVec<[String; 1]>,
    name_index: usize,
    type_converter: Option<Arc<dyn TypeConverter>>,
    default: Option<DefaultValue>,
    constant: Option<Value>,
    read_using: Option<ReadFn>,
    write_using: Option<WriteFn>,
    ignore: bool,
}

impl PropertyMap {
    /// Create an unconfigured map for `member`
    pub fn new(member: impl Into<String>, kind: Option<ScalarKind>) -> Self {
        PropertyMap {
            member: member.into(),
            kind,
            index: None,
            index_end: None,
            names: SmallVec::new(),
            name_index: 0,
            type_converter: None,
            default: None,
            constant: None,
            read_using: None,
            write_using: None,
            ignore: false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Property name within the owning class map
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Declared scalar kind (None for untyped members)
    pub fn kind(&self) -> Option<ScalarKind> {
        self.kind
    }

    /// Explicit field index
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// End index for multi-field members
    pub fn index_end(&self) -> Option<usize> {
        self.index_end
    }

    /// Configured candidate names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Which occurrence of a duplicated header name to use
    pub fn name_index(&self) -> usize {
        self.name_index
    }

    /// Converter override
    pub fn type_converter(&self) -> Option<&Arc<dyn TypeConverter>> {
        self.type_converter.as_ref()
    }

    /// Default value
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Constant value
    pub fn constant(&self) -> Option<&Value> {
        self.constant.as_ref()
    }

    /// Read-direction closure
    pub fn read_using(&self) -> Option<&ReadFn> {
        self.read_using.as_ref()
    }

    /// Write-direction closure
    pub fn write_using(&self) -> Option<&WriteFn> {
        self.write_using.as_ref()
    }

    /// True if the member is skipped when reading and writing
    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    /// True if reading this member consumes a record field
    pub fn reads_field(&self) -> bool {
        !self.ignore && self.constant.is_none() && self.read_using.is_none()
    }

    /// Candidate header names with `prefix` applied
    ///
    /// Falls back to the member name when no names were configured.
    pub fn header_names<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = String> + 'a {
        let fallback = if self.names.is_empty() {
            Some(self.member.as_str())
        } else {
            None
        };
        self.names
            .iter()
            .map(String::as_str)
            .chain(fallback)
            .map(move |name| format!("{}{}", prefix, name))
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Read from / write to a fixed field index
    pub fn set_index(&mut self, index: usize) -> &mut Self {
        self.index = Some(index);
        self.index_end = None;
        self
    }

    /// Claim the fields `index..=index_end`
    ///
    /// Records are read from the first field of the span and written as a
    /// single field. The rest of the span only counts when
    /// [`crate::layout::FieldLayout::collisions`] checks for overlapping
    /// siblings, and it does not raise the max index.
    pub fn set_index_range(&mut self, index: usize, index_end: usize) -> &mut Self {
        self.index = Some(index);
        self.index_end = Some(index_end);
        self
    }

    /// Candidate header names, tried in order
    pub fn set_names<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Occurrence of a duplicated header name
    pub fn set_name_index(&mut self, name_index: usize) -> &mut Self {
        self.name_index = name_index;
        self
    }

    /// Use a specific converter for this member
    pub fn set_type_converter(&mut self, converter: Arc<dyn TypeConverter>) -> &mut Self {
        self.type_converter = Some(converter);
        self
    }

    /// Value used when the field is empty or missing
    pub fn set_default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default given as field text, converted on use
    pub fn set_default_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.default = Some(DefaultValue::Text(text.into()));
        self
    }

    /// Value used for every record, in both directions
    pub fn set_constant(&mut self, value: impl Into<Value>) -> &mut Self {
        self.constant = Some(value.into());
        self
    }

    /// Produce the value from the whole row
    pub fn set_read_using(&mut self, read: ReadFn) -> &mut Self {
        self.read_using = Some(read);
        self
    }

    /// Produce the field text from the owning instance
    pub fn set_write_using(&mut self, write: WriteFn) -> &mut Self {
        self.write_using = Some(write);
        self
    }

    /// Skip the member entirely
    pub fn set_ignore(&mut self, ignore: bool) -> &mut Self {
        self.ignore = ignore;
        self
    }
}

impl fmt::Debug for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMap")
            .field("member", &self.member)
            .field("kind", &self.kind)
            .field("index", &self.index)
            .field("index_end", &self.index_end)
            .field("names", &self.names)
            .field("name_index", &self.name_index)
            .field("type_converter", &self.type_converter.is_some())
            .field("default", &self.default)
            .field("constant", &self.constant)
            .field("read_using", &self.read_using.is_some())
            .field("write_using", &self.write_using.is_some())
            .field("ignore", &self.ignore)
            .finish()
    }
}
