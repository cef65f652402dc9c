//! Record access interfaces
//!
//! The mapping engine never tokenizes text. It reads fields from a
//! [`ReaderRow`] and writes fields to a [`RecordSink`], both supplied by
//! the surrounding reader/writer. The in-memory implementations here
//! ([`StringRecord`], [`HeaderRecord`], [`RecordBuffer`]) are what tests
//! and small callers use in place of a real CSV tokenizer.

use std::sync::Arc;

use crate::error::Result;

/// Position of the current record in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowContext {
    /// Logical record number (1-based, header excluded)
    pub row: u64,
    /// Physical line number in the source
    pub raw_row: u64,
}

impl RowContext {
    /// Context for a record whose logical and physical rows coincide
    pub fn at(row: u64) -> Self {
        RowContext { row, raw_row: row }
    }
}

/// Read access to the fields of the current record
pub trait ReaderRow {
    /// Position of this record
    fn context(&self) -> RowContext;

    /// Field text at a zero-based index
    fn field(&self, index: usize) -> Option<&str>;

    /// Field text under a header name
    ///
    /// `name_index` selects among duplicate header names: 0 is the first
    /// column carrying `name`, 1 the second, and so on.
    fn field_by_name(&self, name: &str, name_index: usize) -> Option<&str>;

    /// Number of fields in the record
    fn len(&self) -> usize;

    /// True for a record with no fields
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write access for one outgoing record at a time
pub trait RecordSink {
    /// Append one field to the current record
    fn write_field(&mut self, text: &str) -> Result<()>;

    /// Finish the current record
    fn end_record(&mut self) -> Result<()>;
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// Header names of a record source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderRecord {
    names: Vec<String>,
}

impl HeaderRecord {
    /// Create a header from column names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HeaderRecord {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Column names in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column index of the `name_index`-th occurrence of `name`
    pub fn position(&self, name: &str, name_index: usize) -> Option<usize> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_str() == name)
            .nth(name_index)
            .map(|(i, _)| i)
    }
}

/// A record held as owned strings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringRecord {
    fields: Vec<String>,
    header: Option<Arc<HeaderRecord>>,
    context: RowContext,
}

impl StringRecord {
    /// Create a record without a header
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StringRecord {
            fields: fields.into_iter().map(Into::into).collect(),
            header: None,
            context: RowContext::default(),
        }
    }

    /// Attach a header so fields can be found by name
    pub fn with_header(mut self, header: Arc<HeaderRecord>) -> Self {
        self.header = Some(header);
        self
    }

    /// Attach a row position
    pub fn with_context(mut self, context: RowContext) -> Self {
        self.context = context;
        self
    }

    /// Fields in order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl<S: Into<String>> FromIterator<S> for StringRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        StringRecord::new(iter)
    }
}

impl ReaderRow for StringRecord {
    fn context(&self) -> RowContext {
        self.context
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    fn field_by_name(&self, name: &str, name_index: usize) -> Option<&str> {
        let index = self.header.as_ref()?.position(name, name_index)?;
        self.field(index)
    }

    fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Collects written records in memory
#[derive(Debug, Clone, Default)]
pub struct RecordBuffer {
    records: Vec<Vec<String>>,
    current: Vec<String>,
}

impl RecordBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed records
    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    /// Take the completed records, leaving the buffer empty
    pub fn into_records(self) -> Vec<Vec<String>> {
        self.records
    }
}

impl RecordSink for RecordBuffer {
    fn write_field(&mut self, text: &str) -> Result<()> {
        self.current.push(text.to_string());
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        self.records.push(std::mem::take(&mut self.current));
        Ok(())
    }
}
