//! Member paths
//!
//! A [`MemberPath`] names a property of a mapped type, possibly through a
//! chain of reference properties: `B.C.D.DId` is the `DId` property of the
//! object held in `D`, held in `C`, held in `B`.
//!
//! Paths are the untyped backbone of the typed selectors in the mapping
//! crate. They are compared segment by segment and never interpreted as
//! header text.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// One property name in a member path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment(pub String);

impl PathSegment {
    /// The property name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path from a mapped type to one of its (possibly nested) members
///
/// # Examples
///
/// ```
/// use csvmap_core::path::MemberPath;
///
/// let path = MemberPath::root().key("B").key("BId");
/// let parsed: MemberPath = "B.BId".parse().unwrap();
/// assert_eq!(path, parsed);
/// assert_eq!(path.to_path_string(), "B.BId");
/// assert!(MemberPath::root().key("B").is_ancestor_of(&path));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MemberPath {
    segments: SmallVec<[PathSegment; 4]>,
}

impl MemberPath {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        MemberPath {
            segments: SmallVec::new(),
        }
    }

    /// Create a single-segment path
    pub fn single(name: impl Into<String>) -> Self {
        MemberPath::root().key(name)
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        MemberPath {
            segments: SmallVec::from_vec(segments),
        }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Get the number of segments in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root path (empty)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment (builder pattern)
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment(name.into()));
        self
    }

    /// Push a segment (mutating)
    pub fn push(&mut self, name: impl Into<String>) {
        self.segments.push(PathSegment(name.into()));
    }

    /// Concatenate two paths
    pub fn join(&self, other: &MemberPath) -> MemberPath {
        let mut joined = self.clone();
        joined.segments.extend(other.segments.iter().cloned());
        joined
    }

    /// First segment (None if root)
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    /// Last segment (None if root)
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Split into the first segment and the remaining path
    pub fn split_first(&self) -> Option<(&PathSegment, MemberPath)> {
        let (head, tail) = self.segments.split_first()?;
        Some((
            head,
            MemberPath {
                segments: tail.iter().cloned().collect(),
            },
        ))
    }

    /// Get the parent path (None if root)
    pub fn parent(&self) -> Option<MemberPath> {
        if self.segments.is_empty() {
            None
        } else {
            let mut parent = self.clone();
            parent.segments.pop();
            Some(parent)
        }
    }

    /// Check if this path is an ancestor of another (or equal)
    pub fn is_ancestor_of(&self, other: &MemberPath) -> bool {
        if self.segments.len() > other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| a == b)
    }

    /// Check if two paths overlap (one is ancestor/descendant of the other)
    pub fn overlaps(&self, other: &MemberPath) -> bool {
        self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }

    /// Dotted string form (`B.C.CId`)
    pub fn to_path_string(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.0.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string())
    }
}

impl FromStr for MemberPath {
    type Err = ConfigurationError;

    /// Parse a dotted path; the empty string is the root path
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(MemberPath::root());
        }
        let mut path = MemberPath::root();
        for part in s.split('.') {
            let part = part.trim();
            if part.is_empty() {
                return Err(ConfigurationError::Invalid(format!(
                    "empty segment in member path '{}'",
                    s
                )));
            }
            path.push(part);
        }
        Ok(path)
    }
}
