//! Error types for csvmap
//!
//! This module defines all error types used throughout the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Configuration problems are grouped under [`ConfigurationError`] and are
//! raised while a mapping is declared or built, before any record is touched.
//! Everything else is raised while a record is being read or written.

use std::io;
use thiserror::Error;

/// Result type alias for csvmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Mapping declaration errors
///
/// Raised synchronously by `map`, `references`, `build` and friends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The member path names a property the type does not have
    #[error("type {type_name} has no member '{member}'")]
    UnknownMember {
        /// Type that was searched
        type_name: String,
        /// Missing member name
        member: String,
    },

    /// The declared property type disagrees with the type shape
    #[error("member '{member}' on {type_name} is {found}, not {expected}")]
    TypeMismatch {
        /// Owning type
        type_name: String,
        /// Member name
        member: String,
        /// Type the caller declared
        expected: String,
        /// Type recorded in the shape
        found: String,
    },

    /// An intermediate path segment is not a reference property
    #[error("member '{member}' on {type_name} is not a reference and cannot be traversed")]
    NotAReference {
        /// Owning type
        type_name: String,
        /// Member name
        member: String,
    },

    /// A reference map targets a member already bound by a property map
    #[error("reference '{path}' collides with an existing property map")]
    ReferenceCollision {
        /// Dotted member path of the collision
        path: String,
    },

    /// The constructor has no parameter with this name
    #[error("type {type_name} has no constructor parameter '{parameter}'")]
    UnknownParameter {
        /// Owning type
        type_name: String,
        /// Missing parameter name
        parameter: String,
    },

    /// A member path with no segments was supplied
    #[error("member path is empty")]
    EmptyPath,

    /// Any other invalid configuration (bad config file, missing map, ...)
    #[error("{0}")]
    Invalid(String),
}

/// Error types for csvmap
#[derive(Debug, Error)]
pub enum Error {
    /// Mapping configuration error
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// No instance could be produced for a structurally required type
    #[error("cannot construct {type_name}: {reason}")]
    ConstructionFailure {
        /// Requested type
        type_name: String,
        /// Why construction failed
        reason: String,
    },

    /// The field locator did not resolve in the current row
    #[error("field '{field}' not found at row {row}")]
    MissingField {
        /// Locator description (name or `#index`)
        field: String,
        /// Logical row number
        row: u64,
    },

    /// The type converter rejected the field text
    #[error("cannot convert '{text}' to {target} at row {row}")]
    Conversion {
        /// Offending text
        text: String,
        /// Target type name
        target: String,
        /// Logical row number
        row: u64,
    },

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Shorthand for [`ConfigurationError::Invalid`]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::Configuration(ConfigurationError::Invalid(message.into()))
    }

    /// Shorthand for [`Error::ConstructionFailure`]
    pub fn construction(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ConstructionFailure {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// True for every [`Error::Configuration`] variant
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// True for [`Error::ConstructionFailure`]
    pub fn is_construction_failure(&self) -> bool {
        matches!(self, Error::ConstructionFailure { .. })
    }

    /// The nested configuration error, if any
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Error::Configuration(e) => Some(e),
            _ => None,
        }
    }
}
