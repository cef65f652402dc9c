//! Mapping configuration via TOML
//!
//! Settings that affect how class maps are generated and how records are
//! resolved. Every key is optional; an empty document yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Separator used when no explicit one is configured
pub const DEFAULT_PREFIX_SEPARATOR: &str = ".";

/// Mapping configuration
///
/// # Example
///
/// ```toml
/// prefix_separator = "."
/// prefix_reference_headers = false
/// allow_missing_fields = false
/// max_reference_depth = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Appended to a member name to form a default reference prefix.
    #[serde(default = "default_separator")]
    pub prefix_separator: String,
    /// Auto-mapping gives every reference map its default prefix.
    #[serde(default)]
    pub prefix_reference_headers: bool,
    /// A field that cannot be located reads as `Null` instead of failing.
    #[serde(default)]
    pub allow_missing_fields: bool,
    /// Recursion limit for auto-mapping nested references.
    #[serde(default = "default_max_reference_depth")]
    pub max_reference_depth: usize,
}

fn default_separator() -> String {
    DEFAULT_PREFIX_SEPARATOR.to_string()
}

fn default_max_reference_depth() -> usize {
    16
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            prefix_separator: default_separator(),
            prefix_reference_headers: false,
            allow_missing_fields: false,
            max_reference_depth: default_max_reference_depth(),
        }
    }
}

impl MappingConfig {
    /// Check the settings for values no mapping can work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_reference_depth == 0 {
            return Err(Error::invalid_config(
                "max_reference_depth must be at least 1",
            ));
        }
        Ok(())
    }

    /// Default prefix for a member: its name followed by the separator.
    pub fn default_prefix(&self, member: &str) -> String {
        format!("{}{}", member, self.prefix_separator)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# csvmap configuration
#
# Separator appended to a member name to form a default header prefix.
prefix_separator = "."

# Auto-mapped reference members prefix their headers ("B.BId").
prefix_reference_headers = false

# Missing fields read as null instead of failing the record.
allow_missing_fields = false

# Auto-mapping recursion limit for nested references.
max_reference_depth = 16
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MappingConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            Error::invalid_config(format!("config file '{}': {}", path.display(), e))
        })
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
