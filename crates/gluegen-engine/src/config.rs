//! Configuration (gluegen.toml)
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use crate::attributes::OverloadPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GluegenConfig {
    /// Type name formatting
    pub naming: NamingConfig,
    /// Resolution policies
    pub resolution: ResolutionConfig,
    /// Document output
    pub output: OutputConfig,
}

/// Tokens wrapped around generic arguments when printing type names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Separators {
    /// Opens the argument list
    pub open: String,
    /// Between arguments
    pub separator: String,
    /// Closes the argument list
    pub close: String,
}

impl Separators {
    /// `Box<int, float>`
    pub fn cpp() -> Self {
        Self {
            open: "<".to_string(),
            separator: ", ".to_string(),
            close: ">".to_string(),
        }
    }

    /// `Box__int_float__`
    pub fn unique() -> Self {
        Self {
            open: "__".to_string(),
            separator: "_".to_string(),
            close: "__".to_string(),
        }
    }
}

/// Type name formatting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamingConfig {
    /// Printable source-language names
    pub cpp: Separators,
    /// Names usable as generated symbols
    pub unique: Separators,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            cpp: Separators::cpp(),
            unique: Separators::unique(),
        }
    }
}

/// Resolution policies
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Behaviour when no decorator overload accepts an attachment
    pub overload_mismatch: OverloadPolicy,
}

/// Document output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Comment placed at the top of every generated file
    pub file_comment: String,
    /// Pretty-print the JSON document
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_comment: default_file_comment(),
            pretty: true,
        }
    }
}

fn default_file_comment() -> String {
    "// This file gets generated!\n\
     // Do not modify it directly but its corresponding template file instead!"
        .to_string()
}

impl GluegenConfig {
    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load from a file if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: GluegenConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unique = &self.naming.unique;
        // Empty brackets would let `a<b>,c` and `a<b,c>` print the same
        if unique.open.is_empty() || unique.close.is_empty() || unique.separator.is_empty() {
            return Err(ConfigError::ValidationError(
                "naming.unique tokens cannot be empty".to_string(),
            ));
        }
        for token in [&unique.open, &unique.separator, &unique.close] {
            if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::ValidationError(format!(
                    "naming.unique token '{}' must contain only identifier characters",
                    token
                )));
            }
        }
        Ok(())
    }
}
