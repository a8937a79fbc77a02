//! Reflection pipeline errors

use crate::types::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting and resolving the reflection model
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReflectError {
    /// A declared type could not be parsed into a type tree
    #[error("Malformed type of '{entity}': {source}")]
    Parse {
        /// Variable or member whose type is malformed
        entity: String,
        /// Underlying parse failure
        source: ParseError,
    },

    /// No class definition exists for a referenced class
    #[error("Unresolved type '{signature}' of variable '{variable}', variable dropped")]
    UnresolvedType {
        /// Variable that referenced the type
        variable: String,
        /// Canonical signature that could not be found
        signature: String,
    },

    /// A reflected class lives in a compiled unit instead of an includable header
    #[error("Class '{class}' is defined in '{file}', which is not an includable header")]
    NonIncludableDefinition {
        /// Fully-qualified class name
        class: String,
        /// Defining file
        file: String,
    },

    /// The instantiation supplies a different number of generic arguments than declared
    #[error("Class '{class}' declares {expected} generic parameter(s) but '{signature}' supplies {actual}")]
    GenericArity {
        /// Fully-qualified class name
        class: String,
        /// Canonical signature of the instantiation
        signature: String,
        /// Declared generic parameter count
        expected: usize,
        /// Supplied generic argument count
        actual: usize,
    },

    /// No decorator constructor accepts the attached arguments
    #[error("No constructor of attribute '{attribute}' accepts ({arguments}) attached to '{variable}'")]
    OverloadResolution {
        /// Decorator name
        attribute: String,
        /// Variable the decorator is attached to
        variable: String,
        /// The attached arguments as written
        arguments: String,
    },

    /// A decorator definition breaks the trailing-defaults rule
    #[error("Attribute '{attribute}': parameter '{parameter}' of constructor #{constructor} needs a default value because an earlier parameter has one")]
    InvalidAttributeDefinition {
        /// Decorator name
        attribute: String,
        /// Constructor position in declaration order
        constructor: usize,
        /// First parameter lacking a default
        parameter: String,
    },

    /// An AST file could not be read or parsed
    #[error("Failed to load AST file '{}': {message}", path.display())]
    Load {
        /// File that failed
        path: PathBuf,
        /// Failure description
        message: String,
    },
}

impl ReflectError {
    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReflectError::UnresolvedType { .. })
    }
}

/// Collected recoverable problems of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<ReflectError>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable problem
    pub fn push(&mut self, error: ReflectError) {
        tracing::warn!("{}", error);
        self.entries.push(error);
    }

    /// Recorded problems in the order they occurred
    pub fn entries(&self) -> &[ReflectError] {
        &self.entries
    }

    /// Number of recorded problems
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unresolved_types_are_recoverable() {
        let unresolved = ReflectError::UnresolvedType {
            variable: "score".to_string(),
            signature: "classFoo".to_string(),
        };
        let arity = ReflectError::GenericArity {
            class: "app::Box".to_string(),
            signature: "classBox<int,int>".to_string(),
            expected: 1,
            actual: 2,
        };
        assert!(!unresolved.is_fatal());
        assert!(arity.is_fatal());
    }

    #[test]
    fn test_messages_name_the_entity() {
        let err = ReflectError::NonIncludableDefinition {
            class: "app::Player".to_string(),
            file: "src/player.cpp".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("app::Player"));
        assert!(msg.contains("src/player.cpp"));
    }
}
