//! Gluegen Engine
//!
//! Extracts a reflection model from a Doxygen XML dump of annotated sources
//! and assembles it into the document that the glue-code templates render:
//! - **AST**: input records and the Doxygen XML loader (`ast` module)
//! - **Types**: type token streams parsed into type trees (`types` module)
//! - **Classes**: class instantiations reachable from reflected variables (`classes` module)
//! - **Attributes**: decorator catalog and overload resolution (`attributes` module)
//! - **Document**: deterministic document assembly (`document` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use gluegen_engine::{GluegenConfig, Pipeline};
//!
//! let output = Pipeline::new(GluegenConfig::default())
//!     .run_directory("build/doxygen/xml".as_ref())?;
//! println!("{}", output.to_json(true)?);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Input
// ============================================================================

/// Input records and the Doxygen XML loader
pub mod ast;

/// Type token streams and type trees
pub mod types;

// ============================================================================
// Resolution
// ============================================================================

/// Reflected variable discovery
pub mod variables;

/// Class resolution and the class registry
pub mod classes;

/// Decorator catalog and attribute resolution
pub mod attributes;

/// Default-value template rendering
pub mod template;

// ============================================================================
// Output
// ============================================================================

/// Document assembly
pub mod document;

/// Run orchestration
pub mod pipeline;

/// Configuration
pub mod config;

/// Error types
pub mod error;

pub use ast::{AstSet, Compound};
pub use attributes::{AttributeCatalog, AttributeResolver, OverloadPolicy};
pub use classes::{ClassDefinition, ClassResolver, Registry};
pub use config::{ConfigError, GluegenConfig};
pub use document::DocumentAssembler;
pub use error::{Diagnostics, ReflectError};
pub use pipeline::{Pipeline, PipelineOutput, RunSummary};
pub use types::{parse_type, ParseError, TypeNode, TypeToken};
pub use variables::{SharedVariable, REFLECTION_MARKER};
