//! One reflection run, from loaded AST to document

use crate::ast::{doxygen, AstSet};
use crate::attributes::AttributeCatalog;
use crate::classes::ClassResolver;
use crate::config::GluegenConfig;
use crate::document::DocumentAssembler;
use crate::error::{Diagnostics, ReflectError};
use crate::variables::discover_variables;
use serde_json::Value;
use std::path::Path;

/// Counts of what a run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Top-level variables in the document
    pub variables: usize,
    /// Resolved class instantiations
    pub classes: usize,
    /// Catalogued decorators
    pub attributes: usize,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The assembled document
    pub document: Value,
    /// Recoverable problems encountered
    pub diagnostics: Diagnostics,
    /// What was produced
    pub summary: RunSummary,
}

impl PipelineOutput {
    /// Serialize the document as configured
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(&self.document)
        } else {
            serde_json::to_string(&self.document)
        }
    }
}

/// Runs the reflection pipeline with one configuration
pub struct Pipeline {
    config: GluegenConfig,
}

impl Pipeline {
    /// Create a pipeline
    pub fn new(config: GluegenConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &GluegenConfig {
        &self.config
    }

    /// Load a Doxygen XML directory and run on it
    pub fn run_directory(&self, dir: &Path) -> Result<PipelineOutput, ReflectError> {
        let ast = doxygen::load_directory(dir)?;
        self.run(&ast)
    }

    /// Run on an already loaded AST
    pub fn run(&self, ast: &AstSet) -> Result<PipelineOutput, ReflectError> {
        let mut diagnostics = Diagnostics::new();

        let catalog = AttributeCatalog::build(ast.decorators())?;
        let variables = discover_variables(ast.source_files())?;
        let (variables, registry) = ClassResolver::new(ast).resolve(variables, &mut diagnostics)?;

        let document = DocumentAssembler::new(ast, &catalog, &self.config).assemble(
            &registry,
            &variables,
            &mut diagnostics,
        )?;

        let summary = RunSummary {
            variables: variables.len(),
            classes: registry.len(),
            attributes: catalog.len(),
        };
        tracing::info!(
            "Reflected {} variable(s), {} class(es), {} attribute(s) with {} diagnostic(s)",
            summary.variables,
            summary.classes,
            summary.attributes,
            diagnostics.len()
        );
        Ok(PipelineOutput {
            document,
            diagnostics,
            summary,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(GluegenConfig::default())
    }
}
