//! Subcommand implementations

pub mod check;
pub mod document;

use crate::output::StyledOutput;
use anyhow::Context;
use gluegen_engine::{GluegenConfig, Pipeline, PipelineOutput};
use std::path::Path;

/// Load the configuration and run the pipeline on an AST directory
///
/// Recoverable diagnostics are printed as warnings.
pub fn run_pipeline(
    ast_dir: &Path,
    config: Option<&Path>,
    out: &mut StyledOutput,
) -> anyhow::Result<(PipelineOutput, GluegenConfig)> {
    let config = GluegenConfig::load(config)
        .with_context(|| format!("loading config for {}", ast_dir.display()))?;
    tracing::debug!("Using config {:?}", config);

    let pipeline = Pipeline::new(config);
    let output = pipeline.run_directory(ast_dir)?;
    for diagnostic in output.diagnostics.entries() {
        out.stderr_warning(&diagnostic.to_string());
    }
    Ok((output, pipeline.config().clone()))
}
