//! `gluegen check`: run the pipeline and summarize without writing output.

use super::run_pipeline;
use crate::output::{plural, StyledOutput};
use std::path::PathBuf;

pub fn execute(
    ast_dir: PathBuf,
    config: Option<PathBuf>,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let (result, _) = run_pipeline(&ast_dir, config.as_deref(), out)?;
    let summary = result.summary;

    out.info(&format!("{}", ast_dir.display()));
    out.plain(&format!(
        ": {}, {}, {}: ",
        plural(summary.variables, "variable", "variables"),
        plural(summary.classes, "class", "classes"),
        plural(summary.attributes, "attribute", "attributes"),
    ));
    let warnings = result.diagnostics.len();
    if warnings == 0 {
        out.success("ok");
    } else {
        out.warning(&plural(warnings, "warning", "warnings"));
    }
    out.newline();
    out.flush();
    Ok(())
}
