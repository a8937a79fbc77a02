//! `gluegen document`: write the reflection document as JSON.

use super::run_pipeline;
use crate::output::StyledOutput;
use anyhow::Context;
use std::path::PathBuf;

pub fn execute(
    ast_dir: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let (result, config) = run_pipeline(&ast_dir, config.as_deref(), out)?;
    let json = result
        .to_json(config.output.pretty)
        .context("serializing document")?;

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", json))
                .with_context(|| format!("writing {}", path.display()))?;
            out.success("Wrote");
            out.plain(&format!(" {}", path.display()));
            out.newline();
        }
        None => {
            out.plain(&json);
            out.newline();
        }
    }
    out.flush();
    Ok(())
}
