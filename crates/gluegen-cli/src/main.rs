//! Gluegen CLI
//!
//! Reads a Doxygen XML dump of annotated sources and produces the
//! reflection document consumed by the glue-code templates.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::{resolve_color_choice, StyledOutput};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, checked before `RUST_LOG`
const LOG_ENV: &str = "GLUEGEN_LOG";

#[derive(Parser)]
#[command(name = "gluegen")]
#[command(about = "Reflection extraction for generated glue code", long_about = None)]
#[command(version)]
struct Cli {
    /// When to use colors
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the reflection document as JSON
    Document {
        /// Directory with the Doxygen XML output
        #[arg(long)]
        ast_dir: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run the pipeline and print a summary
    Check {
        /// Directory with the Doxygen XML output
        #[arg(long)]
        ast_dir: PathBuf,
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "gluegen=error".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    let result = match cli.command {
        Commands::Document {
            ast_dir,
            output,
            config,
        } => commands::document::execute(ast_dir, output, config, &mut out),
        Commands::Check { ast_dir, config } => commands::check::execute(ast_dir, config, &mut out),
    };

    if let Err(err) = result {
        out.stderr_error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}
