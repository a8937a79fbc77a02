//! Shared colored output utilities for CLI commands.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled output writer for terminal.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    /// Create a new styled output with the given color choice.
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn write_styled(stream: &mut StandardStream, text: &str, color: Color, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(bold);
        let _ = stream.set_color(&spec);
        let _ = write!(stream, "{}", text);
        let _ = stream.reset();
    }

    /// Green bold text.
    pub fn success(&mut self, text: &str) {
        Self::write_styled(&mut self.stdout, text, Color::Green, true);
    }

    /// Yellow bold text.
    pub fn warning(&mut self, text: &str) {
        Self::write_styled(&mut self.stdout, text, Color::Yellow, true);
    }

    /// Cyan text.
    pub fn info(&mut self, text: &str) {
        Self::write_styled(&mut self.stdout, text, Color::Cyan, false);
    }

    /// Plain text (no color).
    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    /// Newline.
    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    /// Flush stdout.
    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    // ── Diagnostics (stderr) ─────────────────────────────────────────

    /// `error: <message>` on stderr.
    pub fn stderr_error(&mut self, message: &str) {
        Self::write_styled(&mut self.stderr, "error", Color::Red, true);
        let _ = writeln!(self.stderr, ": {}", message);
    }

    /// `warning: <message>` on stderr.
    pub fn stderr_warning(&mut self, message: &str) {
        Self::write_styled(&mut self.stderr, "warning", Color::Yellow, true);
        let _ = writeln!(self.stderr, ": {}", message);
    }
}

/// `1 class`, `2 classes`
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}
