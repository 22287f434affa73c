//! Terminal output for generator diagnostics.
//!
//! ```text
//! warning[E2001]: type `decimal` has no native mapping
//!   --> NS.Shop::Price
//!   = note: the member is skipped
//! ```

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// ANSI styles. Always reset with [`RESET`].
const RED: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[1;33m";
const CYAN: &str = "\x1b[1;36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// When diagnostics get ANSI colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color only when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean. `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.colors {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn severity_style(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Note => CYAN,
        }
    }

    // Write errors on a diagnostic stream are not reportable anywhere.
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.writer, "{text}");
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let head = format!(
            "{}{}: {}",
            self.paint(Self::severity_style(diagnostic.severity), &diagnostic.severity.to_string()),
            self.paint(BOLD, &format!("[{}]", diagnostic.code)),
            diagnostic.message,
        );
        self.line(&head);

        if let Some(location) = &diagnostic.location {
            let at = format!("  --> {}", self.paint(BOLD, location));
            self.line(&at);
        }
        for note in &diagnostic.notes {
            let note = format!("  = {}: {note}", self.paint(BOLD, "note"));
            self.line(&note);
        }
        self.line("");
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let warnings = match warning_count {
            0 => None,
            1 => Some("1 warning".to_string()),
            n => Some(format!("{n} warnings")),
        };
        let summary = match (error_count, warnings) {
            (0, None) => return,
            (0, Some(warnings)) => format!("{}: {warnings} emitted", self.paint(YELLOW, "warning")),
            (errors, warnings) => {
                let errors = if errors == 1 {
                    "1 error".to_string()
                } else {
                    format!("{errors} errors")
                };
                let tail = warnings.map(|w| format!("; {w} emitted")).unwrap_or_default();
                format!(
                    "{}: no bindings generated due to {errors}{tail}",
                    self.paint(RED, "error")
                )
            }
        };
        self.line(&summary);
    }
}

#[cfg(test)]
mod tests;
