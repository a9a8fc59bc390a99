//! Diagnostic emitters.
//!
//! Human-readable terminal output with optional ANSI color support. The
//! engine never formats user-facing messages itself; the CLI picks an
//! emitter and hands it the structured diagnostics.

use std::io::{self, Write};

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Severity};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic against its template source.
    fn emit(&mut self, diagnostic: &Diagnostic, source: Option<&str>);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic], source: Option<&str>) {
        for diag in diagnostics {
            self.emit(diag, source);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colors: bool) -> Self {
        TerminalEmitter { writer, colors }
    }

    /// Create a terminal emitter for stderr.
    pub fn stderr(colors: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter {
            writer: io::stderr(),
            colors,
        }
    }

    fn color(&self, code: &'static str) -> &'static str {
        if self.colors {
            code
        } else {
            ""
        }
    }

    fn severity_color(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Error => self.color(colors::ERROR),
            Severity::Warning => self.color(colors::WARNING),
            Severity::Note => self.color(colors::NOTE),
        }
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, source: Option<&str>) {
        let sev = self.severity_color(diagnostic.severity);
        let bold = self.color(colors::BOLD);
        let reset = self.color(colors::RESET);

        let _ = writeln!(
            self.writer,
            "{sev}{}[{}]{reset}{bold}: {}{reset}",
            diagnostic.severity, diagnostic.code, diagnostic.message
        );

        let table = source.map(LineOffsetTable::build);
        for label in &diagnostic.labels {
            let location = match (&table, source) {
                (Some(table), Some(src)) => {
                    let (line, col) = table.span_position(src, label.span);
                    format!("{line}:{col}")
                }
                _ => format!("{:?}", label.span),
            };
            let template = diagnostic.template.as_deref().unwrap_or("<template>");
            let arrow = if label.is_primary {
                format!("{bold}-->{reset}")
            } else {
                format!("{}---{reset}", self.color(colors::SECONDARY))
            };
            let _ = writeln!(
                self.writer,
                "  {arrow} {template}:{location}: {}",
                label.message
            );
        }

        for note in &diagnostic.notes {
            let _ = writeln!(
                self.writer,
                "  {}note{reset}: {note}",
                self.color(colors::NOTE)
            );
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }
        let reset = self.color(colors::RESET);
        let mut parts = Vec::new();
        if error_count > 0 {
            parts.push(format!(
                "{}{error_count} error{}{reset}",
                self.color(colors::ERROR),
                plural_s(error_count)
            ));
        }
        if warning_count > 0 {
            parts.push(format!(
                "{}{warning_count} warning{}{reset}",
                self.color(colors::WARNING),
                plural_s(warning_count)
            ));
        }
        let _ = writeln!(self.writer, "{}", parts.join(", "));
    }
}
