use super::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source label attached to style diagnostics.
pub const STYLE_SOURCE: &str = "genero-lsp";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Hint,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    #[serde(rename = "style/empty-line")]
    EmptyLine,
    #[serde(rename = "style/trailing-whitespace")]
    TrailingWhitespace,
    #[serde(rename = "style/unspaced-comma")]
    UnspacedComma,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::EmptyLine => "style/empty-line",
            DiagnosticCode::TrailingWhitespace => "style/trailing-whitespace",
            DiagnosticCode::UnspacedComma => "style/unspaced-comma",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DiagnosticCode::EmptyLine => "Empty line",
            DiagnosticCode::TrailingWhitespace => "Trailing whitespace",
            DiagnosticCode::UnspacedComma => "Missing space after comma",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "style/empty-line" => Some(DiagnosticCode::EmptyLine),
            "style/trailing-whitespace" => Some(DiagnosticCode::TrailingWhitespace),
            "style/unspaced-comma" => Some(DiagnosticCode::UnspacedComma),
            _ => None,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A formatting hint found by the scanner. Ranges are byte columns within
/// a single line, half-open.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StyleDiagnostic {
    pub severity: Severity,
    pub range: Range,
    pub message: String,
    pub code: DiagnosticCode,
}

impl StyleDiagnostic {
    pub fn new(code: DiagnosticCode, line: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            severity: Severity::Hint,
            range: Range::on_line(line, start_col, end_col),
            message: code.message().to_string(),
            code,
        }
    }

    pub fn line(&self) -> usize {
        self.range.start_line
    }
}
