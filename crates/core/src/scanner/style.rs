//! Per-line formatting checks.

use super::classify;
use crate::model::{DiagnosticCode, StyleDiagnostic};

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Runs every style check against one line. `raw` is the original line,
/// `code` its comment-stripped prefix.
pub fn check_line(line: usize, raw: &str, code: &str, out: &mut Vec<StyleDiagnostic>) {
    let empty = empty_line(line, raw);
    let is_empty = empty.is_some();
    out.extend(empty);
    if !is_empty {
        out.extend(trailing_whitespace(line, raw));
    }
    out.extend(unspaced_commas(line, code));
}

/// A line made only of spaces and tabs. Zero-length lines do not count.
pub fn empty_line(line: usize, raw: &str) -> Option<StyleDiagnostic> {
    if !raw.is_empty() && raw.bytes().all(is_blank) {
        Some(StyleDiagnostic::new(
            DiagnosticCode::EmptyLine,
            line,
            0,
            raw.len(),
        ))
    } else {
        None
    }
}

/// The run of spaces and tabs at the end of a line.
pub fn trailing_whitespace(line: usize, raw: &str) -> Option<StyleDiagnostic> {
    let trimmed = raw.trim_end_matches([' ', '\t']);
    if trimmed.len() == raw.len() {
        return None;
    }
    Some(StyleDiagnostic::new(
        DiagnosticCode::TrailingWhitespace,
        line,
        trimmed.len(),
        raw.len(),
    ))
}

/// Commas not followed by whitespace. A comma closing the line is a
/// continuation marker and is exempt; commas inside string literals are
/// ignored.
pub fn unspaced_commas(line: usize, code: &str) -> Vec<StyleDiagnostic> {
    let continuation = {
        let content = code.trim_end();
        content.ends_with(',').then(|| content.len() - 1)
    };

    let bytes = code.as_bytes();
    let mut found = Vec::new();
    for (i, b) in classify::code_bytes(code) {
        if b != b',' || Some(i) == continuation {
            continue;
        }
        let spaced = bytes.get(i + 1).is_some_and(|n| n.is_ascii_whitespace());
        if !spaced {
            found.push(StyleDiagnostic::new(
                DiagnosticCode::UnspacedComma,
                line,
                i,
                i + 1,
            ));
        }
    }
    found
}
