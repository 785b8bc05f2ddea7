use genero_core::model;
use genero_core::query::word_range_at;
use genero_core::scanner::split_lines;
use genero_core::util::{byte_col_to_utf16_col, utf16_col_to_byte_col};
use std::path::PathBuf;
use tower_lsp::lsp_types::*;

pub fn uri_to_path(uri: &Url) -> Option<PathBuf> {
    uri.to_file_path().ok()
}

/// Form files get their own keyword table.
pub fn is_form_file(uri: &Url) -> bool {
    uri.path().to_ascii_lowercase().ends_with(".per")
}

pub fn to_lsp_position(lines: &[&str], line: usize, byte_col: usize) -> Position {
    let character = lines
        .get(line)
        .map(|text| byte_col_to_utf16_col(text, byte_col))
        .unwrap_or(byte_col);
    Position::new(line as u32, character as u32)
}

/// Converts a byte-column range from the scanner into an LSP range.
pub fn to_lsp_range(lines: &[&str], range: &model::Range) -> Range {
    Range {
        start: to_lsp_position(lines, range.start_line, range.start_col),
        end: to_lsp_position(lines, range.end_line, range.end_col),
    }
}

/// A range spanning the first occurrence of `word` on `line`, or the
/// start of the line when the word is not on it.
pub fn word_range_on_line(lines: &[&str], line: usize, word: &str) -> Range {
    let text = lines.get(line).copied().unwrap_or("");
    match text.find(word) {
        Some(col) => to_lsp_range(lines, &model::Range::on_line(line, col, col + word.len())),
        None => Range::new(Position::new(line as u32, 0), Position::new(line as u32, 0)),
    }
}

/// The identifier under the cursor, with the zero-based line it is on.
pub fn word_at_position(text: &str, position: Position) -> Option<(usize, String)> {
    let lines = split_lines(text);
    let line = position.line as usize;
    let line_text = lines.get(line)?;
    let byte_col = utf16_col_to_byte_col(line_text, position.character as usize);
    let (start, end) = word_range_at(line_text, byte_col)?;
    Some((line, line_text[start..end].to_string()))
}

/// Byte offset of an LSP position in `text`.
pub fn offset_at(text: &str, position: Position) -> usize {
    let mut line = 0;
    let mut offset = 0;
    let mut chars = text.chars().peekable();

    while line < position.line as usize {
        if let Some(c) = chars.next() {
            offset += c.len_utf8();
            if c == '\n' {
                line += 1;
            } else if c == '\r' {
                if let Some(next) = chars.next_if_eq(&'\n') {
                    offset += next.len_utf8();
                }
                line += 1;
            }
        } else {
            return offset;
        }
    }

    let mut utf16_count = 0;
    while utf16_count < position.character as usize {
        match chars.next() {
            Some('\n') | Some('\r') | None => break,
            Some(c) => {
                utf16_count += c.len_utf16();
                offset += c.len_utf8();
            }
        }
    }
    offset
}

/// Applies a `didChange` batch in order. A change without a range replaces
/// the whole text.
pub fn apply_content_changes(text: &str, changes: &[TextDocumentContentChangeEvent]) -> String {
    let mut content = text.to_string();
    for change in changes {
        match change.range {
            Some(range) => {
                let start = offset_at(&content, range.start);
                let end = offset_at(&content, range.end).max(start);
                content.replace_range(start..end, &change.text);
            }
            None => content = change.text.clone(),
        }
    }
    content
}
