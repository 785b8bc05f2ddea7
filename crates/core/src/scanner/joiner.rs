//! Reconstruction of logical statements that span several physical lines.
//!
//! All functions take the comment-stripped view of the document (one entry
//! per physical line) and never move the builder's cursor: continuation lines
//! are still visited by the per-line pass afterwards.

use super::classify;

/// Joins a function/report header with following lines until the parentheses
/// of its parameter list balance or the document ends.
pub fn join_header(code: &[&str], start: usize) -> String {
    let mut statement = code[start].trim().to_string();
    if !classify::header_needs_continuation(&statement) {
        return statement;
    }
    for line in code.iter().skip(start + 1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        statement.push(' ');
        statement.push_str(line);
        if !classify::header_needs_continuation(&statement) {
            break;
        }
    }
    statement
}

/// Joins a statement ending in a trailing comma with the lines that continue
/// it, stopping at the first line whose accumulated text no longer ends in a
/// comma.
pub fn join_trailing_commas(code: &[&str], start: usize, first: &str) -> String {
    let mut statement = first.trim().to_string();
    let mut next = start + 1;
    while statement.ends_with(',') && next < code.len() {
        let line = code[next].trim();
        next += 1;
        if line.is_empty() {
            continue;
        }
        statement.push(' ');
        statement.push_str(line);
    }
    statement
}

/// Collects the `(line, text)` pairs of a record body: the lines after the
/// declaration up to, but excluding, the matching `END RECORD`. Nested
/// `RECORD … END RECORD` bodies are skipped as a whole; only their header
/// line is returned. A body missing its `END RECORD` stops at the end of the
/// enclosing block or at the next block header.
pub fn record_body<'a>(code: &[&'a str], start: usize) -> Vec<(usize, &'a str)> {
    let mut body = Vec::new();
    let mut depth = 0usize;
    for (line_no, line) in code.iter().enumerate().skip(start + 1) {
        let line = line.trim();
        if classify::is_record_end(line) {
            if depth == 0 {
                break;
            }
            depth -= 1;
            continue;
        }
        if classify::block_end(line).is_some()
            || classify::header_open(line).is_some()
            || classify::is_main_open(line)
        {
            break;
        }
        if line.is_empty() {
            continue;
        }
        if depth == 0 {
            body.push((line_no, line));
        }
        if let Some((_, field_type)) = classify::record_field(line) {
            if classify::opens_nested_record(&field_type) {
                depth += 1;
            }
        }
    }
    body
}
