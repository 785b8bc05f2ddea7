use crate::model::{StructuralModel, VariableDef};
use crate::scanner::split_lines;
use serde::{Deserialize, Serialize};

/// Zero-based line and byte column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Byte range of the identifier touching `character` on `line_text`.
/// Identifiers include the `.` field separator, so `rec.field` is one word;
/// leading and trailing dots are not part of it.
pub fn word_range_at(line_text: &str, character: usize) -> Option<(usize, usize)> {
    let col = floor_char_boundary(line_text, character);

    let start = line_text[..col]
        .rfind(|c| !is_word_char(c))
        .map(|i| i + line_text[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    let end = line_text[col..]
        .find(|c| !is_word_char(c))
        .map(|i| i + col)
        .unwrap_or(line_text.len());

    let word = &line_text[start..end];
    let leading = word.len() - word.trim_start_matches('.').len();
    let trailing = word.len() - word.trim_end_matches('.').len();
    let (start, end) = (start + leading, end - trailing);
    (start < end).then_some((start, end))
}

/// The identifier touching `character` on `line_text`.
pub fn word_at(line_text: &str, character: usize) -> Option<&str> {
    word_range_at(line_text, character).map(|(start, end)| &line_text[start..end])
}

/// Looks up the identifier at `position` among all variables, regardless of
/// scope, and returns the first declaration with that exact name. Callers
/// apply visibility rules themselves (see [`super::visible_variable`]).
pub fn variable_at_position<'a>(
    model: &'a StructuralModel,
    text: &str,
    position: Position,
) -> Option<&'a VariableDef> {
    let lines = split_lines(text);
    let line_text = lines.get(position.line)?;
    let word = word_at(line_text, position.character)?;
    model.variables.iter().find(|v| v.name == word)
}
