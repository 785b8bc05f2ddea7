use super::scope::function_at_line;
use crate::model::{Range, Scope, StructuralModel, VariableDef};
use crate::scanner::split_lines;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TextReplacement {
    pub range: Range,
    pub new_text: String,
}

/// Lines a variable can be referenced from: the whole document for module
/// variables, the owning function's interval otherwise.
fn visibility_lines(model: &StructuralModel, variable: &VariableDef, total: usize) -> (usize, usize) {
    let last = total.saturating_sub(1);
    let owner = match &variable.scope {
        Scope::Module => return (0, last),
        Scope::Function(name) => function_at_line(model, variable.line)
            .filter(|f| f.name == *name)
            .or_else(|| model.function(name)),
    };
    match owner {
        Some(f) => (f.start_line, f.end_line.unwrap_or(last).min(last)),
        None => (0, last),
    }
}

/// Every literal occurrence of the variable's name inside its visibility
/// boundary. This is a textual scan: a same-named declaration in an inner
/// scope is not told apart, and function-scoped names never leak outside
/// their function.
pub fn references_of(model: &StructuralModel, text: &str, variable: &VariableDef) -> Vec<Range> {
    let name = variable.name.trim();
    if name.is_empty() {
        return Vec::new();
    }
    let lines = split_lines(text);
    if lines.is_empty() {
        return Vec::new();
    }
    let (first, last) = visibility_lines(model, variable, lines.len());

    let mut found = Vec::new();
    for (line_no, line) in lines.iter().enumerate().take(last + 1).skip(first) {
        for (col, matched) in line.match_indices(name) {
            found.push(Range::on_line(line_no, col, col + matched.len()));
        }
    }
    found
}

/// One replacement per reference. Returns `None` when there is no model for
/// the document or nothing to rename; name collisions are not checked.
pub fn rename(
    model: Option<&StructuralModel>,
    references: &[Range],
    new_name: &str,
) -> Option<Vec<TextReplacement>> {
    model?;
    if references.is_empty() {
        return None;
    }
    Some(
        references
            .iter()
            .map(|range| TextReplacement {
                range: *range,
                new_text: new_name.to_string(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::visible_variable;
    use crate::scanner::Scanner;

    const SRC: &str = "\
DEFINE total INTEGER
FUNCTION a()
  DEFINE n INTEGER
  LET n = n + total
END FUNCTION
FUNCTION b()
  DEFINE n STRING
  LET n = \"x\"
  LET total = 0
END FUNCTION
";

    #[test]
    fn module_variable_occurrences_span_document() {
        let model = Scanner::scan(SRC);
        let total = visible_variable(&model, "total", 0).unwrap();
        let lines: Vec<usize> = references_of(&model, SRC, total)
            .iter()
            .map(|r| r.start_line)
            .collect();
        assert_eq!(lines, vec![0, 3, 8]);
    }

    #[test]
    fn function_variable_stays_in_its_function() {
        let model = Scanner::scan(SRC);
        let n_in_b = visible_variable(&model, "n", 7).unwrap();
        let refs = references_of(&model, SRC, n_in_b);
        assert!(refs.iter().all(|r| (5..=9).contains(&r.start_line)));
        assert_eq!(refs.len(), 2);

        let n_in_a = visible_variable(&model, "n", 3).unwrap();
        let refs = references_of(&model, SRC, n_in_a);
        assert_eq!(refs.len(), 3);
        assert!(refs.iter().all(|r| (1..=4).contains(&r.start_line)));
    }

    #[test]
    fn occurrences_advance_past_each_match() {
        let src = "DEFINE aa INTEGER\nLET aa = aaaa";
        let model = Scanner::scan(src);
        let refs = references_of(&model, src, &model.variables[0]);
        let cols: Vec<(usize, usize)> = refs.iter().map(|r| (r.start_line, r.start_col)).collect();
        assert_eq!(cols, vec![(0, 7), (1, 4), (1, 9), (1, 11)]);
    }

    #[test]
    fn rename_needs_model_and_references() {
        let model = Scanner::scan("DEFINE x INTEGER");
        let refs = references_of(&model, "DEFINE x INTEGER", &model.variables[0]);
        let edits = rename(Some(&model), &refs, "y").unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "y");
        assert!(rename(None, &refs, "y").is_none());
        assert!(rename(Some(&model), &[], "y").is_none());
    }
}
