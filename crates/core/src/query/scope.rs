use crate::model::{FunctionDef, Scope, StructuralModel, VariableDef};

/// The function, report or `MAIN` block whose line interval contains `line`.
/// Functions are searched in ascending start order and the first match
/// wins; an unterminated block extends to the end of the document.
pub fn function_at_line(model: &StructuralModel, line: usize) -> Option<&FunctionDef> {
    // Functions are pushed in scan order, so they are already sorted by
    // start line; the partition point bounds the candidates.
    let candidates = model.functions.partition_point(|f| f.start_line <= line);
    model.functions[..candidates]
        .iter()
        .find(|f| f.contains_line(line))
}

fn visible_from(variable: &VariableDef, function: Option<&FunctionDef>) -> bool {
    match (&variable.scope, function) {
        (Scope::Module, _) => true,
        (Scope::Function(owner), Some(f)) => *owner == f.name,
        (Scope::Function(_), None) => false,
    }
}

/// Resolves `name` as seen from `line`: a declaration in the enclosing
/// function takes precedence over a module-level one.
pub fn visible_variable<'a>(
    model: &'a StructuralModel,
    name: &str,
    line: usize,
) -> Option<&'a VariableDef> {
    let function = function_at_line(model, line);
    if let Some(f) = function {
        if let Some(local) = f.variables.iter().find(|v| v.name == name) {
            return Some(local);
        }
    }
    model
        .variables
        .iter()
        .find(|v| v.name == name && visible_from(v, function))
}

/// Every variable visible from `line`, module-level ones included, in
/// declaration order.
pub fn visible_variables(model: &StructuralModel, line: usize) -> Vec<&VariableDef> {
    let function = function_at_line(model, line);
    model
        .variables
        .iter()
        .filter(|v| visible_from(v, function))
        .collect()
}
