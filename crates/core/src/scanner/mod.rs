//! Single-pass structural scanner.
//!
//! [`Scanner::scan`] walks the document once, line by line, and runs a flat
//! sequence of recognizers against each line. Recognizers that need more than
//! one physical line read ahead through [`joiner`] without consuming the
//! lines they look at, so every line still gets its own full pass.

pub mod classify;
pub mod joiner;
pub mod scope;
pub mod style;

use crate::model::{
    CallSite, FunctionDef, FunctionKind, MAIN_BLOCK, Parameter, RecordDef, RecordField,
    ReturnValue, Scope, StructuralModel, VariableDef,
};
use scope::ScopeTracker;

/// Splits a document into physical lines, dropping the `\r` of CRLF endings.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

pub struct Scanner;

impl Scanner {
    /// Builds the structural model of `text`. Never fails: malformed
    /// constructs are left open and unknown lines are ignored.
    pub fn scan(text: &str) -> StructuralModel {
        let raw = split_lines(text);
        let code: Vec<&str> = raw.iter().map(|line| classify::strip_comment(line)).collect();

        let mut builder = ModelBuilder {
            raw: &raw,
            code: &code,
            model: StructuralModel {
                line_count: raw.len(),
                ..StructuralModel::default()
            },
            tracker: ScopeTracker::new(),
        };

        for line in 0..raw.len() {
            builder.process_line(line);
        }

        let model = builder.model;
        tracing::debug!(
            lines = model.line_count,
            functions = model.functions.len(),
            variables = model.variables.len(),
            records = model.records.len(),
            calls = model.calls.len(),
            diagnostics = model.diagnostics.len(),
            "scanned document"
        );
        model
    }
}

struct ModelBuilder<'a> {
    raw: &'a [&'a str],
    code: &'a [&'a str],
    model: StructuralModel,
    tracker: ScopeTracker,
}

impl ModelBuilder<'_> {
    fn process_line(&mut self, line: usize) {
        let code = self.code[line].trim();

        self.open_block(line, code);
        self.return_statement(line, code);
        self.end_block(line, code);
        self.declaration(line, code);
        self.record(line, code);
        self.call(line, code);
        self.nesting(code);
        style::check_line(line, self.raw[line], self.code[line], &mut self.model.diagnostics);
    }

    fn current_function(&self) -> Option<&FunctionDef> {
        self.tracker.current().map(|i| &self.model.functions[i])
    }

    fn current_scope(&self) -> Scope {
        match self.current_function() {
            Some(f) => Scope::Function(f.name.clone()),
            None => Scope::Module,
        }
    }

    fn open_block(&mut self, line: usize, code: &str) {
        let function = if classify::is_main_open(code) {
            FunctionDef::new(MAIN_BLOCK, FunctionKind::Main, line)
        } else if let Some(kind) = classify::header_open(code) {
            let statement = joiner::join_header(self.code, line);
            let Some(header) = classify::parse_header(&statement) else {
                return;
            };
            let mut function = FunctionDef::new(header.name, kind, line);
            function.parameters = header
                .parameters
                .into_iter()
                .map(|(name, type_name)| Parameter { name, type_name })
                .collect();
            function
        } else {
            return;
        };

        if let Some(open) = self.current_function() {
            tracing::trace!(
                open = %open.name,
                next = %function.name,
                line,
                "block opened before previous one was closed"
            );
        }
        self.model.functions.push(function);
        self.tracker.enter_function(self.model.functions.len() - 1);
    }

    fn return_statement(&mut self, line: usize, code: &str) {
        let Some(index) = self.tracker.current() else {
            return;
        };
        let Some(list) = classify::return_list(code) else {
            return;
        };
        let statement = joiner::join_trailing_commas(self.code, line, list);

        let resolved: Vec<ReturnValue> = classify::return_identifiers(&statement)
            .into_iter()
            .filter_map(|name| {
                let function = &self.model.functions[index];
                function
                    .variables
                    .iter()
                    .find(|v| v.name == name)
                    .or_else(|| self.model.module_variables().find(|v| v.name == name))
                    .map(|v| ReturnValue {
                        name: v.name.clone(),
                        type_name: v.type_name.clone(),
                    })
            })
            .collect();

        let returns = &mut self.model.functions[index].returns;
        for value in resolved {
            if !returns.iter().any(|r| r.name == value.name) {
                returns.push(value);
            }
        }
    }

    fn end_block(&mut self, line: usize, code: &str) {
        let Some(kind) = classify::block_end(code) else {
            return;
        };
        let Some(open) = self.current_function() else {
            return;
        };
        if open.kind != kind {
            tracing::trace!(open = %open.name, line, "END {} does not close {}", kind, open.kind);
            return;
        }
        if self.tracker.depth() != 1 {
            tracing::trace!(
                function = %open.name,
                depth = self.tracker.depth(),
                line,
                "block closed with unbalanced nesting"
            );
        }
        let Some(index) = self.tracker.leave_function() else {
            return;
        };
        let function = &mut self.model.functions[index];
        function.end_line = Some(line);
        backfill_parameter_types(function);
    }

    fn declaration(&mut self, line: usize, code: &str) {
        if let Some(header) = classify::record_header(code) {
            let scope = self.current_scope();
            self.declare(VariableDef {
                name: header.name,
                type_name: header.type_name,
                scope,
                line,
            });
            return;
        }
        let Some(body) = classify::define_body(code) else {
            return;
        };
        let statement = joiner::join_trailing_commas(self.code, line, body);
        let scope = self.current_scope();
        for (name, type_name) in classify::parse_declarations(&statement) {
            self.declare(VariableDef {
                name,
                type_name,
                scope: scope.clone(),
                line,
            });
        }
    }

    fn record(&mut self, line: usize, code: &str) {
        let Some(header) = classify::record_header(code) else {
            return;
        };
        let scope = self.current_scope();
        let mut record = RecordDef {
            name: header.name,
            scope: scope.clone(),
            fields: header
                .fields
                .into_iter()
                .map(|(name, type_name)| RecordField { name, type_name })
                .collect(),
            line,
        };

        if header.has_body {
            for (_, text) in joiner::record_body(self.code, line) {
                if let Some((name, type_name)) = classify::record_field(text) {
                    record.fields.push(RecordField { name, type_name });
                }
            }
        }

        for field in &record.fields {
            self.declare(VariableDef {
                name: format!("{}.{}", record.name, field.name),
                type_name: field.type_name.clone(),
                scope: scope.clone(),
                line,
            });
        }
        self.model.records.push(record);
    }

    fn call(&mut self, line: usize, code: &str) {
        if let Some(name) = classify::call_target(code) {
            self.model.calls.push(CallSite {
                name: name.to_string(),
                line,
            });
        }
    }

    fn nesting(&mut self, code: &str) {
        if classify::opens_nesting(code) {
            self.tracker.open_nesting();
        } else if classify::closes_nesting(code) {
            self.tracker.close_nesting();
        }
    }

    fn declare(&mut self, variable: VariableDef) {
        if let Some(index) = self.tracker.current() {
            self.model.functions[index].variables.push(variable.clone());
        }
        self.model.variables.push(variable);
    }
}

/// Copies the type of each parameter's `DEFINE` in the function body onto
/// the parameter. Undeclared parameters keep the type they already have.
fn backfill_parameter_types(function: &mut FunctionDef) {
    for param in &mut function.parameters {
        if let Some(var) = function.variables.iter().find(|v| v.name == param.name) {
            param.type_name = var.type_name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiagnosticCode, UNKNOWN_TYPE};

    #[test]
    fn function_parameters_take_types_from_body_defines() {
        let src = "FUNCTION add(a, b)\n    DEFINE a INTEGER\n    DEFINE b DECIMAL(10,2)\n    RETURN a\nEND FUNCTION\n";
        let model = Scanner::scan(src);
        let f = &model.functions[0];
        assert_eq!(f.name, "add");
        assert_eq!(f.start_line, 0);
        assert_eq!(f.end_line, Some(4));
        assert_eq!(f.parameters[0].type_name, "INTEGER");
        assert_eq!(f.parameters[1].type_name, "DECIMAL(10,2)");
        assert_eq!(f.returns.len(), 1);
        assert_eq!(f.returns[0].type_name, "INTEGER");
    }

    #[test]
    fn undeclared_parameter_stays_unknown() {
        let model = Scanner::scan("FUNCTION f(x)\nEND FUNCTION");
        assert_eq!(model.functions[0].parameters[0].type_name, UNKNOWN_TYPE);
    }

    #[test]
    fn main_block_is_a_synthetic_function() {
        let model = Scanner::scan("MAIN\n  DEFINE i INTEGER\nEND MAIN");
        let main = &model.functions[0];
        assert_eq!(main.name, MAIN_BLOCK);
        assert_eq!(main.kind, FunctionKind::Main);
        assert_eq!(main.end_line, Some(2));
        assert_eq!(model.variables[0].scope, Scope::Function("MAIN".into()));
    }

    #[test]
    fn unterminated_function_stays_open() {
        let model = Scanner::scan("FUNCTION f()\n  DEFINE x INTEGER\n");
        assert!(model.functions[0].is_open());
    }

    #[test]
    fn unresolved_return_names_are_dropped() {
        let src = "DEFINE g STRING\nFUNCTION f()\n  DEFINE x INTEGER\n  RETURN x,\n    g,\n    missing\nEND FUNCTION";
        let model = Scanner::scan(src);
        let names: Vec<&str> = model.functions[0]
            .returns
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["x", "g"]);
    }

    #[test]
    fn record_fields_become_dotted_variables() {
        let src = "FUNCTION f()\n  DEFINE r RECORD\n    id INTEGER,\n    name STRING\n  END RECORD\nEND FUNCTION";
        let model = Scanner::scan(src);
        let record = &model.records[0];
        assert_eq!(record.name, "r");
        assert_eq!(record.scope, Scope::Function("f".into()));
        assert_eq!(record.fields.len(), 2);

        let names: Vec<&str> = model.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["r", "r.id", "r.name"]);
        assert!(model.variables.iter().all(|v| v.scope == Scope::Function("f".into())));
        assert_eq!(model.functions[0].variables.len(), 3);
    }

    #[test]
    fn one_line_record_does_not_swallow_following_lines() {
        let src = "FUNCTION f()\n DEFINE r RECORD id INTEGER, name STRING END RECORD\n LET total = 1\n CALL g()\nEND FUNCTION\nFUNCTION h()\n DEFINE q RECORD\n a INTEGER\n END RECORD\nEND FUNCTION";
        let model = Scanner::scan(src);

        let r = &model.records[0];
        let fields: Vec<(&str, &str)> = r
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_name.as_str()))
            .collect();
        assert_eq!(fields, vec![("id", "INTEGER"), ("name", "STRING")]);
        assert_eq!(model.records[1].name, "q");
        assert_eq!(model.records[1].fields.len(), 1);

        let decls: Vec<(&str, &str)> = model
            .variables
            .iter()
            .map(|v| (v.name.as_str(), v.type_name.as_str()))
            .collect();
        assert_eq!(
            decls,
            vec![
                ("r", "RECORD"),
                ("r.id", "INTEGER"),
                ("r.name", "STRING"),
                ("q", "RECORD"),
                ("q.a", "INTEGER"),
            ]
        );
        assert_eq!(model.functions[0].end_line, Some(4));
        assert_eq!(model.functions[1].variables.len(), 2);
    }

    #[test]
    fn parenthesised_parameter_types_survive_wrapping() {
        let single = Scanner::scan("FUNCTION f(a DECIMAL(10,2), b INTEGER)\nEND FUNCTION");
        let wrapped = Scanner::scan("FUNCTION f(a DECIMAL(10,2),\n    b INTEGER)\nEND FUNCTION");
        for model in [&single, &wrapped] {
            let params: Vec<(&str, &str)> = model.functions[0]
                .parameters
                .iter()
                .map(|p| (p.name.as_str(), p.type_name.as_str()))
                .collect();
            assert_eq!(params, vec![("a", "DECIMAL(10,2)"), ("b", "INTEGER")]);
        }
        assert_eq!(wrapped.functions[0].end_line, Some(2));
    }

    #[test]
    fn end_of_another_block_kind_does_not_close() {
        let model = Scanner::scan("FUNCTION f()\nEND REPORT\n  DEFINE x INTEGER\nEND FUNCTION");
        let f = &model.functions[0];
        assert_eq!(f.end_line, Some(3));
        assert_eq!(f.variables.len(), 1);
    }

    #[test]
    fn record_like_has_no_fields() {
        let model = Scanner::scan("DEFINE c RECORD LIKE customer.*\nDEFINE x INTEGER");
        assert!(model.records[0].fields.is_empty());
        assert_eq!(model.variables.len(), 2);
    }

    #[test]
    fn multi_line_define_list() {
        let model = Scanner::scan("DEFINE a INTEGER,\n       b, c STRING\n");
        let decls: Vec<(&str, &str)> = model
            .variables
            .iter()
            .map(|v| (v.name.as_str(), v.type_name.as_str()))
            .collect();
        assert_eq!(decls, vec![("a", "INTEGER"), ("b", "STRING"), ("c", "STRING")]);
        assert!(model.variables.iter().all(|v| v.line == 0));
    }

    #[test]
    fn comments_do_not_declare() {
        let model = Scanner::scan("# DEFINE x INTEGER\nLET y = 1 -- CALL nothing()");
        assert!(model.variables.is_empty());
        assert!(model.calls.is_empty());
    }

    #[test]
    fn crlf_endings_are_not_trailing_whitespace() {
        let model = Scanner::scan("MAIN\r\n  CALL f()\r\nEND MAIN\r\n");
        assert!(model.diagnostics.is_empty());
        assert_eq!(model.calls[0].line, 1);
    }

    #[test]
    fn declaration_line_can_also_carry_style_diagnostics() {
        let model = Scanner::scan("DEFINE x INTEGER  ");
        assert_eq!(model.variables.len(), 1);
        assert_eq!(model.diagnostics[0].code, DiagnosticCode::TrailingWhitespace);
    }
}
