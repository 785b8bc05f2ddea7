use genero_core::Scanner;
use genero_core::model::StructuralModel;
use std::path::Path;
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Tabled)]
struct FunctionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Lines")]
    lines: String,
    #[tabled(rename = "Parameters")]
    parameters: String,
    #[tabled(rename = "Returns")]
    returns: String,
}

#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    type_name: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Line")]
    line: usize,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Record")]
    name: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Fields")]
    fields: usize,
    #[tabled(rename = "Line")]
    line: usize,
}

#[derive(Tabled)]
struct CallRow {
    #[tabled(rename = "Call")]
    name: String,
    #[tabled(rename = "Line")]
    line: usize,
}

fn function_rows(model: &StructuralModel) -> Vec<FunctionRow> {
    model
        .functions
        .iter()
        .map(|f| FunctionRow {
            name: f.name.clone(),
            kind: f.kind.to_string(),
            lines: match f.end_line {
                Some(end) => format!("{}-{}", f.start_line + 1, end + 1),
                None => format!("{}-?", f.start_line + 1),
            },
            parameters: f
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.name, p.type_name))
                .collect::<Vec<_>>()
                .join(", "),
            returns: f
                .returns
                .iter()
                .map(|r| r.type_name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

fn variable_rows(model: &StructuralModel) -> Vec<VariableRow> {
    model
        .variables
        .iter()
        .map(|v| VariableRow {
            name: v.name.clone(),
            type_name: v.type_name.clone(),
            scope: v.scope.to_string(),
            line: v.line + 1,
        })
        .collect()
}

fn record_rows(model: &StructuralModel) -> Vec<RecordRow> {
    model
        .records
        .iter()
        .map(|r| RecordRow {
            name: r.name.clone(),
            scope: r.scope.to_string(),
            fields: r.fields.len(),
            line: r.line + 1,
        })
        .collect()
}

fn call_rows(model: &StructuralModel) -> Vec<CallRow> {
    model
        .calls
        .iter()
        .map(|c| CallRow {
            name: c.name.clone(),
            line: c.line + 1,
        })
        .collect()
}

fn print_section<T: Tabled>(title: &str, rows: Vec<T>) {
    println!("{}:", title);
    if rows.is_empty() {
        println!("  (none)");
    } else {
        println!("{}", Table::new(rows));
    }
    println!();
}

pub fn run(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let model = Scanner::scan(&text);
    info!("Scanned {}: {} lines", path.display(), model.line_count);

    if json {
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    print_section("Functions", function_rows(&model));
    print_section("Variables", variable_rows(&model));
    print_section("Records", record_rows(&model));
    print_section("Calls", call_rows(&model));
    println!("{} style diagnostics", model.diagnostics.len());
    Ok(())
}
