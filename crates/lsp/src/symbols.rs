use crate::LspServer;
use crate::util::word_range_on_line;
use genero_core::model::{FunctionDef, FunctionKind, RecordDef, Scope, StructuralModel};
use genero_core::scanner::split_lines;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

pub async fn document_symbol(
    server: &LspServer,
    params: DocumentSymbolParams,
) -> Result<Option<DocumentSymbolResponse>> {
    let Some(doc) = server.documents.get(params.text_document.uri.as_str()) else {
        return Ok(None);
    };
    let lines = split_lines(&doc.text);
    let symbols = build_document_symbols(&doc.model, &lines);
    Ok(Some(DocumentSymbolResponse::Nested(symbols)))
}

#[allow(deprecated)]
fn symbol(
    name: &str,
    detail: Option<String>,
    kind: SymbolKind,
    range: Range,
    selection_range: Range,
    children: Vec<DocumentSymbol>,
) -> DocumentSymbol {
    DocumentSymbol {
        name: name.to_string(),
        detail,
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range,
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    }
}

fn line_symbol(lines: &[&str], line: usize, name: &str, detail: String, kind: SymbolKind) -> DocumentSymbol {
    let selection = word_range_on_line(lines, line, name);
    let width = lines.get(line).map_or(0, |l| l.encode_utf16().count()) as u32;
    let range = Range::new(
        Position::new(line as u32, 0),
        Position::new(line as u32, width.max(selection.end.character)),
    );
    symbol(name, Some(detail), kind, range, selection, Vec::new())
}

fn record_symbol(lines: &[&str], record: &RecordDef) -> DocumentSymbol {
    let mut node = line_symbol(lines, record.line, &record.name, "RECORD".to_string(), SymbolKind::STRUCT);
    let fields: Vec<DocumentSymbol> = record
        .fields
        .iter()
        .map(|f| {
            symbol(
                &f.name,
                Some(f.type_name.clone()),
                SymbolKind::FIELD,
                node.range,
                node.selection_range,
                Vec::new(),
            )
        })
        .collect();
    if !fields.is_empty() {
        node.children = Some(fields);
    }
    node
}

fn function_symbol(model: &StructuralModel, lines: &[&str], function: &FunctionDef) -> DocumentSymbol {
    let end_line = function.end_line.unwrap_or_else(|| model.last_line());
    let end_width = lines.get(end_line).map_or(0, |l| l.encode_utf16().count()) as u32;
    let range = Range::new(
        Position::new(function.start_line as u32, 0),
        Position::new(end_line as u32, end_width),
    );
    let selection = word_range_on_line(lines, function.start_line, &function.name);

    let mut children: Vec<DocumentSymbol> = function
        .parameters
        .iter()
        .map(|p| {
            symbol(
                &p.name,
                Some(p.type_name.clone()),
                SymbolKind::VARIABLE,
                selection,
                selection,
                Vec::new(),
            )
        })
        .collect();

    let scope = Scope::Function(function.name.clone());
    for variable in &function.variables {
        if variable.name.contains('.') || model.record(&variable.name).is_some_and(|r| r.scope == scope) {
            continue;
        }
        if function.parameters.iter().any(|p| p.name == variable.name) {
            continue;
        }
        children.push(line_symbol(
            lines,
            variable.line,
            &variable.name,
            variable.type_name.clone(),
            SymbolKind::VARIABLE,
        ));
    }
    children.extend(
        model
            .records
            .iter()
            .filter(|r| r.scope == scope && function.contains_line(r.line))
            .map(|r| record_symbol(lines, r)),
    );

    let kind = match function.kind {
        FunctionKind::Main => SymbolKind::MODULE,
        FunctionKind::Function | FunctionKind::Report => SymbolKind::FUNCTION,
    };
    symbol(&function.name, Some(function.signature()), kind, range, selection, children)
}

/// Outline of a document: module variables and records, then every
/// function, report and `MAIN` block with its parameters and locals.
pub fn build_document_symbols(model: &StructuralModel, lines: &[&str]) -> Vec<DocumentSymbol> {
    let mut symbols: Vec<DocumentSymbol> = Vec::new();

    for variable in model.module_variables() {
        if variable.name.contains('.') || model.record(&variable.name).is_some_and(|r| r.scope.is_module()) {
            continue;
        }
        symbols.push(line_symbol(
            lines,
            variable.line,
            &variable.name,
            variable.type_name.clone(),
            SymbolKind::VARIABLE,
        ));
    }
    symbols.extend(
        model
            .records
            .iter()
            .filter(|r| r.scope.is_module())
            .map(|r| record_symbol(lines, r)),
    );
    symbols.extend(model.functions.iter().map(|f| function_symbol(model, lines, f)));
    symbols
}
