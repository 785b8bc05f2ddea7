use crate::LspServer;
use crate::keywords::{find_keyword, keywords_for};
use crate::util::{is_form_file, word_at_position};
use genero_core::model::{FunctionDef, RecordDef, Scope, StructuralModel, VariableDef};
use genero_core::query::{function_at_line, visible_variable};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

pub async fn hover(server: &LspServer, params: HoverParams) -> Result<Option<Hover>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let Some(doc) = server.documents.get(uri.as_str()) else {
        return Ok(None);
    };
    let Some((line, word)) = word_at_position(&doc.text, position) else {
        return Ok(None);
    };

    let text = build_hover_text(&doc.model, &word, line, is_form_file(&uri));
    Ok(text.map(|value| Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: None,
    }))
}

/// Hover text for `word` seen from `line`: a function of the document, a
/// record or variable visible there, or a keyword, in that order.
pub fn build_hover_text(
    model: &StructuralModel,
    word: &str,
    line: usize,
    form_file: bool,
) -> Option<String> {
    if let Some(function) = model.function(word) {
        return Some(function_hover(function));
    }
    if let Some(record) = visible_record(model, word, line) {
        return Some(record_hover(record));
    }
    if let Some(variable) = visible_variable(model, word, line) {
        return Some(variable_hover(variable));
    }
    find_keyword(keywords_for(form_file), word)
        .map(|k| format!("**{}** *{}*\n\n{}", k.name, k.kind, k.description))
}

fn visible_record<'a>(model: &'a StructuralModel, name: &str, line: usize) -> Option<&'a RecordDef> {
    let enclosing = function_at_line(model, line).map(|f| f.name.as_str());
    model.records.iter().find(|r| {
        r.name == name
            && match &r.scope {
                Scope::Module => true,
                Scope::Function(owner) => Some(owner.as_str()) == enclosing,
            }
    })
}

fn function_hover(function: &FunctionDef) -> String {
    let params = function
        .parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.type_name))
        .collect::<Vec<_>>()
        .join(", ");
    let returns = if function.returns.is_empty() {
        "void".to_string()
    } else {
        function
            .returns
            .iter()
            .map(|r| r.type_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "**Function**: {}\n**Parameters**: {}\n**Returns**: {}",
        function.name, params, returns
    )
}

fn variable_hover(variable: &VariableDef) -> String {
    match &variable.scope {
        Scope::Module => format!("**Type**: {}", variable.type_name),
        Scope::Function(owner) => format!("**Type**: {}\n**Scope**: {}", variable.type_name, owner),
    }
}

fn record_hover(record: &RecordDef) -> String {
    let mut text = format!("**Record**: {}\n**Fields**:", record.name);
    for field in &record.fields {
        text.push_str(&format!("\n- {}: {}", field.name, field.type_name));
    }
    text
}
