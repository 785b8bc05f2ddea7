use crate::LspServer;
use genero_core::model::DiagnosticCode;
use genero_core::model::diagnostic::STYLE_SOURCE;
use std::collections::HashMap;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

fn style_code(diagnostic: &Diagnostic) -> Option<DiagnosticCode> {
    if diagnostic.source.as_deref() != Some(STYLE_SOURCE) {
        return None;
    }
    match diagnostic.code.as_ref()? {
        NumberOrString::String(code) => DiagnosticCode::parse(code),
        NumberOrString::Number(_) => None,
    }
}

/// The quick fix for one of our style diagnostics. Diagnostics from other
/// sources get none.
pub fn quick_fix(uri: &Url, diagnostic: &Diagnostic) -> Option<CodeAction> {
    let (title, edit) = match style_code(diagnostic)? {
        DiagnosticCode::TrailingWhitespace => (
            "Remove trailing whitespace",
            TextEdit {
                range: diagnostic.range,
                new_text: String::new(),
            },
        ),
        DiagnosticCode::EmptyLine => (
            "Remove whitespace from empty line",
            TextEdit {
                range: diagnostic.range,
                new_text: String::new(),
            },
        ),
        DiagnosticCode::UnspacedComma => (
            "Insert space after comma",
            TextEdit {
                range: Range::new(diagnostic.range.end, diagnostic.range.end),
                new_text: " ".to_string(),
            },
        ),
    };

    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![edit]);
    Some(CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            document_changes: None,
            change_annotations: None,
        }),
        command: None,
        is_preferred: Some(true),
        disabled: None,
        data: None,
    })
}

pub async fn code_action(
    _server: &LspServer,
    params: CodeActionParams,
) -> Result<Option<CodeActionResponse>> {
    let uri = params.text_document.uri;
    let actions: Vec<CodeActionOrCommand> = params
        .context
        .diagnostics
        .iter()
        .filter_map(|d| quick_fix(&uri, d))
        .map(CodeActionOrCommand::CodeAction)
        .collect();
    Ok((!actions.is_empty()).then_some(actions))
}
