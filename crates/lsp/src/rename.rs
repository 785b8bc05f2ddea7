use crate::LspServer;
use crate::util::{to_lsp_range, word_at_position};
use genero_core::query::{TextReplacement, references_of, rename as rename_references, visible_variable};
use genero_core::scanner::split_lines;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][\w.]*$").unwrap());

pub fn is_valid_name(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !name.ends_with('.')
}

pub fn to_text_edits(lines: &[&str], replacements: &[TextReplacement]) -> Vec<TextEdit> {
    replacements
        .iter()
        .map(|r| TextEdit {
            range: to_lsp_range(lines, &r.range),
            new_text: r.new_text.clone(),
        })
        .collect()
}

pub async fn rename(server: &LspServer, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
    let uri = params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;
    let new_name = params.new_name;

    if !is_valid_name(&new_name) {
        return Err(Error::invalid_params(format!(
            "'{}' is not a valid identifier",
            new_name
        )));
    }

    let Some(doc) = server.documents.get(uri.as_str()) else {
        return Ok(None);
    };
    let Some((line, word)) = word_at_position(&doc.text, position) else {
        return Ok(None);
    };
    let Some(variable) = visible_variable(&doc.model, &word, line) else {
        return Ok(None);
    };

    let references = references_of(&doc.model, &doc.text, variable);
    let Some(replacements) = rename_references(Some(&doc.model), &references, &new_name) else {
        return Ok(None);
    };

    let lines = split_lines(&doc.text);
    let mut changes = HashMap::new();
    changes.insert(uri, to_text_edits(&lines, &replacements));
    Ok(Some(WorkspaceEdit {
        changes: Some(changes),
        document_changes: None,
        change_annotations: None,
    }))
}
