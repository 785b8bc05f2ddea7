use crate::LspServer;
use crate::keywords::{Keyword, keywords_for};
use crate::util::is_form_file;
use genero_core::index::WorkspaceIndex;
use genero_core::model::{FunctionDef, StructuralModel, VariableDef};
use genero_core::query::visible_variables;
use genero_core::scanner::split_lines;
use genero_core::util::utf16_col_to_byte_col;
use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

static MEMBER_ACCESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\.(\w*)$").unwrap());

pub async fn completion(
    server: &LspServer,
    params: CompletionParams,
) -> Result<Option<CompletionResponse>> {
    let uri = params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    let Some(doc) = server.documents.get(uri.as_str()) else {
        return Ok(None);
    };
    let index = server.index.read().await.clone();

    let lines = split_lines(&doc.text);
    let line_text = lines.get(position.line as usize).copied().unwrap_or("");
    let byte_col = utf16_col_to_byte_col(line_text, position.character as usize);

    let context = CompletionContext {
        model: &doc.model,
        line: position.line as usize,
        line_text,
        prefix: &line_text[..byte_col],
        form_file: is_form_file(&uri),
    };
    let items = build_completions(&context, index.as_deref());
    Ok(Some(CompletionResponse::Array(items)))
}

pub struct CompletionContext<'a> {
    pub model: &'a StructuralModel,
    pub line: usize,
    pub line_text: &'a str,
    /// Text of the line before the cursor.
    pub prefix: &'a str,
    pub form_file: bool,
}

/// Candidates for the cursor described by `ctx`.
///
/// Right after `name.` only the members of record `name` are offered.
/// Otherwise keywords are always offered, functions when the line holds a
/// `CALL` or an assignment, and visible variables when it holds `LET`, `=`,
/// `CALL` or `RETURNING`.
pub fn build_completions(
    ctx: &CompletionContext<'_>,
    index: Option<&WorkspaceIndex>,
) -> Vec<CompletionItem> {
    if let Some(fields) = record_field_items(ctx) {
        return fields;
    }

    let upper = ctx.line_text.to_ascii_uppercase();
    let mut items: Vec<CompletionItem> = keywords_for(ctx.form_file)
        .iter()
        .map(keyword_item)
        .collect();

    if ctx.form_file {
        return items;
    }

    if upper.contains("CALL") || upper.contains('=') {
        items.extend(ctx.model.functions.iter().map(function_item));
        if let Some(index) = index {
            items.extend(
                index
                    .function_names()
                    .into_iter()
                    .filter(|name| ctx.model.function(name).is_none())
                    .map(|name| CompletionItem {
                        detail: Some("Workspace function".to_string()),
                        kind: Some(CompletionItemKind::FUNCTION),
                        label: name,
                        ..Default::default()
                    }),
            );
        }
    }

    if ["LET", "=", "CALL", "RETURNING"]
        .iter()
        .any(|marker| upper.contains(marker))
    {
        items.extend(
            visible_variables(ctx.model, ctx.line)
                .into_iter()
                .filter(|v| !v.name.contains('.'))
                .map(variable_item),
        );
    }

    items
}

fn record_field_items(ctx: &CompletionContext<'_>) -> Option<Vec<CompletionItem>> {
    let caps = MEMBER_ACCESS.captures(ctx.prefix)?;
    let record = ctx.model.record(&caps[1])?;
    Some(
        record
            .fields
            .iter()
            .map(|field| CompletionItem {
                label: field.name.clone(),
                kind: Some(CompletionItemKind::FIELD),
                detail: Some(format!("Field: {} ({})", field.name, field.type_name)),
                documentation: Some(markdown(format!("**Record:** {}", record.name))),
                ..Default::default()
            })
            .collect(),
    )
}

fn markdown(value: String) -> Documentation {
    Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    })
}

fn keyword_item(keyword: &Keyword) -> CompletionItem {
    CompletionItem {
        label: keyword.name.to_string(),
        kind: Some(CompletionItemKind::KEYWORD),
        detail: Some(keyword.kind.to_string()),
        documentation: Some(Documentation::String(keyword.description.to_string())),
        ..Default::default()
    }
}

fn function_item(function: &FunctionDef) -> CompletionItem {
    let mut doc = vec!["**Parameters:**".to_string()];
    doc.extend(
        function
            .parameters
            .iter()
            .map(|p| format!("- `{}`: {}", p.name, p.type_name)),
    );
    doc.push("**Returns:**".to_string());
    doc.extend(
        function
            .returns
            .iter()
            .map(|r| format!("- `{}`: {}", r.name, r.type_name)),
    );

    CompletionItem {
        label: function.name.clone(),
        kind: Some(CompletionItemKind::FUNCTION),
        detail: Some(function.signature()),
        documentation: Some(markdown(doc.join("\n"))),
        ..Default::default()
    }
}

fn variable_item(variable: &VariableDef) -> CompletionItem {
    CompletionItem {
        label: variable.name.clone(),
        kind: Some(CompletionItemKind::VARIABLE),
        detail: Some(format!("Variable: {}", variable.name)),
        documentation: Some(markdown(format!(
            "**Type:** {}\n**Scope:** {}",
            variable.type_name, variable.scope
        ))),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{FORM_KEYWORDS, PROGRAM_KEYWORDS};
    use genero_core::Scanner;

    const SRC: &str = "\
DEFINE g_total INTEGER
FUNCTION calc(n INTEGER)
  DEFINE cust RECORD
    id INTEGER,
    name STRING
  END RECORD
  LET n = 1
END FUNCTION
FUNCTION other()
  DEFINE hidden STRING
END FUNCTION
";

    fn labels(items: &[CompletionItem], kind: CompletionItemKind) -> Vec<&str> {
        items
            .iter()
            .filter(|i| i.kind == Some(kind))
            .map(|i| i.label.as_str())
            .collect()
    }

    fn complete(model: &StructuralModel, line: usize, line_text: &str) -> Vec<CompletionItem> {
        build_completions(
            &CompletionContext {
                model,
                line,
                line_text,
                prefix: line_text,
                form_file: false,
            },
            None,
        )
    }

    #[test]
    fn plain_line_offers_keywords_only() {
        let model = Scanner::scan(SRC);
        let items = complete(&model, 6, "  DISPLAY ");
        assert_eq!(items.len(), PROGRAM_KEYWORDS.len());
        assert!(labels(&items, CompletionItemKind::FUNCTION).is_empty());
    }

    #[test]
    fn call_line_offers_functions_and_visible_variables() {
        let model = Scanner::scan(SRC);
        let items = complete(&model, 6, "  call ");
        assert_eq!(labels(&items, CompletionItemKind::FUNCTION), vec!["calc", "other"]);
        assert_eq!(
            labels(&items, CompletionItemKind::VARIABLE),
            vec!["g_total", "cust"]
        );
    }

    #[test]
    fn let_line_offers_variables_without_functions() {
        let model = Scanner::scan(SRC);
        let items = complete(&model, 9, "  LET ");
        assert!(labels(&items, CompletionItemKind::FUNCTION).is_empty());
        assert_eq!(
            labels(&items, CompletionItemKind::VARIABLE),
            vec!["g_total", "hidden"]
        );
    }

    #[test]
    fn member_access_offers_record_fields() {
        let model = Scanner::scan(SRC);
        let items = build_completions(
            &CompletionContext {
                model: &model,
                line: 6,
                line_text: "  LET cust.",
                prefix: "  LET cust.",
                form_file: false,
            },
            None,
        );
        assert_eq!(labels(&items, CompletionItemKind::FIELD), vec!["id", "name"]);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn form_files_use_form_keywords() {
        let model = Scanner::scan("");
        let items = build_completions(
            &CompletionContext {
                model: &model,
                line: 0,
                line_text: "LET x = ",
                prefix: "LET x = ",
                form_file: true,
            },
            None,
        );
        assert_eq!(items.len(), FORM_KEYWORDS.len());
    }

    #[test]
    fn workspace_functions_are_added_once() {
        let model = Scanner::scan(SRC);
        let index = WorkspaceIndex::new();
        index.update_file(
            std::path::Path::new("lib.4gl"),
            &Scanner::scan("FUNCTION calc()\nEND FUNCTION\nFUNCTION helper()\nEND FUNCTION"),
        );
        let items = build_completions(
            &CompletionContext {
                model: &model,
                line: 6,
                line_text: "CALL ",
                prefix: "CALL ",
                form_file: false,
            },
            Some(&index),
        );
        assert_eq!(
            labels(&items, CompletionItemKind::FUNCTION),
            vec!["calc", "other", "helper"]
        );
    }
}
