use crate::util::{to_lsp_range, uri_to_path};
use genero_core::Config;
use genero_core::compiler::{self, COMPILER_SOURCE, CompilerDiagnostic};
use genero_core::config::StyleConfig;
use genero_core::model::diagnostic::STYLE_SOURCE;
use genero_core::model::{Severity, StyleDiagnostic};
use genero_core::scanner::split_lines;
use genero_core::store::{Document, DocumentStore};
use std::path::Path;
use std::sync::Arc;
use tower_lsp::Client;
use tower_lsp::lsp_types::*;

fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

pub fn style_diagnostic(lines: &[&str], diagnostic: &StyleDiagnostic) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(lines, &diagnostic.range),
        severity: Some(to_lsp_severity(diagnostic.severity)),
        code: Some(NumberOrString::String(diagnostic.code.as_str().to_string())),
        source: Some(STYLE_SOURCE.to_string()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}

/// Compiler columns are reported as-is; the compiler counts characters.
pub fn compiler_diagnostic(diagnostic: &CompilerDiagnostic) -> Diagnostic {
    let range = &diagnostic.range;
    Diagnostic {
        range: Range::new(
            Position::new(range.start_line as u32, range.start_col as u32),
            Position::new(range.end_line as u32, range.end_col as u32),
        ),
        severity: Some(to_lsp_severity(diagnostic.severity)),
        code: Some(NumberOrString::Number(diagnostic.code as i32)),
        source: Some(COMPILER_SOURCE.to_string()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}

fn same_file(reported: &str, path: Option<&Path>) -> bool {
    match path {
        Some(path) => Path::new(reported).file_name() == path.file_name(),
        None => true,
    }
}

/// Style diagnostics enabled in `style` followed by the last compiler
/// diagnostics reported for this file.
pub fn build_diagnostics(doc: &Document, path: Option<&Path>, style: &StyleConfig) -> Vec<Diagnostic> {
    let lines = split_lines(&doc.text);
    let mut diagnostics: Vec<Diagnostic> = doc
        .model
        .diagnostics
        .iter()
        .filter(|d| style.is_enabled(d.code))
        .map(|d| style_diagnostic(&lines, d))
        .collect();
    diagnostics.extend(
        doc.compiler_diagnostics
            .iter()
            .filter(|d| same_file(&d.path, path))
            .map(compiler_diagnostic),
    );
    diagnostics
}

pub async fn publish(client: &Client, uri: Url, doc: &Document, style: &StyleConfig) {
    let path = uri_to_path(&uri);
    let diagnostics = build_diagnostics(doc, path.as_deref(), style);
    tracing::debug!(uri = %uri, count = diagnostics.len(), "publishing diagnostics");
    client
        .publish_diagnostics(uri, diagnostics, Some(doc.version))
        .await;
}

/// Compiles the file behind `uri` in the background and republishes once
/// the result is in. Results for an outdated version are discarded.
pub fn spawn_compile(
    client: Client,
    documents: Arc<DocumentStore>,
    config: Config,
    uri: Url,
    version: i32,
) {
    if !config.compiler.enabled {
        return;
    }
    let Some(path) = uri_to_path(&uri) else {
        tracing::debug!(uri = %uri, "not a file, skipping compiler");
        return;
    };

    tokio::spawn(async move {
        let diagnostics = compiler::diagnostics(&config.compiler, &path).await;
        tracing::debug!(uri = %uri, count = diagnostics.len(), "compiler finished");
        if let Some(doc) = documents.set_compiler_diagnostics(uri.as_str(), version, diagnostics) {
            publish(&client, uri, &doc, &config.style).await;
        }
    });
}
