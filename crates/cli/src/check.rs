use genero_core::compiler::{self, CompilerDiagnostic};
use genero_core::model::{Severity, StructuralModel};
use genero_core::{Config, Scanner};
use std::path::Path;
use tracing::info;

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Hint => "hint",
    }
}

/// Style diagnostics enabled in `config`, one `path:line:col: level: message [code]` per line.
fn style_lines(path: &Path, model: &StructuralModel, config: &Config) -> Vec<String> {
    model
        .diagnostics
        .iter()
        .filter(|d| config.style.is_enabled(d.code))
        .map(|d| {
            format!(
                "{}:{}:{}: {}: {} [{}]",
                path.display(),
                d.range.start_line + 1,
                d.range.start_col + 1,
                severity_label(d.severity),
                d.message,
                d.code
            )
        })
        .collect()
}

fn compiler_line(diagnostic: &CompilerDiagnostic) -> String {
    format!(
        "{}:{}:{}: {}: {} ({})",
        diagnostic.path,
        diagnostic.range.start_line + 1,
        diagnostic.range.start_col + 1,
        severity_label(diagnostic.severity),
        diagnostic.message,
        diagnostic.code
    )
}

pub async fn run(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let model = Scanner::scan(&text);

    for line in style_lines(path, &model, config) {
        println!("{}", line);
    }

    let compiled = compiler::diagnostics(&config.compiler, path).await;
    for diagnostic in &compiled {
        println!("{}", compiler_line(diagnostic));
    }

    let errors = compiled
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    info!(
        "Checked {}: {} style, {} compiler diagnostics",
        path.display(),
        model.diagnostics.len(),
        compiled.len()
    );

    if errors > 0 {
        return Err(format!("{} compiler error(s) in {}", errors, path.display()).into());
    }
    Ok(())
}
