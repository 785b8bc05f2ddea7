//! External compiler collaborator.
//!
//! The compiler is run on the file on disk and its line-oriented output is
//! parsed into diagnostics. Any failure (missing binary, timeout, output we
//! do not understand) yields no diagnostics rather than an error for the
//! caller to surface.

use crate::config::CompilerConfig;
use crate::error::{GeneroError, Result};
use crate::model::{Range, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

pub const COMPILER_SOURCE: &str = "fglcomp";

static OUTPUT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*):(\d+):(\d+):(\d+):(\d+):(warning|error):\((-?\d+)\) (.*)$").unwrap()
});

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompilerDiagnostic {
    pub path: String,
    pub severity: Severity,
    /// Zero-based; the end column is exclusive.
    pub range: Range,
    pub code: i64,
    pub message: String,
}

/// Parses one line of compiler output:
/// `<path>:<line>:<col>:<endLine>:<endCol>:(warning|error):(<code>) <message>`.
/// Positions are 1-based with an inclusive end column.
pub fn parse_line(line: &str) -> Option<CompilerDiagnostic> {
    let caps = OUTPUT_LINE.captures(line.trim_end_matches('\r'))?;
    let number = |i: usize| caps[i].parse::<usize>().ok();

    let start_line = number(2)?.saturating_sub(1);
    let start_col = number(3)?.saturating_sub(1);
    let end_line = number(4)?.saturating_sub(1);
    let end_col = number(5)?;

    let severity = if &caps[6] == "warning" {
        Severity::Warning
    } else {
        Severity::Error
    };

    Some(CompilerDiagnostic {
        path: caps[1].to_string(),
        severity,
        range: Range {
            start_line,
            start_col,
            end_line,
            end_col,
        },
        code: caps[7].parse().ok()?,
        message: caps[8].to_string(),
    })
}

/// Parses a whole compiler transcript; lines outside the grammar are ignored.
pub fn parse_output(output: &str) -> Vec<CompilerDiagnostic> {
    output.lines().filter_map(parse_line).collect()
}

/// Runs the compiler on `path` and returns its combined stdout and stderr.
/// A non-zero exit status is not an error: the compiler reports problems
/// through its exit code and the transcript is still what we parse.
pub async fn compile(config: &CompilerConfig, path: &Path) -> Result<String> {
    let mut command = Command::new(&config.program);
    command
        .args(&config.args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        command.current_dir(dir);
    }

    let output = tokio::time::timeout(config.timeout(), command.output())
        .await
        .map_err(|_| GeneroError::Timeout(config.timeout_ms))?
        .map_err(|e| GeneroError::Compiler(format!("cannot run `{}`: {}", config.program, e)))?;

    if !output.status.success() {
        tracing::debug!(status = %output.status, path = %path.display(), "compiler exited with failure");
    }

    let mut transcript = String::from_utf8_lossy(&output.stdout).into_owned();
    transcript.push('\n');
    transcript.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(transcript)
}

/// Compiler diagnostics for `path`, or none when the compiler is disabled
/// or could not be run.
pub async fn diagnostics(config: &CompilerConfig, path: &Path) -> Vec<CompilerDiagnostic> {
    if !config.enabled {
        return Vec::new();
    }
    match compile(config, path).await {
        Ok(transcript) => parse_output(&transcript),
        Err(e) => {
            tracing::warn!(path = %path.display(), "compiler diagnostics unavailable: {}", e);
            Vec::new()
        }
    }
}
