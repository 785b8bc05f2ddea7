//! Server configuration.
//!
//! Every field has a default so a partial JSON document (a `genero.json` file
//! or the client's `initializationOptions`) is always accepted.

use crate::error::{GeneroError, Result};
use crate::model::DiagnosticCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File looked up at the workspace root when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "genero.json";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub compiler: CompilerConfig,
    pub style: StyleConfig,
    pub index: IndexConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    pub enabled: bool,
    pub program: String,
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "fglcomp".to_string(),
            args: vec!["-M".to_string(), "-W".to_string(), "all".to_string()],
            timeout_ms: 10_000,
        }
    }
}

impl CompilerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    pub empty_line: bool,
    pub trailing_whitespace: bool,
    pub unspaced_comma: bool,
    /// Publish style diagnostics on every edit, not only on open and save.
    pub on_change: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            empty_line: true,
            trailing_whitespace: true,
            unspaced_comma: true,
            on_change: true,
        }
    }
}

impl StyleConfig {
    pub fn is_enabled(&self, code: DiagnosticCode) -> bool {
        match code {
            DiagnosticCode::EmptyLine => self.empty_line,
            DiagnosticCode::TrailingWhitespace => self.trailing_whitespace,
            DiagnosticCode::UnspacedComma => self.unspaced_comma,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexConfig {
    pub enabled: bool,
    pub extensions: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extensions: vec!["4gl".to_string()],
        }
    }
}

impl IndexConfig {
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl Config {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `genero.json` from `root` when present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses LSP `initializationOptions`; `None` or `null` keep `self`.
    pub fn with_overrides(self, options: Option<serde_json::Value>) -> Result<Self> {
        match options {
            None | Some(serde_json::Value::Null) => Ok(self),
            Some(value) => {
                let config: Config = serde_json::from_value(value)?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.compiler.enabled && self.compiler.program.trim().is_empty() {
            return Err(GeneroError::Config(
                "compiler.program must not be empty".to_string(),
            ));
        }
        if self.compiler.timeout_ms == 0 {
            return Err(GeneroError::Config(
                "compiler.timeoutMs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
