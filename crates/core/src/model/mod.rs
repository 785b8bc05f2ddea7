//! Structural model extracted from one document version.
//!
//! Everything here is produced by [`crate::scanner::Scanner`] and is
//! read-only afterwards: a document change builds a fresh model instead of
//! patching the old one.

pub mod diagnostic;

pub use diagnostic::{DiagnosticCode, Severity, StyleDiagnostic};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type assigned to parameters and list entries with no discernible type.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Name of the synthetic function created for the program's `MAIN` block.
pub const MAIN_BLOCK: &str = "MAIN";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Range {
    /// A range confined to a single line.
    pub fn on_line(line: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            start_line: line,
            start_col,
            end_line: line,
            end_col,
        }
    }

    pub fn contains(&self, line: usize, col: usize) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && col < self.start_col {
            return false;
        }
        if line == self.end_line && col > self.end_col {
            return false;
        }
        true
    }
}

/// Visibility of a declaration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Declared outside any function, report or `MAIN` block.
    Module,
    /// Declared inside the named function, report or `MAIN` block.
    Function(String),
}

impl Scope {
    pub fn is_module(&self) -> bool {
        matches!(self, Scope::Module)
    }

    pub fn function_name(&self) -> Option<&str> {
        match self {
            Scope::Module => None,
            Scope::Function(name) => Some(name),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Module => f.write_str("module"),
            Scope::Function(name) => f.write_str(name),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Report,
    Main,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FunctionKind::Function => "function",
            FunctionKind::Report => "report",
            FunctionKind::Main => "main",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VariableDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub scope: Scope,
    pub line: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub kind: FunctionKind,
    pub parameters: Vec<Parameter>,
    pub returns: Vec<ReturnValue>,
    pub variables: Vec<VariableDef>,
    pub start_line: usize,
    /// `None` while the block is unterminated; queries treat that as
    /// extending to the end of the document.
    pub end_line: Option<usize>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, kind: FunctionKind, start_line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters: Vec::new(),
            returns: Vec::new(),
            variables: Vec::new(),
            start_line,
            end_line: None,
        }
    }

    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && self.end_line.is_none_or(|end| line <= end)
    }

    pub fn is_open(&self) -> bool {
        self.end_line.is_none()
    }

    /// Renders `name(a INTEGER, b STRING)`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.name, p.type_name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecordField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecordDef {
    pub name: String,
    pub scope: Scope,
    pub fields: Vec<RecordField>,
    pub line: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub line: usize,
}

/// All symbols and style diagnostics of one document version.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralModel {
    pub functions: Vec<FunctionDef>,
    /// Module and function scoped variables in declaration order.
    pub variables: Vec<VariableDef>,
    pub records: Vec<RecordDef>,
    pub calls: Vec<CallSite>,
    pub diagnostics: Vec<StyleDiagnostic>,
    /// Number of physical lines scanned.
    pub line_count: usize,
}

impl StructuralModel {
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn record(&self, name: &str) -> Option<&RecordDef> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn module_variables(&self) -> impl Iterator<Item = &VariableDef> {
        self.variables.iter().filter(|v| v.scope.is_module())
    }

    pub fn last_line(&self) -> usize {
        self.line_count.saturating_sub(1)
    }
}
