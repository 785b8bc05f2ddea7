//! Workspace-wide function index used to resolve calls into other files.

use crate::config::IndexConfig;
use crate::model::{FunctionKind, StructuralModel};
use crate::scanner::Scanner;
use dashmap::DashMap;
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionLocation {
    pub path: PathBuf,
    pub name: String,
    pub kind: FunctionKind,
    pub start_line: usize,
    pub end_line: Option<usize>,
    pub signature: String,
}

fn locations(path: &Path, model: &StructuralModel) -> Vec<FunctionLocation> {
    model
        .functions
        .iter()
        .map(|f| FunctionLocation {
            path: path.to_path_buf(),
            name: f.name.clone(),
            kind: f.kind,
            start_line: f.start_line,
            end_line: f.end_line,
            signature: f.signature(),
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct WorkspaceIndex {
    files: DashMap<PathBuf, Vec<FunctionLocation>>,
}

impl WorkspaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source files under `root` accepted by `config`, honouring
    /// `.gitignore` and friends.
    pub fn collect_paths(root: &Path, config: &IndexConfig) -> Vec<PathBuf> {
        WalkBuilder::new(root)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| config.matches(path))
            .collect()
    }

    /// Scans every matching file under `root` in parallel. Unreadable files
    /// are skipped.
    pub fn build(root: &Path, config: &IndexConfig) -> Self {
        let index = Self::new();
        let paths = Self::collect_paths(root, config);

        paths.par_iter().for_each(|path| {
            let text = match fs::read(path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping unreadable file: {}", e);
                    return;
                }
            };
            let model = Scanner::scan(&text);
            index.update_file(path, &model);
        });

        tracing::info!(
            root = %root.display(),
            files = index.file_count(),
            functions = index.function_count(),
            "workspace index built"
        );
        index
    }

    /// Replaces the entry for `path` with the functions of `model`.
    pub fn update_file(&self, path: &Path, model: &StructuralModel) {
        self.files.insert(path.to_path_buf(), locations(path, model));
    }

    /// Every definition of `name` across the workspace, ordered by path and
    /// then by line.
    pub fn find_function(&self, name: &str) -> Vec<FunctionLocation> {
        let mut found: Vec<FunctionLocation> = self
            .files
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|f| f.name == name)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path).then(a.start_line.cmp(&b.start_line)));
        found
    }

    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .iter()
            .flat_map(|entry| entry.value().iter().map(|f| f.name.clone()).collect::<Vec<_>>())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn function_count(&self) -> usize {
        self.files.iter().map(|entry| entry.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_replaces_previous_entry() {
        let index = WorkspaceIndex::new();
        let path = Path::new("/ws/a.4gl");
        index.update_file(path, &Scanner::scan("FUNCTION old()\nEND FUNCTION"));
        index.update_file(path, &Scanner::scan("FUNCTION new()\nEND FUNCTION"));

        assert!(index.find_function("old").is_empty());
        let found = index.find_function("new");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature, "new()");
        assert_eq!(index.function_count(), 1);
        assert_eq!(index.file_count(), 1);
    }

    #[test]
    fn names_are_sorted_and_unique() {
        let index = WorkspaceIndex::new();
        index.update_file(Path::new("b.4gl"), &Scanner::scan("FUNCTION zeta()\nEND FUNCTION\nMAIN\nEND MAIN"));
        index.update_file(Path::new("a.4gl"), &Scanner::scan("FUNCTION zeta()\nEND FUNCTION"));
        assert_eq!(index.function_names(), vec!["MAIN", "zeta"]);
    }
}
