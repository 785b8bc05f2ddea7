use crate::compiler::CompilerDiagnostic;
use crate::model::StructuralModel;
use crate::scanner::Scanner;
use dashmap::DashMap;
use std::sync::Arc;

/// One version of an open document together with what was derived from it.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub version: i32,
    pub model: Arc<StructuralModel>,
    /// Result of the last compiler run. Compilation only happens on open
    /// and save, so edits in between keep the previous result.
    pub compiler_diagnostics: Arc<Vec<CompilerDiagnostic>>,
}

impl Document {
    pub fn new(text: String, version: i32) -> Self {
        let model = Arc::new(Scanner::scan(&text));
        Self {
            text,
            version,
            model,
            compiler_diagnostics: Arc::new(Vec::new()),
        }
    }
}

/// Documents currently open in the client, keyed by URI.
///
/// Every text change rescans the document and swaps the whole entry, so a
/// reader holding an `Arc<Document>` always sees a consistent text/model pair.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<String, Arc<Document>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: &str, text: String, version: i32) -> Arc<Document> {
        let doc = Arc::new(Document::new(text, version));
        self.documents.insert(uri.to_string(), doc.clone());
        doc
    }

    /// Replaces the text of `uri`, keeping the last compiler diagnostics.
    pub fn update(&self, uri: &str, text: String, version: i32) -> Arc<Document> {
        let mut doc = Document::new(text, version);
        if let Some(previous) = self.documents.get(uri) {
            doc.compiler_diagnostics = previous.compiler_diagnostics.clone();
        }
        let doc = Arc::new(doc);
        self.documents.insert(uri.to_string(), doc.clone());
        doc
    }

    /// Stores a compiler result for `uri`. Ignored when the document was
    /// closed or edited to a newer version in the meantime.
    pub fn set_compiler_diagnostics(
        &self,
        uri: &str,
        version: i32,
        diagnostics: Vec<CompilerDiagnostic>,
    ) -> Option<Arc<Document>> {
        let mut entry = self.documents.get_mut(uri)?;
        if entry.version != version {
            tracing::debug!(uri, version, current = entry.version, "dropping stale compiler result");
            return None;
        }
        let mut doc = Document::clone(&entry);
        doc.compiler_diagnostics = Arc::new(diagnostics);
        let doc = Arc::new(doc);
        *entry = doc.clone();
        Some(doc)
    }

    pub fn close(&self, uri: &str) -> Option<Arc<Document>> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    pub fn get(&self, uri: &str) -> Option<Arc<Document>> {
        self.documents.get(uri).map(|doc| doc.clone())
    }

    pub fn model(&self, uri: &str) -> Option<Arc<StructuralModel>> {
        self.documents.get(uri).map(|doc| doc.model.clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Range, Severity};

    fn compiler_error(line: usize) -> CompilerDiagnostic {
        CompilerDiagnostic {
            path: "a.4gl".into(),
            severity: Severity::Error,
            range: Range::on_line(line, 0, 1),
            code: -201,
            message: "syntax error".into(),
        }
    }

    #[test]
    fn update_rescans_and_keeps_compiler_result() {
        let store = DocumentStore::new();
        store.open("file:///a.4gl", "FUNCTION f()\nEND FUNCTION".into(), 1);
        store.set_compiler_diagnostics("file:///a.4gl", 1, vec![compiler_error(0)]);

        let doc = store.update("file:///a.4gl", "FUNCTION g()\nEND FUNCTION".into(), 2);
        assert_eq!(doc.version, 2);
        assert_eq!(doc.model.functions[0].name, "g");
        assert_eq!(doc.compiler_diagnostics.len(), 1);
    }

    #[test]
    fn stale_compiler_result_is_dropped() {
        let store = DocumentStore::new();
        store.open("file:///a.4gl", String::new(), 1);
        store.update("file:///a.4gl", "MAIN\nEND MAIN".into(), 2);
        assert!(store.set_compiler_diagnostics("file:///a.4gl", 1, vec![compiler_error(0)]).is_none());
        assert!(store.get("file:///a.4gl").unwrap().compiler_diagnostics.is_empty());
    }

    #[test]
    fn close_forgets_document() {
        let store = DocumentStore::new();
        store.open("file:///a.4gl", "MAIN\nEND MAIN".into(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.close("file:///a.4gl").is_some());
        assert!(store.model("file:///a.4gl").is_none());
        assert!(store.is_empty());
        assert!(store.set_compiler_diagnostics("file:///a.4gl", 1, Vec::new()).is_none());
    }
}
