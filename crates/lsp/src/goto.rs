use crate::LspServer;
use crate::util::{to_lsp_range, word_at_position, word_range_on_line};
use genero_core::index::{FunctionLocation, WorkspaceIndex};
use genero_core::model::StructuralModel;
use genero_core::query::{references_of, visible_variable};
use genero_core::scanner::split_lines;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

/// Where a definition lookup landed.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionTarget {
    /// A line in the requesting document.
    Local { line: usize, name: String },
    /// Functions found in other workspace files.
    Workspace(Vec<FunctionLocation>),
}

/// Resolves `word` seen from `line`: a visible variable, then a function of
/// the document, then functions elsewhere in the workspace.
pub fn resolve_definition(
    model: &StructuralModel,
    word: &str,
    line: usize,
    index: Option<&WorkspaceIndex>,
) -> Option<DefinitionTarget> {
    if let Some(variable) = visible_variable(model, word, line) {
        // Record members are declared on the record's line under the
        // record's name.
        let name = variable.name.split('.').next().unwrap_or(&variable.name);
        return Some(DefinitionTarget::Local {
            line: variable.line,
            name: name.to_string(),
        });
    }
    if let Some(function) = model.function(word) {
        return Some(DefinitionTarget::Local {
            line: function.start_line,
            name: function.name.clone(),
        });
    }
    let found = index?.find_function(word);
    (!found.is_empty()).then_some(DefinitionTarget::Workspace(found))
}

fn workspace_location(location: &FunctionLocation) -> Option<Location> {
    let uri = Url::from_file_path(&location.path).ok()?;
    let line = location.start_line as u32;
    Some(Location {
        uri,
        range: Range::new(Position::new(line, 0), Position::new(line, 0)),
    })
}

pub async fn definition(
    server: &LspServer,
    params: GotoDefinitionParams,
) -> Result<Option<GotoDefinitionResponse>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let Some(doc) = server.documents.get(uri.as_str()) else {
        return Ok(None);
    };
    let Some((line, word)) = word_at_position(&doc.text, position) else {
        return Ok(None);
    };
    let index = server.index.read().await.clone();

    let response = match resolve_definition(&doc.model, &word, line, index.as_deref()) {
        Some(DefinitionTarget::Local { line, name }) => {
            let lines = split_lines(&doc.text);
            Some(GotoDefinitionResponse::Scalar(Location {
                uri,
                range: word_range_on_line(&lines, line, &name),
            }))
        }
        Some(DefinitionTarget::Workspace(found)) => {
            let mut locations: Vec<Location> =
                found.iter().filter_map(workspace_location).collect();
            match locations.len() {
                0 => None,
                1 => locations.pop().map(GotoDefinitionResponse::Scalar),
                _ => Some(GotoDefinitionResponse::Array(locations)),
            }
        }
        None => {
            tracing::debug!(uri = %uri, word = %word, "no definition found");
            None
        }
    };
    Ok(response)
}

pub async fn references(server: &LspServer, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
    let uri = params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    let Some(doc) = server.documents.get(uri.as_str()) else {
        return Ok(None);
    };
    let Some((line, word)) = word_at_position(&doc.text, position) else {
        return Ok(None);
    };
    let Some(variable) = visible_variable(&doc.model, &word, line) else {
        return Ok(None);
    };

    let lines = split_lines(&doc.text);
    let locations: Vec<Location> = references_of(&doc.model, &doc.text, variable)
        .iter()
        .map(|range| Location {
            uri: uri.clone(),
            range: to_lsp_range(&lines, range),
        })
        .collect();
    Ok((!locations.is_empty()).then_some(locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use genero_core::Scanner;
    use std::path::Path;

    const SRC: &str = "\
DEFINE g INTEGER
FUNCTION f()
  DEFINE r RECORD
    id INTEGER
  END RECORD
  LET r.id = g
  CALL helper()
  CALL remote()
END FUNCTION
FUNCTION helper()
END FUNCTION
";

    #[test]
    fn variables_resolve_to_declaration_line() {
        let model = Scanner::scan(SRC);
        assert_eq!(
            resolve_definition(&model, "g", 5, None),
            Some(DefinitionTarget::Local { line: 0, name: "g".into() })
        );
        assert_eq!(
            resolve_definition(&model, "r.id", 5, None),
            Some(DefinitionTarget::Local { line: 2, name: "r".into() })
        );
    }

    #[test]
    fn functions_resolve_locally_then_in_workspace() {
        let model = Scanner::scan(SRC);
        assert_eq!(
            resolve_definition(&model, "helper", 6, None),
            Some(DefinitionTarget::Local { line: 9, name: "helper".into() })
        );
        assert!(resolve_definition(&model, "remote", 7, None).is_none());

        let index = WorkspaceIndex::new();
        index.update_file(
            Path::new("/ws/lib.4gl"),
            &Scanner::scan("\nFUNCTION remote()\nEND FUNCTION"),
        );
        match resolve_definition(&model, "remote", 7, Some(&index)) {
            Some(DefinitionTarget::Workspace(found)) => {
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].start_line, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn workspace_locations_become_file_uris() {
        let location = FunctionLocation {
            path: "/ws/lib.4gl".into(),
            name: "remote".into(),
            kind: genero_core::model::FunctionKind::Function,
            start_line: 4,
            end_line: Some(6),
            signature: "remote()".into(),
        };
        let converted = workspace_location(&location).unwrap();
        assert_eq!(converted.uri.as_str(), "file:///ws/lib.4gl");
        assert_eq!(converted.range.start.line, 4);
    }
}
