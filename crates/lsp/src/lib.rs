pub mod capabilities;
pub mod code_action;
pub mod completion;
pub mod diagnostics;
pub mod goto;
pub mod hover;
pub mod indexer;
pub mod keywords;
pub mod rename;
pub mod symbols;
pub mod util;

use genero_core::Config;
use genero_core::index::WorkspaceIndex;
use genero_core::store::DocumentStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

pub struct LspServer {
    client: Client,
    /// Configuration passed on the command line; when absent it is looked
    /// up in the workspace root during `initialize`.
    explicit_config: Option<Config>,
    pub config: Arc<RwLock<Config>>,
    pub documents: Arc<DocumentStore>,
    pub index: Arc<RwLock<Option<Arc<WorkspaceIndex>>>>,
    cancel_token: CancellationToken,
}

#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
        .or_else(|| {
            params
                .workspace_folders
                .as_ref()
                .and_then(|folders| folders.first())
                .and_then(|folder| folder.uri.to_file_path().ok())
        })
}

impl LspServer {
    pub fn new(client: Client, explicit_config: Option<Config>) -> Self {
        Self {
            client,
            config: Arc::new(RwLock::new(explicit_config.clone().unwrap_or_default())),
            explicit_config,
            documents: Arc::new(DocumentStore::new()),
            index: Arc::new(RwLock::new(None)),
            cancel_token: CancellationToken::new(),
        }
    }

    fn resolve_config(&self, root: Option<&PathBuf>, options: Option<serde_json::Value>) -> Config {
        let base = match (&self.explicit_config, root) {
            (Some(config), _) => config.clone(),
            (None, Some(root)) => Config::discover(root).unwrap_or_else(|e| {
                tracing::warn!(root = %root.display(), "ignoring workspace configuration: {}", e);
                Config::default()
            }),
            (None, None) => Config::default(),
        };
        base.clone().with_overrides(options).unwrap_or_else(|e| {
            tracing::warn!("ignoring initializationOptions: {}", e);
            base
        })
    }

    async fn log_request(&self, method: &str, uri: &Url, pos: Option<Position>) {
        let message = match pos {
            Some(pos) => format!(
                "LSP Request: {} uri={} pos={}:{}",
                method, uri, pos.line, pos.character
            ),
            None => format!("LSP Request: {} uri={}", method, uri),
        };
        self.client.log_message(MessageType::LOG, message).await;
    }

    async fn log_response<T: Sync>(
        &self,
        result: &Result<Option<T>>,
        describe: impl FnOnce(&T) -> String + Send,
    ) {
        match result {
            Ok(Some(value)) => {
                self.client
                    .log_message(MessageType::LOG, format!("LSP Response: {}", describe(value)))
                    .await
            }
            Ok(None) => {
                self.client
                    .log_message(MessageType::LOG, "LSP Response: no result")
                    .await
            }
            Err(e) => {
                self.client
                    .log_message(MessageType::ERROR, format!("LSP Error: {}", e))
                    .await
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for LspServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root(&params);
        let config = self.resolve_config(root.as_ref(), params.initialization_options);
        tracing::info!(root = ?root, "initializing");

        *self.config.write().await = config.clone();

        if let Some(root) = root {
            if config.index.enabled {
                indexer::spawn_indexer(
                    root,
                    config.index.clone(),
                    self.client.clone(),
                    self.index.clone(),
                    self.cancel_token.clone(),
                );
            }
        }

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "genero-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: capabilities::server_capabilities(),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Genero language server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down");
        self.cancel_token.cancel();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        self.client
            .log_message(MessageType::LOG, format!("LSP Event: did_open uri={}", uri))
            .await;

        let doc = self
            .documents
            .open(uri.as_str(), params.text_document.text, version);
        let config = self.config.read().await.clone();
        diagnostics::publish(&self.client, uri.clone(), &doc, &config.style).await;
        diagnostics::spawn_compile(
            self.client.clone(),
            self.documents.clone(),
            config,
            uri,
            version,
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let Some(current) = self.documents.get(uri.as_str()) else {
            tracing::warn!(uri = %uri, "change for a document that is not open");
            return;
        };
        let text = util::apply_content_changes(&current.text, &params.content_changes);
        let doc = self.documents.update(uri.as_str(), text, version);

        let config = self.config.read().await;
        if config.style.on_change {
            diagnostics::publish(&self.client, uri, &doc, &config.style).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        self.client
            .log_message(MessageType::LOG, format!("LSP Event: did_save uri={}", uri))
            .await;

        let doc = match params.text {
            Some(text) => {
                let version = self.documents.get(uri.as_str()).map_or(0, |d| d.version);
                self.documents.update(uri.as_str(), text, version)
            }
            None => match self.documents.get(uri.as_str()) {
                Some(doc) => doc,
                None => return,
            },
        };
        let config = self.config.read().await.clone();

        if let Some(path) = util::uri_to_path(&uri) {
            if let Some(index) = self.index.read().await.as_ref() {
                if config.index.matches(&path) {
                    index.update_file(&path, &doc.model);
                }
            }
        }

        diagnostics::publish(&self.client, uri.clone(), &doc, &config.style).await;
        diagnostics::spawn_compile(
            self.client.clone(),
            self.documents.clone(),
            config,
            uri,
            doc.version,
        );
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.client
            .log_message(MessageType::LOG, format!("LSP Event: did_close uri={}", uri))
            .await;
        self.documents.close(uri.as_str());
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let doc_pos = &params.text_document_position;
        self.log_request("textDocument/completion", &doc_pos.text_document.uri, Some(doc_pos.position))
            .await;
        let result = completion::completion(self, params).await;
        self.log_response(&result, |resp| match resp {
            CompletionResponse::Array(items) => format!("{} completion items", items.len()),
            CompletionResponse::List(list) => format!("{} completion items", list.items.len()),
        })
        .await;
        result
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let doc_pos = &params.text_document_position_params;
        self.log_request("textDocument/hover", &doc_pos.text_document.uri, Some(doc_pos.position))
            .await;
        let result = hover::hover(self, params).await;
        self.log_response(&result, |_| "found hover content".to_string())
            .await;
        result
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let doc_pos = &params.text_document_position_params;
        self.log_request("textDocument/definition", &doc_pos.text_document.uri, Some(doc_pos.position))
            .await;
        let result = goto::definition(self, params).await;
        self.log_response(&result, |resp| {
            let count = match resp {
                GotoDefinitionResponse::Scalar(_) => 1,
                GotoDefinitionResponse::Array(v) => v.len(),
                GotoDefinitionResponse::Link(v) => v.len(),
            };
            format!("found {} locations", count)
        })
        .await;
        result
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let doc_pos = &params.text_document_position;
        self.log_request("textDocument/references", &doc_pos.text_document.uri, Some(doc_pos.position))
            .await;
        let result = goto::references(self, params).await;
        self.log_response(&result, |locs| format!("found {} references", locs.len()))
            .await;
        result
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let doc_pos = &params.text_document_position;
        self.log_request("textDocument/rename", &doc_pos.text_document.uri, Some(doc_pos.position))
            .await;
        let result = rename::rename(self, params).await;
        self.log_response(&result, |edit| {
            let count: usize = edit
                .changes
                .as_ref()
                .map(|c| c.values().map(Vec::len).sum())
                .unwrap_or(0);
            format!("renaming {} occurrences", count)
        })
        .await;
        result
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        self.log_request("textDocument/codeAction", &params.text_document.uri, Some(params.range.start))
            .await;
        let result = code_action::code_action(self, params).await;
        self.log_response(&result, |actions| format!("found {} code actions", actions.len()))
            .await;
        result
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        self.log_request("textDocument/documentSymbol", &params.text_document.uri, None)
            .await;
        let result = symbols::document_symbol(self, params).await;
        self.log_response(&result, |resp| {
            let count = match resp {
                DocumentSymbolResponse::Flat(v) => v.len(),
                DocumentSymbolResponse::Nested(v) => v.len(),
            };
            format!("found {} symbols", count)
        })
        .await;
        result
    }
}

pub async fn run_server(config: Option<Config>) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = tower_lsp::LspService::new(move |client| LspServer::new(client, config.clone()));
    tower_lsp::Server::new(stdin, stdout, socket)
        .serve(service)
        .await;

    Ok(())
}
