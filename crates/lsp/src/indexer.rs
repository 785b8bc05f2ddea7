use genero_core::config::IndexConfig;
use genero_core::index::WorkspaceIndex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_lsp::Client;
use tower_lsp::lsp_types::MessageType;

/// Builds the workspace function index off the async runtime and installs
/// it into `index_lock` when done. Dropped when `cancel_token` fires first.
pub fn spawn_indexer(
    root: PathBuf,
    config: IndexConfig,
    client: Client,
    index_lock: Arc<RwLock<Option<Arc<WorkspaceIndex>>>>,
    cancel_token: CancellationToken,
) {
    tokio::spawn(async move {
        let start = std::time::Instant::now();
        client
            .log_message(
                MessageType::INFO,
                format!("Genero indexing started for {:?}", root),
            )
            .await;

        let build_root = root.clone();
        let task = tokio::task::spawn_blocking(move || WorkspaceIndex::build(&build_root, &config));

        let index = tokio::select! {
            _ = cancel_token.cancelled() => {
                tracing::info!(root = %root.display(), "indexing cancelled");
                return;
            }
            result = task => match result {
                Ok(index) => index,
                Err(e) => {
                    tracing::warn!(root = %root.display(), "indexing task failed: {}", e);
                    client
                        .log_message(MessageType::ERROR, format!("Indexing failed: {}", e))
                        .await;
                    return;
                }
            },
        };

        let message = format!(
            "Indexing complete in {:?}: {} files, {} functions",
            start.elapsed(),
            index.file_count(),
            index.function_count()
        );
        *index_lock.write().await = Some(Arc::new(index));
        client.log_message(MessageType::INFO, message).await;
    });
}
