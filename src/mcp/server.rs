//! MCP server implementation using rmcp.
//!
//! Exposes the knowledge base operations as MCP tools over stdio transport.
//! Each tool calls the same operation the CLI command does.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler, ServiceExt};
use serde::Serialize;

use crate::config::{Config, UserSettings};
use crate::db::Database;
use crate::error::{KbError, Result as KbResult};
use crate::operations::{self, render};

use super::tools::{
    BatchParams, ByTypeParams, DepsParams, FileParams, PathParams, RelatedParams, SearchParams,
};

/// The knowledge base MCP server.
///
/// Holds one shared store. Every tool call runs its unit of work on the
/// blocking pool, so a call abandoned by the client still completes and
/// releases the connection.
#[derive(Clone)]
pub struct KbServer {
    db: Arc<Database>,
    settings: UserSettings,
    tool_router: ToolRouter<Self>,
}

// ── Helper functions ────────────────────────────────────────────

impl KbServer {
    async fn run<T, F>(&self, operation: &'static str, work: F) -> String
    where
        T: Serialize + Send + 'static,
        F: FnOnce(&Database) -> KbResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || work(&db))
            .await
            .unwrap_or_else(|e| Err(KbError::Other(format!("{operation} task failed: {e}"))));
        render(operation, result)
    }

    #[must_use]
    pub fn get_tool_router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }
}

// ── Tool implementations ────────────────────────────────────────

#[tool_router]
impl KbServer {
    #[must_use]
    pub fn new(db: Database, settings: UserSettings) -> Self {
        Self {
            db: Arc::new(db),
            settings,
            tool_router: Self::tool_router(),
        }
    }

    // ─── Indexing ───────────────────────────────────────────────

    #[tool(
        description = "Index one file's knowledge. Re-indexing a path replaces the stored record."
    )]
    pub async fn index_file(&self, Parameters(params): Parameters<FileParams>) -> String {
        self.run("index_file", move |db| {
            operations::index_file(db, params.into())
        })
        .await
    }

    #[tool(
        description = "Index many files. Each file is stored independently; failures are counted and listed."
    )]
    pub async fn index_batch(&self, Parameters(params): Parameters<BatchParams>) -> String {
        self.run("index_batch", move |db| {
            Ok(operations::index_batch(db, params.files))
        })
        .await
    }

    // ─── Search ─────────────────────────────────────────────────

    #[tool(
        description = "Case-insensitive substring search over summaries, key elements and tags, with optional filters. Most recently indexed first."
    )]
    pub async fn search_knowledge(&self, Parameters(params): Parameters<SearchParams>) -> String {
        self.run("search_knowledge", move |db| {
            operations::search_knowledge(db, params.into())
        })
        .await
    }

    #[tool(description = "List files of one type, optionally within one repository.")]
    pub async fn search_by_type(&self, Parameters(params): Parameters<ByTypeParams>) -> String {
        self.run("search_by_type", move |db| {
            operations::search_by_type(db, &params.file_type, params.repo, params.limit)
        })
        .await
    }

    // ─── Relations ──────────────────────────────────────────────

    #[tool(description = "Full stored record for one path, or not_found.")]
    pub async fn get_file_context(&self, Parameters(params): Parameters<PathParams>) -> String {
        self.run("get_file_context", move |db| {
            operations::get_file_context(db, &params.path)
        })
        .await
    }

    #[tool(
        description = "Other files in the same repository, same technology first, then most recent."
    )]
    pub async fn find_related(&self, Parameters(params): Parameters<RelatedParams>) -> String {
        self.run("find_related", move |db| {
            operations::find_related(db, &params.path, params.limit)
        })
        .await
    }

    #[tool(
        description = "Stored dependencies and dependents of a file, plus files reachable along those edges up to max_depth hops."
    )]
    pub async fn analyze_dependencies(&self, Parameters(params): Parameters<DepsParams>) -> String {
        let limits = self.settings.dependencies.clone();
        self.run("analyze_dependencies", move |db| {
            operations::analyze_dependencies(db, &params.path, params.max_depth, &limits)
        })
        .await
    }

    // ─── Stats ──────────────────────────────────────────────────

    #[tool(description = "Totals by file type, repository and technology, last index time and dependency count.")]
    pub async fn get_stats(&self) -> String {
        self.run("get_stats", operations::get_stats).await
    }

    #[tool(description = "Check that the knowledge base store answers queries.")]
    pub async fn health(&self) -> String {
        self.run("health", |db| Ok(operations::health(db))).await
    }
}

// ── ServerHandler implementation ────────────────────────────────

#[tool_handler]
impl ServerHandler for KbServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "kbase: a knowledge base of source files across repositories. \
                 Record what a file does with index_file or index_batch (path, repo, file_type, \
                 technology, summary, content_hash are required). \
                 Query with search_knowledge, search_by_type, get_file_context and find_related. \
                 analyze_dependencies follows stored dependency edges; get_stats and health \
                 describe the store. Every response is JSON with a status of success, not_found or error."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ── Server startup ──────────────────────────────────────────────

/// Start the MCP server on stdio transport.
pub async fn start_mcp_server(config: Config) -> KbResult<()> {
    tracing::info!(db = %config.db_path.display(), "starting kbase MCP server");

    let db = Database::open_with_timeout(&config.db_path, config.busy_timeout())?;
    let server = KbServer::new(db, config.settings);

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| KbError::Other(format!("MCP server error: {e}")))?;

    tracing::info!("MCP server running on stdio");

    service
        .waiting()
        .await
        .map_err(|e| KbError::Other(format!("MCP server error: {e}")))?;

    tracing::info!("MCP server stopped");
    Ok(())
}
