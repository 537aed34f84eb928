//! Operations shared by the CLI and the MCP server.
//!
//! Each operation returns a serializable output carrying a `status`. Failures
//! are turned into an [`ErrorOutput`] by [`render`], so no error ever reaches
//! the transport unstructured.

pub mod context;
pub mod deps;
pub mod index;
pub mod init;
pub mod search;
pub mod stats;

use serde::Serialize;

use crate::error::{ErrorKind, KbError, Result};

pub use context::{find_related, get_file_context, ContextOutput, RelatedOutput};
pub use deps::{analyze_dependencies, DependencyOutput};
pub use index::{index_batch, index_file, BatchOutput, IndexOutput};
pub use init::{init, InitOutput};
pub use search::{search_by_type, search_knowledge, ByTypeOutput, SearchOutput, SearchRequest};
pub use stats::{get_stats, health, HealthOutput, StatsOutput};

/// Outcome marker present on every output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    NotFound,
    Error,
}

/// Structured failure of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub status: Status,
    /// Name of the operation that failed.
    pub operation: String,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorOutput {
    #[must_use]
    pub fn new(operation: &str, err: &KbError) -> Self {
        Self {
            status: Status::Error,
            operation: operation.to_string(),
            kind: err.kind(),
            message: err.to_string(),
            path: err.path().map(str::to_string),
            field: err.field().map(str::to_string),
        }
    }
}

/// Minified JSON, or a JSON error object if serialization itself fails.
pub fn to_json<T: Serialize>(val: &T) -> String {
    serde_json::to_string(val).unwrap_or_else(|e| serialization_failure(&e.to_string()))
}

fn serialization_failure(message: &str) -> String {
    serde_json::json!({
        "status": Status::Error,
        "kind": ErrorKind::Internal,
        "message": message,
    })
    .to_string()
}

/// Serialize an operation result, mapping `Err` to an [`ErrorOutput`].
pub fn render<T: Serialize>(operation: &str, result: Result<T>) -> String {
    match result {
        Ok(output) => to_json(&output),
        Err(e) => {
            tracing::warn!(operation, error = %e, "operation failed");
            to_json(&ErrorOutput::new(operation, &e))
        }
    }
}
