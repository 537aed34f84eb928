use serde::Serialize;

use super::Status;
use crate::db::Database;
use crate::error::Result;
use crate::indexer::{self, BatchFailure};
use crate::models::file::FileSubmission;

#[derive(Debug, Clone, Serialize)]
pub struct IndexOutput {
    pub status: Status,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub status: Status,
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<BatchFailure>,
    pub message: String,
}

pub fn index_file(db: &Database, submission: FileSubmission) -> Result<IndexOutput> {
    let record = indexer::index_one(db, submission)?;
    Ok(IndexOutput {
        status: Status::Success,
        message: format!("Successfully indexed {}", record.path),
        path: record.path,
    })
}

/// Partial failure is still a successful call; the counts say what happened.
#[must_use]
pub fn index_batch(db: &Database, items: Vec<serde_json::Value>) -> BatchOutput {
    let result = indexer::index_batch(db, items);
    BatchOutput {
        status: Status::Success,
        message: format!(
            "Indexed {} files, {} failed",
            result.success_count, result.failed_count
        ),
        success_count: result.success_count,
        failed_count: result.failed_count,
        failures: result.failures,
    }
}
