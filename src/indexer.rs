use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::file::{FileRecord, FileSubmission};

/// Outcome of a batch index: counts plus per-item failure detail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<BatchFailure>,
}

/// Why one record of a batch was not stored.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: String,
}

/// Write timestamp at the precision the store persists.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Validate and upsert a single record, stamping it with the current time.
pub fn index_one(db: &Database, submission: FileSubmission) -> Result<FileRecord> {
    index_one_at(db, submission, now())
}

/// Validate and upsert a single record with an explicit `indexed_at`.
///
/// On any failure the store is left unchanged for this path.
pub fn index_one_at(
    db: &Database,
    submission: FileSubmission,
    indexed_at: DateTime<Utc>,
) -> Result<FileRecord> {
    let record = submission.validate(indexed_at)?;
    db.put(&record)?;
    debug!(path = %record.path, repo = %record.repo, "indexed file");
    Ok(record)
}

/// Index each record of a submitted list independently. A record that fails
/// to decode, validate or store never aborts or rolls back the others.
pub fn index_batch(db: &Database, items: Vec<serde_json::Value>) -> BatchResult {
    let mut result = BatchResult::default();
    for (index, item) in items.into_iter().enumerate() {
        let decoded = FileSubmission::from_value(item);
        let path = match &decoded {
            Ok(submission) => submission.display_path().to_string(),
            Err(e) => e.path().unwrap_or_default().to_string(),
        };
        match decoded.and_then(|submission| index_one(db, submission)) {
            Ok(_) => result.success_count += 1,
            Err(e) => {
                warn!(index, path = %path, error = %e, "failed to index file");
                result.failed_count += 1;
                result.failures.push(BatchFailure {
                    index,
                    path,
                    field: e.field().map(str::to_string),
                    reason: e.to_string(),
                });
            }
        }
    }
    info!(
        indexed = result.success_count,
        failed = result.failed_count,
        "batch indexed"
    );
    result
}
