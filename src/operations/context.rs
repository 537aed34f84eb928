use serde::Serialize;

use super::Status;
use crate::db::Database;
use crate::error::Result;
use crate::models::file::FileRecord;
use crate::relations;

#[derive(Debug, Clone, Serialize)]
pub struct ContextOutput {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedOutput {
    pub status: Status,
    pub source: String,
    pub count: usize,
    pub related_files: Vec<FileRecord>,
}

pub fn get_file_context(db: &Database, path: &str) -> Result<ContextOutput> {
    Ok(match relations::get_file_context(db, path)? {
        Some(file) => ContextOutput {
            status: Status::Success,
            file: Some(file),
            message: None,
        },
        None => ContextOutput {
            status: Status::NotFound,
            file: None,
            message: Some(format!("File not found: {path}")),
        },
    })
}

/// An unknown source is an empty success, matching how search reports no hits.
pub fn find_related(db: &Database, path: &str, limit: Option<usize>) -> Result<RelatedOutput> {
    let related_files = relations::find_related(db, path, limit)?;
    Ok(RelatedOutput {
        status: Status::Success,
        source: path.to_string(),
        count: related_files.len(),
        related_files,
    })
}
