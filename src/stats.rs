use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::queries::{count_group_by, count_records, max_indexed_at, sum_dependencies};
use crate::db::{Column, Database};
use crate::error::Result;

/// Aggregate view of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_files: u64,
    pub files_by_type: BTreeMap<String, u64>,
    pub files_by_repo: BTreeMap<String, u64>,
    pub files_by_technology: BTreeMap<String, u64>,
    pub last_indexed: Option<DateTime<Utc>>,
    /// Sum of dependency list lengths across all records.
    pub total_dependencies: u64,
}

/// Compute every figure from one consistent snapshot.
pub fn get_stats(db: &Database) -> Result<IndexStats> {
    db.read(|tx| {
        Ok(IndexStats {
            total_files: count_records(tx)?,
            files_by_type: count_group_by(tx, Column::FileType)?,
            files_by_repo: count_group_by(tx, Column::Repo)?,
            files_by_technology: count_group_by(tx, Column::Technology)?,
            last_indexed: max_indexed_at(tx)?,
            total_dependencies: sum_dependencies(tx)?,
        })
    })
}
