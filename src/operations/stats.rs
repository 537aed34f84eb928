use serde::Serialize;

use super::Status;
use crate::db::Database;
use crate::error::Result;
use crate::stats::{self, IndexStats};

#[derive(Debug, Clone, Serialize)]
pub struct StatsOutput {
    pub status: Status,
    pub stats: IndexStats,
}

/// Liveness check over the same path `get_stats` takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthOutput {
    Healthy { database: String, total_files: u64 },
    Unhealthy { error: String },
}

impl HealthOutput {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }
}

pub fn get_stats(db: &Database) -> Result<StatsOutput> {
    Ok(StatsOutput {
        status: Status::Success,
        stats: stats::get_stats(db)?,
    })
}

#[must_use]
pub fn health(db: &Database) -> HealthOutput {
    match stats::get_stats(db) {
        Ok(stats) => HealthOutput::Healthy {
            database: "connected".into(),
            total_files: stats.total_files,
        },
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            HealthOutput::Unhealthy {
                error: e.to_string(),
            }
        }
    }
}
