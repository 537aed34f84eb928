use serde::Serialize;

use super::Status;
use crate::config::DependencySettings;
use crate::db::Database;
use crate::error::Result;
use crate::relations::{self, DependencyGraph};

#[derive(Debug, Clone, Serialize)]
pub struct DependencyOutput {
    pub status: Status,
    pub dependency_graph: DependencyGraph,
}

/// Unknown roots are errors here, unlike the other lookups.
pub fn analyze_dependencies(
    db: &Database,
    path: &str,
    max_depth: Option<usize>,
    limits: &DependencySettings,
) -> Result<DependencyOutput> {
    let dependency_graph = relations::analyze_dependencies(db, path, limits.resolve(max_depth))?;
    Ok(DependencyOutput {
        status: Status::Success,
        dependency_graph,
    })
}
