//! Lookups anchored on one known record: its full context, its same-repo
//! neighbours, and its dependency edges.

use std::collections::HashSet;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries::{get_edges, get_record, scan_records};
use crate::db::{Column, Database, Order, Predicate, Scan};
use crate::error::{KbError, Result};
use crate::models::file::FileRecord;
use crate::search::clamp_limit;

/// Default number of related records.
pub const RELATED_DEFAULT_LIMIT: usize = 10;
/// Upper bound on related records.
pub const RELATED_MAX_LIMIT: usize = 50;

/// Exact lookup. Absence is a normal result.
pub fn get_file_context(db: &Database, path: &str) -> Result<Option<FileRecord>> {
    db.get(path)
}

/// Other records in the source's repository, same technology first, then most
/// recently indexed. Unknown source paths yield an empty list.
pub fn find_related(db: &Database, path: &str, limit: Option<usize>) -> Result<Vec<FileRecord>> {
    let limit = clamp_limit(limit, RELATED_DEFAULT_LIMIT, RELATED_MAX_LIMIT);
    db.read(|tx| {
        let Some(source) = get_record(tx, path)? else {
            return Ok(Vec::new());
        };
        let scan = Scan::new(limit)
            .filter(Predicate::Eq(Column::Repo, source.repo))
            .filter(Predicate::NotEq(Column::Path, source.path))
            .order(Order::TechnologyFirst(source.technology));
        scan_records(tx, &scan)
    })
}

/// A record reached while walking stored edges away from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub path: String,
    /// Hops from the root; direct edges are depth 1.
    pub depth: usize,
    /// Whether the path has a record of its own.
    pub indexed: bool,
}

/// Dependency view of one record.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyGraph {
    pub root: String,
    /// The root's stored `dependencies`, verbatim.
    pub dependencies: Vec<String>,
    /// The root's stored `dependents`, verbatim.
    pub dependents: Vec<String>,
    /// Deepest hop reached in either direction (at least 1).
    pub depth: usize,
    pub max_depth: usize,
    /// Everything reachable through `dependencies` edges, breadth-first.
    pub upstream: Vec<GraphNode>,
    /// Everything reachable through `dependents` edges, breadth-first.
    pub downstream: Vec<GraphNode>,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Upstream,
    Downstream,
}

/// Walk stored edges from `path` up to `max_depth` hops in each direction.
///
/// The root must exist. Paths without a record are leaves. Each path appears
/// at most once, at its shortest distance from the root.
pub fn analyze_dependencies(db: &Database, path: &str, max_depth: usize) -> Result<DependencyGraph> {
    let max_depth = max_depth.max(1);
    db.read(|tx| {
        let (dependencies, dependents) =
            get_edges(tx, path)?.ok_or_else(|| KbError::FileNotFound {
                path: path.to_string(),
            })?;

        let upstream = traverse(tx, path, &dependencies, Direction::Upstream, max_depth)?;
        let downstream = traverse(tx, path, &dependents, Direction::Downstream, max_depth)?;
        let depth = upstream
            .iter()
            .chain(&downstream)
            .map(|n| n.depth)
            .max()
            .unwrap_or(1);

        Ok(DependencyGraph {
            root: path.to_string(),
            dependencies,
            dependents,
            depth,
            max_depth,
            upstream,
            downstream,
        })
    })
}

fn traverse(
    conn: &Connection,
    root: &str,
    first_hop: &[String],
    direction: Direction,
    max_depth: usize,
) -> Result<Vec<GraphNode>> {
    let mut visited: HashSet<String> = HashSet::from([root.to_string()]);
    let mut frontier: Vec<String> = first_hop
        .iter()
        .filter(|p| visited.insert((*p).clone()))
        .cloned()
        .collect();
    let mut nodes = Vec::new();
    let mut depth = 1;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for path in frontier {
            let edges = get_edges(conn, &path)?;
            let indexed = edges.is_some();
            if let Some((dependencies, dependents)) = edges.filter(|_| depth < max_depth) {
                let outgoing = match direction {
                    Direction::Upstream => dependencies,
                    Direction::Downstream => dependents,
                };
                for p in outgoing {
                    if visited.insert(p.clone()) {
                        next.push(p);
                    }
                }
            }
            nodes.push(GraphNode {
                path,
                depth,
                indexed,
            });
        }
        frontier = next;
        depth += 1;
    }
    Ok(nodes)
}
