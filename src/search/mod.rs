//! Filtered text search over indexed records.
//!
//! Matching is a plain case-insensitive substring test across `summary`,
//! `key_elements` and `tags`; there is no relevance score. Results are ordered
//! by most recent `indexed_at`.

pub mod matcher;

use std::str::FromStr;

use tracing::debug;

use crate::db::{Column, Database, Predicate, Scan};
use crate::error::{KbError, Result};
use crate::models::file::{FileRecord, FileType, Technology};

/// Default number of search results.
pub const DEFAULT_LIMIT: usize = 10;
/// Upper bound on search results.
pub const MAX_LIMIT: usize = 100;
/// Default number of results for a type listing.
pub const BY_TYPE_DEFAULT_LIMIT: usize = 50;
/// Upper bound on results for a type listing.
pub const BY_TYPE_MAX_LIMIT: usize = 100;

/// Resolve a caller-supplied limit: default when absent, clamped to `1..=max`.
#[must_use]
pub fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).clamp(1, max)
}

/// A free-text query with optional categorical filters.
///
/// Empty filter lists mean "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub file_types: Vec<FileType>,
    pub technologies: Vec<Technology>,
    pub repos: Vec<String>,
    pub tags: Vec<String>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn file_types(mut self, file_types: Vec<FileType>) -> Self {
        self.file_types = file_types;
        self
    }

    #[must_use]
    pub fn technologies(mut self, technologies: Vec<Technology>) -> Self {
        self.technologies = technologies;
        self
    }

    #[must_use]
    pub fn repos(mut self, repos: Vec<String>) -> Self {
        self.repos = repos;
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn to_scan(&self) -> Scan {
        let mut scan = Scan::new(clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT))
            .filter(Predicate::Text(self.text.clone()));
        if !self.file_types.is_empty() {
            let values = self.file_types.iter().map(|f| f.as_str().to_string());
            scan = scan.filter(Predicate::In(Column::FileType, values.collect()));
        }
        if !self.technologies.is_empty() {
            let values = self.technologies.iter().map(|t| t.as_str().to_string());
            scan = scan.filter(Predicate::In(Column::Technology, values.collect()));
        }
        if !self.repos.is_empty() {
            scan = scan.filter(Predicate::In(Column::Repo, self.repos.clone()));
        }
        if !self.tags.is_empty() {
            scan = scan.filter(Predicate::TagsAny(self.tags.clone()));
        }
        scan
    }
}

/// Parse every value of a filter list, failing on the first unknown one.
pub fn parse_filter<T>(field: &str, values: &[String]) -> Result<Vec<T>>
where
    T: FromStr<Err = String>,
{
    values
        .iter()
        .map(|v| {
            v.parse::<T>()
                .map_err(|reason| KbError::invalid_input(field, reason))
        })
        .collect()
}

/// Run a search. No matches is an empty result, not an error.
pub fn search(db: &Database, query: &SearchQuery) -> Result<Vec<FileRecord>> {
    let scan = query.to_scan();
    let results = db.scan(&scan)?;
    debug!(
        query = %query.text,
        limit = scan.limit,
        hits = results.len(),
        "search"
    );
    Ok(results)
}

/// List records of one file type, optionally restricted to a repository.
pub fn search_by_type(
    db: &Database,
    file_type: FileType,
    repo: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<FileRecord>> {
    let mut scan = Scan::new(clamp_limit(limit, BY_TYPE_DEFAULT_LIMIT, BY_TYPE_MAX_LIMIT))
        .filter(Predicate::Eq(Column::FileType, file_type.as_str().to_string()));
    if let Some(repo) = repo.filter(|r| !r.is_empty()) {
        scan = scan.filter(Predicate::Eq(Column::Repo, repo.to_string()));
    }
    db.scan(&scan)
}
