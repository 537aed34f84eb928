use serde::Serialize;

use super::Status;
use crate::db::Database;
use crate::error::{KbError, Result};
use crate::models::file::{FileRecord, FileType};
use crate::search::{self, parse_filter, SearchQuery};

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutput {
    pub status: Status,
    pub count: usize,
    pub results: Vec<FileRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ByTypeOutput {
    pub status: Status,
    pub file_type: FileType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub count: usize,
    pub files: Vec<FileRecord>,
}

/// Raw search request as it arrives from a caller; filter values are checked
/// against the enumerations before anything is queried.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub file_types: Vec<String>,
    pub technologies: Vec<String>,
    pub repos: Vec<String>,
    pub tags: Vec<String>,
    pub limit: Option<usize>,
}

pub fn search_knowledge(db: &Database, request: SearchRequest) -> Result<SearchOutput> {
    let query = SearchQuery::new(request.query)
        .file_types(parse_filter("file_types", &request.file_types)?)
        .technologies(parse_filter("technologies", &request.technologies)?)
        .repos(request.repos)
        .tags(request.tags)
        .limit(request.limit);
    let results = search::search(db, &query)?;
    Ok(SearchOutput {
        status: Status::Success,
        count: results.len(),
        results,
    })
}

pub fn search_by_type(
    db: &Database,
    file_type: &str,
    repo: Option<String>,
    limit: Option<usize>,
) -> Result<ByTypeOutput> {
    let file_type: FileType = file_type
        .parse()
        .map_err(|reason| KbError::invalid_input("file_type", reason))?;
    let repo = repo.filter(|r| !r.is_empty());
    let files = search::search_by_type(db, file_type, repo.as_deref(), limit)?;
    Ok(ByTypeOutput {
        status: Status::Success,
        file_type,
        repo,
        count: files.len(),
        files,
    })
}
