//! MCP tool parameter types.
//!
//! Each struct corresponds to the input parameters for one MCP tool.
//! Record fields are optional at this layer so that a missing required field
//! surfaces as a structured validation error instead of a protocol error.

use rmcp::schemars;
use serde::Deserialize;

use crate::models::file::{FileSubmission, Metadata};
use crate::operations::SearchRequest;

// ── Index ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct FileParams {
    #[schemars(description = "Unique file path (required)")]
    pub path: Option<String>,
    #[schemars(description = "Repository name (required)")]
    pub repo: Option<String>,
    #[schemars(
        description = "File type (required): bicep, terraform, helm, yaml, csharp, python, javascript, typescript, powershell, bash, markdown, dockerfile, env, json"
    )]
    pub file_type: Option<String>,
    #[schemars(
        description = "Technology (required): infrastructure-as-code, backend, frontend, devops, testing, documentation, configuration"
    )]
    pub technology: Option<String>,
    #[schemars(description = "What the file does (required)")]
    pub summary: Option<String>,
    #[schemars(description = "Functions, classes, resources or other notable elements")]
    #[serde(default)]
    pub key_elements: Vec<String>,
    #[schemars(description = "Paths this file depends on")]
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[schemars(description = "Paths that depend on this file")]
    #[serde(default)]
    pub dependents: Vec<String>,
    #[schemars(description = "Free-form labels")]
    #[serde(default)]
    pub tags: Vec<String>,
    #[schemars(description = "Hash of the file content (required)")]
    pub content_hash: Option<String>,
    #[schemars(description = "Additional attributes such as line count or complexity")]
    #[serde(default, alias = "file_metadata")]
    pub metadata: Metadata,
}

impl From<FileParams> for FileSubmission {
    fn from(p: FileParams) -> Self {
        Self {
            path: p.path,
            repo: p.repo,
            file_type: p.file_type,
            technology: p.technology,
            summary: p.summary,
            key_elements: p.key_elements,
            dependencies: p.dependencies,
            dependents: p.dependents,
            tags: p.tags,
            content_hash: p.content_hash,
            metadata: p.metadata,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BatchParams {
    /// Items are decoded one by one so a malformed item fails alone.
    #[schemars(
        with = "Vec<FileParams>",
        description = "Files to index; each one succeeds or fails on its own"
    )]
    pub files: Vec<serde_json::Value>,
}

// ── Search ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Case-insensitive text matched against summary, key elements and tags")]
    pub query: String,
    #[schemars(description = "Restrict to these file types")]
    pub file_types: Option<Vec<String>>,
    #[schemars(description = "Restrict to these technologies")]
    pub technologies: Option<Vec<String>>,
    #[schemars(description = "Restrict to these repositories")]
    pub repos: Option<Vec<String>>,
    #[schemars(description = "Keep records carrying at least one of these tags")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Maximum results (default: 10, max: 100)")]
    pub limit: Option<usize>,
}

impl From<SearchParams> for SearchRequest {
    fn from(p: SearchParams) -> Self {
        Self {
            query: p.query,
            file_types: p.file_types.unwrap_or_default(),
            technologies: p.technologies.unwrap_or_default(),
            repos: p.repos.unwrap_or_default(),
            tags: p.tags.unwrap_or_default(),
            limit: p.limit,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ByTypeParams {
    #[schemars(description = "File type to list")]
    pub file_type: String,
    #[schemars(description = "Optional repository filter")]
    pub repo: Option<String>,
    #[schemars(description = "Maximum results (default: 50, max: 100)")]
    pub limit: Option<usize>,
}

// ── Relations ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathParams {
    #[schemars(description = "Exact file path")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RelatedParams {
    #[schemars(description = "File path to find related files for")]
    pub path: String,
    #[schemars(description = "Maximum results (default: 10, max: 50)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DepsParams {
    #[schemars(description = "File path to analyze")]
    pub path: String,
    #[schemars(description = "Hops to follow along stored edges (default: 1)")]
    pub max_depth: Option<usize>,
}
