use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KbError, Result};

/// Auxiliary attributes attached to a record (line count, complexity, ...).
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Kind of source file a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Bicep,
    Terraform,
    Helm,
    Yaml,
    Csharp,
    Python,
    Javascript,
    Typescript,
    Powershell,
    Bash,
    Markdown,
    Dockerfile,
    Env,
    Json,
}

impl FileType {
    pub const ALL: [FileType; 14] = [
        Self::Bicep,
        Self::Terraform,
        Self::Helm,
        Self::Yaml,
        Self::Csharp,
        Self::Python,
        Self::Javascript,
        Self::Typescript,
        Self::Powershell,
        Self::Bash,
        Self::Markdown,
        Self::Dockerfile,
        Self::Env,
        Self::Json,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bicep => "bicep",
            Self::Terraform => "terraform",
            Self::Helm => "helm",
            Self::Yaml => "yaml",
            Self::Csharp => "csharp",
            Self::Python => "python",
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::Powershell => "powershell",
            Self::Bash => "bash",
            Self::Markdown => "markdown",
            Self::Dockerfile => "dockerfile",
            Self::Env => "env",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ft| ft.as_str() == s)
            .ok_or_else(|| format!("unknown value '{s}'"))
    }
}

/// Technology category a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Technology {
    #[serde(rename = "infrastructure-as-code")]
    Infrastructure,
    #[serde(rename = "backend")]
    Backend,
    #[serde(rename = "frontend")]
    Frontend,
    #[serde(rename = "devops")]
    Devops,
    #[serde(rename = "testing")]
    Testing,
    #[serde(rename = "documentation")]
    Documentation,
    #[serde(rename = "configuration")]
    Configuration,
}

impl Technology {
    pub const ALL: [Technology; 7] = [
        Self::Infrastructure,
        Self::Backend,
        Self::Frontend,
        Self::Devops,
        Self::Testing,
        Self::Documentation,
        Self::Configuration,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure-as-code",
            Self::Backend => "backend",
            Self::Frontend => "frontend",
            Self::Devops => "devops",
            Self::Testing => "testing",
            Self::Documentation => "documentation",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Technology {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown value '{s}'"))
    }
}

/// One indexed file's structured knowledge, keyed by `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub repo: String,
    pub file_type: FileType,
    pub technology: Technology,
    /// 1-2 sentence description of the file.
    pub summary: String,
    /// Named entities inside the file (resources, classes, functions).
    pub key_elements: Vec<String>,
    /// Paths this file depends on, as submitted.
    pub dependencies: Vec<String>,
    /// Paths that depend on this file, as submitted.
    pub dependents: Vec<String>,
    pub tags: Vec<String>,
    /// Opaque hash for change detection by the submitting agent.
    pub content_hash: String,
    pub indexed_at: DateTime<Utc>,
    pub metadata: Metadata,
}

/// Unvalidated record as submitted by an agent.
///
/// Every field is optional so that a missing field surfaces as a per-record
/// validation failure. Decode list items with [`FileSubmission::from_value`]
/// so a wrong-typed field fails only its own record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSubmission {
    pub path: Option<String>,
    pub repo: Option<String>,
    pub file_type: Option<String>,
    pub technology: Option<String>,
    pub summary: Option<String>,
    pub key_elements: Vec<String>,
    pub dependencies: Vec<String>,
    pub dependents: Vec<String>,
    pub tags: Vec<String>,
    pub content_hash: Option<String>,
    #[serde(alias = "file_metadata")]
    pub metadata: Metadata,
}

const MISSING_PATH: &str = "<missing path>";

impl FileSubmission {
    /// Decode one record of a submitted document.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let path = value
            .get("path")
            .and_then(serde_json::Value::as_str)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(MISSING_PATH)
            .to_string();
        serde_json::from_value(value).map_err(|e| KbError::Malformed {
            path,
            reason: e.to_string(),
        })
    }

    /// Best-effort identity for error reporting.
    #[must_use]
    pub fn display_path(&self) -> &str {
        match self.path.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => MISSING_PATH,
        }
    }

    /// Check required fields and enumerations, producing a storable record.
    pub fn validate(self, indexed_at: DateTime<Utc>) -> Result<FileRecord> {
        let path = required(self.path, MISSING_PATH, "path")?;
        let repo = required(self.repo, &path, "repo")?;
        let file_type = required(self.file_type, &path, "file_type")?
            .parse::<FileType>()
            .map_err(|reason| KbError::validation(&path, "file_type", reason))?;
        let technology = required(self.technology, &path, "technology")?
            .parse::<Technology>()
            .map_err(|reason| KbError::validation(&path, "technology", reason))?;
        let summary = required(self.summary, &path, "summary")?;
        let content_hash = required(self.content_hash, &path, "content_hash")?;

        Ok(FileRecord {
            path,
            repo,
            file_type,
            technology,
            summary,
            key_elements: self.key_elements,
            dependencies: self.dependencies,
            dependents: self.dependents,
            tags: self.tags,
            content_hash,
            indexed_at,
            metadata: self.metadata,
        })
    }
}

/// Blank strings count as missing.
fn required(value: Option<String>, path: &str, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(KbError::validation(path, field, "missing required field")),
    }
}
