use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KbError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("invalid {field} for {path}: {reason}")]
    Validation {
        path: String,
        field: String,
        reason: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("malformed record {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification reported to callers alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
    Internal,
}

impl KbError {
    pub fn validation(
        path: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            path: path.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidInput { .. } | Self::Malformed { .. } => {
                ErrorKind::Validation
            }
            Self::FileNotFound { .. } => ErrorKind::NotFound,
            Self::Database(_) | Self::Io(_) => ErrorKind::Storage,
            Self::Json(_) | Self::Yaml(_) | Self::Config(_) | Self::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// The record path this error is about, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Validation { path, .. } | Self::Malformed { path, .. } | Self::FileNotFound { path } => {
                Some(path)
            }
            _ => None,
        }
    }

    /// The offending input field for validation failures.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } | Self::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_path_and_field() {
        let err = KbError::validation("/repo/a.py", "file_type", "unknown value 'cobol'");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.path(), Some("/repo/a.py"));
        assert_eq!(err.field(), Some("file_type"));
        assert_eq!(
            err.to_string(),
            "invalid file_type for /repo/a.py: unknown value 'cobol'"
        );
    }

    #[test]
    fn storage_errors_are_classified() {
        let err = KbError::from(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.path().is_none());
    }

    #[test]
    fn not_found_message_names_path() {
        let err = KbError::FileNotFound {
            path: "/x/y.tf".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "File not found: /x/y.tf");
    }
}
