//! Content pipeline errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while listing, parsing or serializing content files
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid front-matter in {path:?}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("Missing front-matter field `{field}` in {path:?}")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Unparseable date {value:?} in {path:?}")]
    InvalidDate { path: PathBuf, value: String },

    #[error("Malformed document at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Highlight error: {0}")]
    Highlight(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Content task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContentError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the source file to errors raised before the path was known
    pub(crate) fn in_file(self, path: &std::path::Path) -> Self {
        match self {
            ContentError::FrontMatter { message, .. } => ContentError::FrontMatter {
                path: path.to_path_buf(),
                message,
            },
            ContentError::Malformed { line, reason } => ContentError::Malformed {
                line,
                reason: format!("{} ({})", reason, path.display()),
            },
            other => other,
        }
    }
}
