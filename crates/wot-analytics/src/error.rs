use std::path::PathBuf;

use wot_resolve::ResolveError;

/// Errors that stop an analytics run.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("{}: I/O error: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: read error: {source}")]
    Read {
        file: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} line {line}: malformed record: {reason}")]
    Malformed {
        file: &'static str,
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),

    #[error("clustering worker failed: {0}")]
    Worker(String),
}

impl AnalyticsError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
