use wot_core::CoreError;

/// Errors raised while resolving a keyring dump.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A record violates the key-major ordering of the dump.
    #[error("line {line}: structural error: {reason}")]
    Structural { line: usize, reason: String },

    /// A record's fields cannot be decoded.
    #[error("line {line}: malformed record: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("{stage}: I/O error: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ResolveError {
    pub(crate) fn structural(line: usize, reason: impl Into<String>) -> Self {
        Self::Structural {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(stage: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io { stage, source }
    }
}
