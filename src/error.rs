use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while indexing a corpus or building samples from it.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The corpus root or one of its label directories could not be read.
    #[error("cannot read corpus directory {}: {source}", path.display())]
    CorpusAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A label that is not part of the vocabulary.
    #[error("unknown label `{0}`")]
    UnknownLabel(String),

    /// A partition mode other than train, validation or test.
    #[error("invalid dataset mode `{0}` (expected train, val or test)")]
    InvalidMode(String),

    /// The audio file is unreadable, corrupt, unsupported or empty.
    #[error("cannot decode {}: {reason}", path.display())]
    AudioDecode { path: PathBuf, reason: String },

    #[error("invalid dataset configuration: {0}")]
    InvalidConfig(String),

    #[error("sample index {index} out of range for partition of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot export sample to {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },
}

impl DatasetError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DatasetError::AudioDecode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn export(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DatasetError::Export {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
