//! User-facing failures of the recap pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type RecapResult<T> = Result<T, RecapError>;

#[derive(Debug, Error)]
pub enum RecapError {
    #[error("could not find conversations.json inside `{}`", path.display())]
    ExportNotFound { path: PathBuf },
    #[error("reading `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected the export to be a JSON array of conversations")]
    NotAnArray,
    #[error("no messages found in this export")]
    NoMessages,
}

impl RecapError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by the export's content rather than the filesystem.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Json { .. } | Self::NotAnArray | Self::NoMessages
        )
    }
}
