use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning captions into corpus statistics.
#[derive(Debug, Error)]
pub enum PreproError {
    /// The caption produced no tokens, so there is no trailing period to check.
    #[error("caption is empty after tokenization")]
    EmptySentence,

    #[error("vocabulary has no `UNK` entry for out-of-vocabulary word {word:?}")]
    MissingUnknownMarker { word: String },

    #[error("vocabulary index {key:?} is not a non-negative integer")]
    InvalidVocabIndex { key: String },

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Persist(#[from] tempfile::PersistError),
}

impl PreproError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
