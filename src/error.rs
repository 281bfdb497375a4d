use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure to obtain the program CSV text from its source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("program source not found: {path}")]
    NotFound { path: PathBuf },

    #[error("could not read program source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("program source {path} is not valid UTF-8 text")]
    InvalidText { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything a one-shot command can fail with. Reported as `Error: ...`.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("delimiter {0:?} cannot be used for CSV export")]
    Delimiter(char),
}
