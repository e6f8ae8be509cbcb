use crate::lmul::Lmul;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The observation table does not support the scaling claims drawn from it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("operation `{operation}` has no observation for {lmul}")]
    MissingData { operation: String, lmul: Lmul },

    #[error("operation `{operation}` has more than one observation for {lmul}")]
    DuplicateObservation { operation: String, lmul: Lmul },

    #[error("operation `{operation}` at {lmul} has invalid {field}: {value}")]
    InvalidValue {
        operation: String,
        lmul: Lmul,
        field: &'static str,
        value: f64,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("can't open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("can't parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
