use std::path::PathBuf;

use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

/// Fatal failures of a load run. A missing source file is not one of them;
/// absent sources are skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not prepare store at {path:?}: {source}")]
    StoreInit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open store at {path:?}: {source}")]
    StoreConnection {
        path: PathBuf,
        #[source]
        source: diesel::result::ConnectionError,
    },

    #[error("could not create schema in {path:?}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: diesel::result::Error,
    },

    #[error("could not read {path:?} as csv: {source}")]
    SourceParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path:?} is missing required column {column:?}")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{path:?} row {row}: cannot coerce {column} value {value:?}: {reason}")]
    FieldCoercion {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("could not insert into {table}: {source}")]
    Insert {
        table: &'static str,
        #[source]
        source: diesel::result::Error,
    },

    #[error("could not checksum {path:?}: {source}")]
    Checksum {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sha256sum for {path:?} did not match configured value: {actual} != {expected}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// A single field that failed coercion, before the file and row are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub column: &'static str,
    pub value: String,
    pub reason: String,
}

impl CoercionError {
    pub fn new(column: &'static str, value: &str, reason: impl Into<String>) -> CoercionError {
        CoercionError {
            column,
            value: value.to_owned(),
            reason: reason.into(),
        }
    }

    pub fn at(self, path: &std::path::Path, row: usize) -> LoadError {
        LoadError::FieldCoercion {
            path: path.to_path_buf(),
            row,
            column: self.column,
            value: self.value,
            reason: self.reason,
        }
    }
}
