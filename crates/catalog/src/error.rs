use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::color::ColorParseError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("category '{0}' is defined more than once")]
    DuplicateCategory(String),
    #[error("category '{category}' references unknown palette token '{token}'")]
    UnresolvedColor { category: String, token: String },
    #[error("invalid color '{value}': {reason}")]
    InvalidColor {
        value: String,
        reason: ColorParseError,
    },
    #[error("invalid color expression '{0}'")]
    InvalidColorExpr(String),
    #[error("category '{category}' has an invalid pattern: {reason}")]
    InvalidPattern { category: String, reason: String },
    #[error("category '{category}' is missing required field '{field}'")]
    MissingField {
        category: String,
        field: &'static str,
    },
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize catalog {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write catalog {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
