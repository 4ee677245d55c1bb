use std::path::PathBuf;

use crate::diagnostics::Diagnostic;
use thiserror::Error;

/// Problems with a unit as a whole, before or instead of parsing it
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid glob pattern '{pattern}': {error}")]
    InvalidGlob { pattern: String, error: String },
    #[error("Failed to read file '{path}': {error}")]
    FileReadError { path: PathBuf, error: String },
    #[error("Cannot decode '{path}': {diagnostic}")]
    InvalidEncoding { path: PathBuf, diagnostic: Diagnostic },
}

impl BuildError {
    pub fn code(&self) -> String {
        match self {
            BuildError::InvalidGlob { .. } => "InvalidGlob".into(),
            BuildError::FileReadError { .. } => "FileReadError".into(),
            BuildError::InvalidEncoding { diagnostic, .. } => {
                format!("InvalidEncoding.{}", diagnostic.code())
            }
        }
    }
}
