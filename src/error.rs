use std::{ffi::OsString, io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown cache mapping: {0}")]
    UnknownMapping(String),
    #[error("Unknown cache organization: {0}")]
    UnknownOrganization(String),
    #[error("Cache size must be greater than zero")]
    ZeroSize,
    #[error("Cache size {0} is not a multiple of the {block}-byte block size", block = crate::cache::BLOCK_SIZE)]
    NotBlockMultiple(u32),
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Unable to read the trace file: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: Unknown access type {kind:?}")]
    UnknownKind { line: usize, kind: String },
    #[error("line {line}: invalid address {text:?}")]
    BadAddress { line: usize, text: String },
    #[error("line {line}: not valid UTF-8 text")]
    NotText { line: usize },
    #[error("line {line}: unexpected trailing input {text:?}")]
    TrailingInput { line: usize, text: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("{0}")]
    Args(#[from] pico_args::Error),
    #[error("unexpected arguments: {0:?}")]
    UnexpectedArgs(Vec<OsString>),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}: {source}", .path.display())]
    File { path: PathBuf, source: io::Error },
}

impl Error {
    /// Whether the error came from how the program was invoked.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Args(_) | Error::UnexpectedArgs(_)
        )
    }
}
