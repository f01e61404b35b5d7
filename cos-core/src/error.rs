//! Error types for cOS

use thiserror::Error;

/// Result type alias
pub type CosResult<T> = Result<T, CosError>;

/// Main error type
///
/// Every message names the operation that failed and the offending path or
/// command, so callers that only see the text can still attribute it.
#[derive(Error, Debug)]
pub enum CosError {
    #[error("{op}: search path not found: {path}")]
    SearchPathNotFound { op: &'static str, path: String },

    #[error("{op}: glob failed for {pattern}: {message}")]
    Glob {
        op: &'static str,
        pattern: String,
        message: String,
    },

    #[error("read failed for {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode {path} as {encoding}")]
    Decode { path: String, encoding: String },

    #[error("Compile failed for file:\n\n{path}\n\n{message}")]
    Compile { path: String, message: String },

    #[error("Frame padding not found in {0}")]
    FramePaddingNotFound(String),

    #[error("Invalid frame pattern: {0}")]
    InvalidFramePattern(String),

    #[error("No frames found for {0}")]
    NoFrames(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CosError {
    /// Wrap an I/O error raised while reading `path`.
    pub fn read(path: impl Into<String>, source: std::io::Error) -> Self {
        CosError::Read { path: path.into(), source }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            CosError::NotFound(_) | CosError::SearchPathNotFound { .. } => true,
            CosError::Read { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            CosError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub fn is_compile_error(&self) -> bool {
        matches!(self, CosError::Compile { .. })
    }
}
