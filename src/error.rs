use miette::Diagnostic;
use thiserror::Error;

/// Main error type for tilemerge operations
#[derive(Error, Diagnostic, Debug)]
pub enum MergeError {
    #[error("IO error: {0}")]
    #[diagnostic(code(tilemerge::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(tilemerge::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("{path}: {message}")]
    #[diagnostic(code(tilemerge::document))]
    Document {
        path: std::path::PathBuf,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{path}: {message}")]
    #[diagnostic(code(tilemerge::image))]
    Image {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("cannot write {path}: {message}")]
    #[diagnostic(code(tilemerge::write))]
    Write {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(tilemerge::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, MergeError>;
