use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("editor failed: {0}")]
    Editor(String),

    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("failed to start logger: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
