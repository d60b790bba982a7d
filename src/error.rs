use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error, no response from upstream: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{}:{line}: {reason}", path.display())]
    Input {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The human readable part of the error, without the variant prefix.
    /// Used when reporting a failed identifier.
    pub fn message(&self) -> String {
        match self {
            Error::Upstream { message, .. } => message.clone(),
            Error::MalformedResponse(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Transport failures, throttling and server side errors are worth another try.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
