use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures the dispatcher reports back to the user.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("directory '{}' not found", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error loading song: {name} - {reason}")]
    PlaybackLoadFailed { name: String, reason: String },

    #[error("{0}")]
    InvalidSelection(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("queue is empty")]
    QueueEmpty,

    #[error("error saving configuration: {0}")]
    Persist(String),
}

impl PlayerError {
    /// Whether the browsing session can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::DirectoryUnavailable { .. })
    }
}
