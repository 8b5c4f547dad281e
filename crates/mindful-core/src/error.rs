use std::path::PathBuf;

/// Failure of the presentation surface (overlay or countdown missing, tab
/// could not be closed). Logged by the runtime, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("presentation surface unavailable: {0}")]
    Unavailable(String),

    #[error("could not close browsing context: {0}")]
    CloseFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Cross-context delivery failure. Observers fall back to the stored snapshot.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("no browsing context listening at {0}")]
    NotListening(PathBuf),

    #[error("browsing context did not answer in time")]
    Timeout,

    #[error("browsing context has shut down")]
    ContextGone,

    #[error("unexpected response: {0}")]
    Unexpected(String),

    #[error("IPC transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IPC encoding error: {0}")]
    Codec(#[from] bincode::Error),
}
