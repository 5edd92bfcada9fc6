use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DriverError>;

/// Fatal driver failures.
///
/// Recoverable problems (bad flag combinations, unexpected inputs, missing
/// SDKs) are reported through the [`DiagnosticEngine`](crate::DiagnosticEngine)
/// instead, so that as many issues as possible surface in a single run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The invoked executable name is not one of the recognized driver
    /// personalities.
    #[error("invalid driver name: {0}")]
    InvalidDriverName(String),
    /// The invocation should be handed to another tool verbatim (e.g.
    /// `swift -frontend ...`); the driver core does not plan these.
    #[error("invocation must be passed through to `{0}`")]
    SubcommandPassthrough(String),
    /// No toolchain is available for the requested target.
    #[error("unknown target triple: '{0}'")]
    UnknownTarget(String),
    /// Planning for this compilation mode has not been built yet.
    #[error("{0} mode is not yet implemented")]
    Unimplemented(&'static str),
    #[error("malformed output file map {path}: {source}")]
    OutputFileMap {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Message(String),
}

impl DriverError {
    pub(crate) fn msg(msg: impl std::fmt::Display) -> Self {
        DriverError::Message(msg.to_string())
    }
}
