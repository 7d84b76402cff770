use std::path::PathBuf;

use thiserror::Error;

/// Every way a run can fail. All variants are fatal for the current run.
#[derive(Debug, Error)]
pub enum Error {
    /// The comparison document does not match the expected structure.
    #[error("comparison document is invalid: {0}")]
    Validation(String),

    /// The triggering event carries no pull request.
    #[error("context missing 'pull_request': {0}")]
    MissingContext(String),

    /// The approval was recorded under a different identity than the bot's,
    /// which means the credential belongs to someone else.
    #[error("should have approved pull request as '{expected}' instead of '{actual}'")]
    IdentityMismatch { expected: String, actual: String },

    #[error("{operation} failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn transport(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Error::Transport { operation, source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
