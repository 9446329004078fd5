//! Error types for the download supervisor.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use crate::fsops::EraseError;

/// Errors that can occur while supervising one download attempt.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The installer process could not be started. Nothing was created, so
    /// no cleanup runs; this is not worth retrying.
    #[error("failed to start installer: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },

    /// The installer exited with a failure status. The installation root
    /// was erased before this surfaced; a retry starts from clean state.
    #[error("chromium download failed: installer exited with {status}")]
    Failed { status: ExitStatus },

    /// Erasing the installation root after a failed download itself failed.
    /// Carries the installer's exit status so the download failure is not
    /// masked by the cleanup failure.
    #[error("cleanup after failed download (installer exited with {status}) failed: {source}")]
    Cleanup {
        status: ExitStatus,
        #[source]
        source: EraseError,
    },

    /// Waiting on the installer process failed.
    #[error("failed to wait on installer: {source}")]
    Wait {
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    /// Whether a retry could plausibly change the outcome.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Cleanup { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_display() {
        let err = DownloadError::Spawn {
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("failed to start installer"));
    }

    #[test]
    fn test_spawn_error_not_transient() {
        let err = DownloadError::Spawn {
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(!err.is_transient());
    }
}
