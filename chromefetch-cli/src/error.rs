//! CLI error type wrapping the library's per-area errors.

use thiserror::Error;

use chromefetch::config::ConfigError;
use chromefetch::deps::DepsError;
use chromefetch::download::DownloadError;
use chromefetch::remedy::RemedyError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Remedy(#[from] RemedyError),

    #[error(transparent)]
    Deps(#[from] DepsError),
}
