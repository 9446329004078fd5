//! Artifact download supervision.
//!
//! The external installer does the actual downloading; this module's job is
//! to decide whether it worked. Exit codes alone are unreliable across
//! platforms, so the supervisor watches the installer's stdout for the
//! download-completion banner and settles the outcome from the first of:
//! banner observed, clean exit, failed exit, or failure to start. On a
//! failed exit the managed installation root is erased before the error is
//! surfaced, so a retrying caller never runs against stale partial state.
//!
//! The supervisor performs no retries itself; wrap [`DownloadSupervisor::download`]
//! in [`crate::retry::run_with_retry`].

mod error;
mod marker;
mod supervisor;

pub use error::DownloadError;
pub use marker::is_completion_chunk;
pub use supervisor::{DownloadConfig, DownloadSupervisor};
