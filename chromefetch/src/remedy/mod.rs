//! Platform remediation for a known-defective runtime/artifact pairing.
//!
//! One exact runtime patch release (Node `v14.0.0`) ships a broken archive
//! extraction path that affects installers newer than major version 2. On
//! that pairing the downloaded archive is present but unusable, so after a
//! successful download we erase the half-extracted versioned directory,
//! re-extract the archive with the system `unzip`, and delete the archive.
//!
//! This is a narrow compatibility patch, not a general code path: it runs
//! once after overall download success and its failures are fatal, never
//! retried.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use semver::Version;
use thiserror::Error;
use tracing::{debug, info};

use crate::exec;
use crate::fsops::{self, EraseError};

/// The exact runtime version with the broken extraction path.
pub const KNOWN_BAD_RUNTIME: &str = "v14.0.0";

/// Artifact major versions above this are affected on the bad runtime.
pub const AFFECTED_ABOVE_MAJOR: u64 = 2;

/// Program used to probe the runtime version.
const RUNTIME_PROGRAM: &str = "node";

/// Errors from the remediation step. All are fatal to the flow.
#[derive(Debug, Error)]
pub enum RemedyError {
    /// Could not determine the runtime version.
    #[error("failed to probe runtime version: {reason}")]
    VersionProbe { reason: String },

    /// Erasing the half-extracted versioned directory failed.
    #[error("remediation cleanup failed: {0}")]
    Cleanup(#[from] EraseError),

    /// The external extraction utility failed.
    #[error("failed to extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    /// Deleting the now-redundant archive failed.
    #[error("failed to remove archive {}: {source}", path.display())]
    ArchiveRemoval {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Probe the running runtime's exact version string (e.g. `v14.0.0`).
pub async fn probe_runtime_version() -> Result<String, RemedyError> {
    let output = exec::run_capture(RUNTIME_PROGRAM, ["--version"])
        .await
        .map_err(|e| RemedyError::VersionProbe {
            reason: format!("failed to run {RUNTIME_PROGRAM}: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RemedyError::VersionProbe {
            reason: format!("{RUNTIME_PROGRAM} --version exited with {}: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Decide whether the runtime/artifact pairing needs the manual extraction.
pub fn needs_remediation(runtime_version: &str, artifact_version: &Version) -> bool {
    runtime_version.trim() == KNOWN_BAD_RUNTIME && artifact_version.major > AFFECTED_ABOVE_MAJOR
}

/// Post-success remediation step for one installed revision.
#[derive(Clone, Debug)]
pub struct Remediation {
    /// Managed installation root.
    pub install_root: PathBuf,
    /// Downloaded Chromium revision (e.g. `123456`).
    pub revision: String,
    /// Declared version of the installer artifact.
    pub artifact_version: Version,
}

impl Remediation {
    /// Create a remediation step for an installed revision.
    pub fn new(
        install_root: impl Into<PathBuf>,
        revision: impl Into<String>,
        artifact_version: Version,
    ) -> Self {
        Self {
            install_root: install_root.into(),
            revision: revision.into(),
            artifact_version,
        }
    }

    /// Versioned install subdirectory for this revision.
    pub fn versioned_dir(&self) -> PathBuf {
        self.install_root.join(format!("linux-{}", self.revision))
    }

    /// Downloaded archive for this revision.
    pub fn archive_path(&self) -> PathBuf {
        self.install_root
            .join(format!("chromium-linux-{}.zip", self.revision))
    }

    /// Probe the runtime and apply the patch when the pairing matches.
    ///
    /// Returns `true` if remediation ran, `false` for the no-op case.
    pub async fn apply_if_affected(&self) -> Result<bool, RemedyError> {
        let runtime_version = probe_runtime_version().await?;
        if !needs_remediation(&runtime_version, &self.artifact_version) {
            debug!(
                %runtime_version,
                artifact_version = %self.artifact_version,
                "runtime/artifact pairing not affected, skipping remediation"
            );
            return Ok(false);
        }

        info!(
            %runtime_version,
            artifact_version = %self.artifact_version,
            revision = %self.revision,
            "known-defective pairing detected, re-extracting archive manually"
        );
        self.apply().await?;
        Ok(true)
    }

    /// Unconditionally erase the versioned directory, re-extract the
    /// archive with `unzip`, and delete the archive.
    pub async fn apply(&self) -> Result<(), RemedyError> {
        let dir = self.versioned_dir();
        let archive = self.archive_path();

        fsops::erase_dir(&dir).await?;

        let output = exec::run_capture("unzip", unzip_args(&archive, &dir))
            .await
            .map_err(|e| RemedyError::Extraction {
                path: archive.clone(),
                reason: format!("failed to run unzip: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RemedyError::Extraction {
                path: archive,
                reason: format!("unzip exited with {}: {}", output.status, stderr.trim()),
            });
        }

        fsops::remove_file(&archive)
            .await
            .map_err(|source| RemedyError::ArchiveRemoval {
                path: archive,
                source,
            })
    }
}

/// Arguments for re-extracting `archive` into `dest` with `unzip`.
///
/// The paths are passed through as `OsStr` so non-UTF-8 path bytes reach
/// the child process unchanged.
fn unzip_args<'a>(archive: &'a Path, dest: &'a Path) -> [&'a OsStr; 5] {
    [
        OsStr::new("-o"),
        OsStr::new("-q"),
        archive.as_os_str(),
        OsStr::new("-d"),
        dest.as_os_str(),
    ]
}
