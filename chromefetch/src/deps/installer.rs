//! apt-backed dependency installer.

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::package_set::parse_simulation_report;
use crate::exec;

/// Meta-package used to query transitive Chromium dependencies.
pub const DEFAULT_META_PACKAGE: &str = "chromium-browser";

/// Package manager program.
const APT_PROGRAM: &str = "apt-get";

/// Packages some distributions erroneously drop from the dry-run report.
///
/// Merged into the extracted set (union, no duplicates) before the real
/// installation.
pub const KNOWN_DEPENDENCIES: &[&str] = &[
    "ca-certificates",
    "fonts-freefont-ttf",
    "fonts-ipafont-gothic",
    "fonts-kacst",
    "fonts-khmeros",
    "fonts-liberation",
    "fonts-thai-tlwg",
    "fonts-wqy-zenhei",
    "libasound2",
    "libatk-bridge2.0-0",
    "libatk1.0-0",
    "libatspi2.0-0",
    "libc6",
    "libcairo2",
    "libcups2",
    "libcurl3-gnutls",
    "libdbus-1-3",
    "libdrm2",
    "libexpat1",
    "libgbm1",
    "libglib2.0-0",
    "libgtk-3-0",
    "libnspr4",
    "libnss3",
    "libpango-1.0-0",
    "libwayland-client0",
    "libx11-6",
    "libx11-xcb1",
    "libxcb1",
    "libxcomposite1",
    "libxdamage1",
    "libxext6",
    "libxfixes3",
    "libxkbcommon0",
    "libxrandr2",
    "libxss1",
    "libxtst6",
    "wget",
    "xdg-utils",
];

/// Errors from the dependency installation flow. Both are fatal.
#[derive(Debug, Error)]
pub enum DepsError {
    /// The simulated install query failed.
    #[error("dependency query failed: {reason}")]
    Query { reason: String },

    /// The real installation failed. Requires operator intervention.
    #[error("dependency installation failed: {reason}")]
    Install { reason: String },
}

/// Installs the OS packages the Chromium runtime needs.
#[derive(Clone, Debug)]
pub struct DepsInstaller {
    meta_package: String,
    use_sudo: bool,
    merge_known: bool,
}

impl Default for DepsInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl DepsInstaller {
    /// Create an installer with the default meta-package, no sudo, and the
    /// known-dependency allow-list enabled.
    pub fn new() -> Self {
        Self {
            meta_package: DEFAULT_META_PACKAGE.to_string(),
            use_sudo: false,
            merge_known: true,
        }
    }

    /// Override the meta-package name.
    pub fn with_meta_package(mut self, meta_package: impl Into<String>) -> Self {
        self.meta_package = meta_package.into();
        self
    }

    /// Prefix package manager invocations with `sudo`.
    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Enable or disable merging [`KNOWN_DEPENDENCIES`] into the set.
    pub fn with_known_dependencies(mut self, merge: bool) -> Self {
        self.merge_known = merge;
        self
    }

    /// Resolve and install the dependency set.
    ///
    /// Returns the sorted package list that was installed. Never retries:
    /// a failure here is an environment fault, not a transient condition.
    pub async fn install(&self) -> Result<Vec<String>, DepsError> {
        let report = self.simulate().await?;
        let mut set = parse_simulation_report(&report, &self.meta_package);
        debug!(extracted = set.len(), "parsed dry-run report");

        if self.merge_known {
            set.merge(KNOWN_DEPENDENCIES.iter().copied());
        }
        let packages = set.into_sorted();

        if packages.is_empty() {
            info!("no dependencies to install");
            return Ok(packages);
        }

        info!(count = packages.len(), "installing chromium OS dependencies");
        let mut args = vec!["install", "--no-install-recommends", "-y"];
        args.extend(packages.iter().map(String::as_str));

        let output = self
            .run_apt(&args)
            .await
            .map_err(|reason| DepsError::Install { reason })?;

        // Forward the package manager's report for visibility.
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(&output.stdout).await;
        let _ = stdout.flush().await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DepsError::Install {
                reason: format!("apt-get exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(packages)
    }

    /// Run the simulated install and return the dry-run report.
    async fn simulate(&self) -> Result<String, DepsError> {
        let output = self
            .run_apt(&["--simulate", "install", &self.meta_package])
            .await
            .map_err(|reason| DepsError::Query { reason })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DepsError::Query {
                reason: format!("apt-get exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_apt(&self, args: &[&str]) -> Result<std::process::Output, String> {
        let result = if self.use_sudo {
            let mut sudo_args = vec![APT_PROGRAM];
            sudo_args.extend_from_slice(args);
            exec::run_capture("sudo", sudo_args).await
        } else {
            exec::run_capture(APT_PROGRAM, args.iter().copied()).await
        };

        result.map_err(|e| format!("failed to run {APT_PROGRAM}: {e}"))
    }
}
