//! Fetch command - download the Chromium runtime, with retries and the
//! post-success remediation step.

use std::path::PathBuf;

use clap::Args;
use semver::Version;
use tracing::info;

use chromefetch::config::ConfigFile;
use chromefetch::download::{DownloadConfig, DownloadError, DownloadSupervisor};
use chromefetch::remedy::Remediation;
use chromefetch::retry::run_with_retry_when;

use crate::error::CliError;

/// Default installer program when neither CLI nor config names one.
const DEFAULT_INSTALLER: &str = "node";

/// Arguments for the fetch command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Installer program to spawn
    #[arg(long)]
    pub installer: Option<String>,

    /// Argument passed to the installer (repeatable)
    #[arg(long = "installer-arg", value_name = "ARG")]
    pub installer_args: Vec<String>,

    /// Managed installation root
    #[arg(long)]
    pub install_root: Option<PathBuf>,

    /// Retry budget (number of retries after the initial attempt)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Chromium revision, used by the remediation step
    #[arg(long)]
    pub revision: Option<String>,

    /// Declared installer artifact version, used by the remediation check
    #[arg(long)]
    pub artifact_version: Option<Version>,

    /// Skip the post-success remediation step
    #[arg(long)]
    pub no_remedy: bool,
}

/// Run the fetch command.
pub async fn run(args: FetchArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    // CLI takes precedence, then config, then defaults.
    let install_root = args
        .install_root
        .or(config.install.root.clone())
        .unwrap_or_else(DownloadConfig::default_install_root);
    let installer = args
        .installer
        .or(config.install.installer.clone())
        .unwrap_or_else(|| DEFAULT_INSTALLER.to_string());
    let installer_args = if args.installer_args.is_empty() {
        config.install.args.clone()
    } else {
        args.installer_args
    };

    let mut policy = config.retry.to_policy();
    if let Some(max_retries) = args.max_retries {
        policy = policy.with_max_retries(max_retries);
    }

    println!("chromefetch v{}", chromefetch::VERSION);
    println!("Installer:    {} {}", installer, installer_args.join(" "));
    println!("Install root: {}", install_root.display());
    println!();

    let download_config =
        DownloadConfig::new(installer, &install_root).with_args(installer_args);
    let supervisor = DownloadSupervisor::new(download_config);

    // Failed downloads are retried against a cleaned install root; a
    // spawn failure means the installer itself is missing and is terminal.
    run_with_retry_when(|| supervisor.download(), &policy, DownloadError::is_transient).await?;
    info!("chromium download complete");

    if args.no_remedy {
        return Ok(());
    }

    let revision = args.revision.or(config.install.revision.clone());
    let (Some(revision), Some(artifact_version)) = (revision, args.artifact_version) else {
        // Without a revision and artifact version the known-bad pairing
        // cannot be assessed; nothing to do.
        info!("no revision/artifact version configured, skipping remediation check");
        return Ok(());
    };

    let applied = Remediation::new(install_root, revision, artifact_version)
        .apply_if_affected()
        .await?;
    if applied {
        info!("remediation applied");
    }

    Ok(())
}
