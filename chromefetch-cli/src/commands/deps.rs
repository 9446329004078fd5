//! Install-deps command - resolve and install Chromium's OS package
//! dependencies via apt.

use clap::Args;

use chromefetch::deps::{DepsInstaller, DEFAULT_META_PACKAGE};

use crate::error::CliError;

/// Arguments for the install-deps command.
#[derive(Args, Debug)]
pub struct InstallDepsArgs {
    /// Meta-package to query for transitive dependencies
    #[arg(long, default_value = DEFAULT_META_PACKAGE)]
    pub meta_package: String,

    /// Run the package manager through sudo
    #[arg(long)]
    pub sudo: bool,

    /// Do not merge the known-dependency allow-list
    #[arg(long)]
    pub no_known_deps: bool,
}

/// Run the install-deps command.
pub async fn run(args: InstallDepsArgs) -> Result<(), CliError> {
    let installed = DepsInstaller::new()
        .with_meta_package(args.meta_package)
        .with_sudo(args.sudo)
        .with_known_dependencies(!args.no_known_deps)
        .install()
        .await?;

    println!();
    println!("Installed {} packages:", installed.len());
    for package in &installed {
        println!("  {}", package);
    }

    Ok(())
}
