//! chromefetch CLI - supervised Chromium runtime provisioning.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{deps::InstallDepsArgs, fetch::FetchArgs};

#[derive(Parser)]
#[command(
    name = "chromefetch",
    version = chromefetch::VERSION,
    about = "Supervised Chromium runtime download and OS dependency installation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the Chromium runtime under retry supervision
    Fetch(FetchArgs),
    /// Install the OS packages the Chromium runtime needs
    InstallDeps(InstallDepsArgs),
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();
}

/// Promote any panic, including one inside a spawned task, to a loud
/// nonzero process exit. The top-level safety net: no failure may leave
/// the process hanging or exiting 0.
fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original(info);
        std::process::exit(101);
    }));
}

#[tokio::main]
async fn main() {
    init_tracing();
    install_panic_hook();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Fetch(args) => commands::fetch::run(args).await,
        Commands::InstallDeps(args) => commands::deps::run(args).await,
    };

    if let Err(error) = result {
        tracing::error!(%error, "chromefetch failed");
        std::process::exit(1);
    }
}
