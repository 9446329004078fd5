//! Installer child-process supervision.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::error::DownloadError;
use super::marker::MarkerLatch;
use crate::exec;
use crate::fsops;

/// Read buffer size for the output pumps.
const PUMP_CHUNK_BYTES: usize = 8 * 1024;

/// Configuration for one download supervisor.
#[derive(Clone, Debug)]
pub struct DownloadConfig {
    /// Installer program to spawn.
    pub installer: String,
    /// Arguments passed to the installer.
    pub installer_args: Vec<String>,
    /// Managed installation root; the unit of cleanup on failure.
    pub install_root: PathBuf,
}

impl DownloadConfig {
    /// Create a config for an installer program and installation root.
    pub fn new(installer: impl Into<String>, install_root: impl Into<PathBuf>) -> Self {
        Self {
            installer: installer.into(),
            installer_args: Vec::new(),
            install_root: install_root.into(),
        }
    }

    /// Set the installer arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.installer_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Default installation root: `.local-chromium` under the home
    /// directory, falling back to the system temp directory.
    pub fn default_install_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".local-chromium")
    }
}

/// Supervises a single download attempt.
///
/// Spawns the installer, drains both output streams concurrently (a slow
/// consumer must never stall the child on a full pipe), and settles the
/// outcome exactly once. See the module docs for the settlement rules.
#[derive(Debug)]
pub struct DownloadSupervisor {
    config: DownloadConfig,
}

impl DownloadSupervisor {
    /// Create a supervisor for the given configuration.
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }

    /// Get the supervisor configuration.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Run one download attempt to settlement.
    ///
    /// - Completion banner observed on stdout: success, even if the
    ///   installer is still flushing output. The pumps drain to EOF in the
    ///   background and the child is reaped by the runtime.
    /// - Exit status 0: success, banner not required.
    /// - Nonzero exit: the remaining stdout is drained first; if the banner
    ///   is in it, the download completed and the attempt is a success.
    ///   Otherwise the installation root is fully erased, then
    ///   [`DownloadError::Failed`] is returned.
    /// - Spawn failure: [`DownloadError::Spawn`], no cleanup (nothing was
    ///   created).
    pub async fn download(&self) -> Result<(), DownloadError> {
        let mut child = exec::spawn_piped(&self.config.installer, &self.config.installer_args)
            .map_err(|source| DownloadError::Spawn { source })?;

        let stdout = take_stream(child.stdout.take(), "stdout")?;
        let stderr = take_stream(child.stderr.take(), "stderr")?;

        // One-shot settlement for the banner: the first matching chunk
        // wins, later matches have no sender left to fire.
        let (marker_tx, mut marker_rx) = oneshot::channel::<()>();
        let stdout_pump = tokio::spawn(pump_stdout(stdout, marker_tx));
        let stderr_pump = tokio::spawn(pump_stderr(stderr));

        let mut marker_open = true;
        let status: ExitStatus = loop {
            tokio::select! {
                observed = &mut marker_rx, if marker_open => match observed {
                    Ok(()) => {
                        debug!("completion banner observed, settling before exit");
                        return Ok(());
                    }
                    // stdout closed without a banner; the exit status decides.
                    Err(_) => marker_open = false,
                },
                waited = child.wait() => {
                    break waited.map_err(|source| DownloadError::Wait { source })?;
                }
            }
        };

        if status.success() {
            debug!(%status, "installer exited cleanly, settling on exit status");
            return Ok(());
        }

        // Let the pumps forward whatever the installer wrote before dying.
        // Both streams are at EOF once the child has exited.
        let _ = stdout_pump.await;
        let _ = stderr_pump.await;

        // The exit race can resolve before the final stdout chunk is read.
        // A banner in that tail means the download completed; the exit
        // status does not override it.
        if marker_rx.try_recv().is_ok() {
            debug!(%status, "completion banner found in final output, settling as success");
            return Ok(());
        }

        warn!(
            %status,
            install_root = %self.config.install_root.display(),
            "installer failed, erasing partial installation state"
        );
        match fsops::erase_dir(&self.config.install_root).await {
            Ok(()) => Err(DownloadError::Failed { status }),
            Err(source) => Err(DownloadError::Cleanup { status, source }),
        }
    }
}

fn take_stream<T>(stream: Option<T>, name: &str) -> Result<T, DownloadError> {
    stream.ok_or_else(|| DownloadError::Spawn {
        source: io::Error::new(
            io::ErrorKind::Other,
            format!("installer {name} was not captured"),
        ),
    })
}

/// Forward installer stdout to our own stdout, chunk by chunk, testing each
/// chunk for the completion banner. The sender fires at most once.
async fn pump_stdout(mut stdout: ChildStdout, marker_tx: oneshot::Sender<()>) {
    let mut marker_tx = Some(marker_tx);
    let mut latch = MarkerLatch::default();
    let mut own_stdout = tokio::io::stdout();
    let mut buf = [0u8; PUMP_CHUNK_BYTES];

    loop {
        let n = match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(error) => {
                debug!(%error, "installer stdout read failed, stopping pump");
                break;
            }
        };

        let chunk = &buf[..n];
        // Keep draining even if our own stdout is gone; stopping here
        // would stall the installer on a full pipe.
        if own_stdout.write_all(chunk).await.is_ok() {
            let _ = own_stdout.flush().await;
        }

        if latch.observe(&String::from_utf8_lossy(chunk)) {
            if let Some(tx) = marker_tx.take() {
                let _ = tx.send(());
            }
        }
    }
}

/// Forward installer stderr to our own stderr for visibility.
async fn pump_stderr(mut stderr: ChildStderr) {
    let mut own_stderr = tokio::io::stderr();
    let mut buf = [0u8; PUMP_CHUNK_BYTES];

    loop {
        let n = match stderr.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(error) => {
                debug!(%error, "installer stderr read failed, stopping pump");
                break;
            }
        };

        if own_stderr.write_all(&buf[..n]).await.is_ok() {
            let _ = own_stderr.flush().await;
        }
    }
}
