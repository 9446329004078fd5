//! Process facade.
//!
//! Thin, uniformly-asynchronous wrappers over spawning child processes.
//! Two shapes are needed by the supervision flows:
//!
//! - [`run_capture`]: run a program to completion and capture its output
//!   (used by the dependency installer and the remediation step, where the
//!   output is inspected after the fact).
//! - [`spawn_piped`]: spawn a program with piped stdout/stderr for streamed
//!   supervision (used by the download supervisor, which must observe
//!   output while the child is still running).
//!
//! Filesystem primitives live in [`crate::fsops`].

use std::ffi::OsStr;
use std::io;
use std::process::{Output, Stdio};

use tokio::process::{Child, Command};

/// Run a program to completion and capture stdout/stderr.
///
/// The exit status is returned inside [`Output`]; classifying a nonzero
/// status is the caller's concern.
pub async fn run_capture<I, S>(program: &str, args: I) -> io::Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(program).args(args).output().await
}

/// Spawn a program with stdout and stderr piped and stdin closed.
///
/// Both output streams must be drained by the caller; a full pipe buffer
/// would otherwise stall the child.
pub fn spawn_piped<I, S>(program: &str, args: I) -> io::Result<Child>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_capture_success() {
        let output = run_capture("sh", ["-c", "echo hello"]).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_capture_nonzero_status() {
        let output = run_capture("sh", ["-c", "exit 3"]).await.unwrap();
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_run_capture_missing_program() {
        let result = run_capture("definitely-not-a-real-binary-xyz", Vec::<String>::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_spawn_piped_streams_attached() {
        let mut child = spawn_piped("sh", ["-c", "echo out; echo err >&2"]).unwrap();
        assert!(child.stdout.is_some());
        assert!(child.stderr.is_some());

        let status = child.wait().await.unwrap();
        assert!(status.success());
    }
}
