//! Integration tests for the download supervisor, driving real child
//! processes through `sh`.

use std::time::{Duration, Instant};

use tempfile::TempDir;

use chromefetch::download::{DownloadConfig, DownloadError, DownloadSupervisor};
use chromefetch::retry::{run_with_retry, RetryPolicy};

fn shell_supervisor(script: &str, install_root: &std::path::Path) -> DownloadSupervisor {
    let config = DownloadConfig::new("sh", install_root).with_args(["-c", script]);
    DownloadSupervisor::new(config)
}

/// Populate an install root with partial state: files and a subdirectory.
fn populate_install_root(root: &std::path::Path) {
    std::fs::create_dir_all(root.join("linux-123456")).unwrap();
    std::fs::write(root.join("linux-123456").join("chrome"), b"partial").unwrap();
    std::fs::write(root.join("chromium-linux-123456.zip"), b"zip").unwrap();
}

#[tokio::test]
async fn clean_exit_without_banner_is_success() {
    let temp = TempDir::new().unwrap();
    let supervisor = shell_supervisor("exit 0", temp.path());

    supervisor.download().await.unwrap();
}

#[tokio::test]
async fn banner_settles_before_exit() {
    let temp = TempDir::new().unwrap();
    // The banner is printed immediately; the child then lingers. The
    // supervisor must settle on the banner, not on the exit.
    let supervisor = shell_supervisor(
        "echo 'Chromium (123456) downloaded to /x'; sleep 5",
        temp.path(),
    );

    let started = Instant::now();
    supervisor.download().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn banner_wins_over_nonzero_exit() {
    let temp = TempDir::new().unwrap();
    let install_root = temp.path().join("chromium");
    populate_install_root(&install_root);

    // The installer completed the download but died on shutdown. The
    // banner is authoritative: the attempt succeeds and the installation
    // root is left intact.
    let supervisor = shell_supervisor(
        "echo 'Chromium (123456) downloaded to /x'; exit 1",
        &install_root,
    );

    supervisor.download().await.unwrap();
    assert!(install_root.join("linux-123456").join("chrome").exists());
}

#[tokio::test]
async fn failed_exit_erases_install_root_then_fails() {
    let temp = TempDir::new().unwrap();
    let install_root = temp.path().join("chromium");
    populate_install_root(&install_root);

    let supervisor = shell_supervisor("echo 'download error' >&2; exit 1", &install_root);
    let error = supervisor.download().await.unwrap_err();

    assert!(matches!(error, DownloadError::Failed { .. }));
    // Cleanup completed before the failure surfaced.
    assert!(!install_root.exists());
}

#[tokio::test]
async fn failed_exit_with_failing_cleanup_reports_cleanup_error() {
    let temp = TempDir::new().unwrap();
    // A plain file in the middle of the configured root makes every
    // cleanup stat fail with NotADirectory, which is not the benign
    // missing-path case.
    let blocker = temp.path().join("blocker.txt");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let install_root = blocker.join("chromium");

    let supervisor = shell_supervisor("exit 1", &install_root);
    let error = supervisor.download().await.unwrap_err();

    // The original exit status survives alongside the cleanup failure.
    match error {
        DownloadError::Cleanup { status, .. } => assert_eq!(status.code(), Some(1)),
        other => panic!("expected Cleanup, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_exit_with_missing_install_root_still_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let install_root = temp.path().join("never-created");

    let supervisor = shell_supervisor("exit 7", &install_root);
    let error = supervisor.download().await.unwrap_err();

    assert!(matches!(error, DownloadError::Failed { .. }));
}

#[tokio::test]
async fn spawn_failure_is_immediate_and_skips_cleanup() {
    let temp = TempDir::new().unwrap();
    let install_root = temp.path().join("chromium");
    populate_install_root(&install_root);

    let config = DownloadConfig::new("definitely-not-a-real-installer-xyz", &install_root);
    let error = DownloadSupervisor::new(config).download().await.unwrap_err();

    assert!(matches!(error, DownloadError::Spawn { .. }));
    // Nothing was created by this attempt, so nothing was cleaned up.
    assert!(install_root.exists());
}

#[tokio::test]
async fn retry_loop_recovers_after_transient_failures() {
    let temp = TempDir::new().unwrap();
    let install_root = temp.path().join("chromium");
    let counter = temp.path().join("attempts");

    // Fails twice, then prints the banner.
    let script = format!(
        "n=$(cat {counter} 2>/dev/null || echo 0); n=$((n+1)); echo $n > {counter}; \
         if [ $n -lt 3 ]; then exit 1; fi; \
         echo 'Chromium downloaded to /x'",
        counter = counter.display()
    );
    let supervisor = shell_supervisor(&script, &install_root);

    let policy = RetryPolicy::default()
        .with_max_retries(5)
        .with_initial_delay(Duration::from_millis(1));
    run_with_retry(|| supervisor.download(), &policy)
        .await
        .unwrap();

    let attempts: u32 = std::fs::read_to_string(&counter)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn retry_budget_exhaustion_surfaces_last_error_unchanged() {
    let temp = TempDir::new().unwrap();
    let install_root = temp.path().join("chromium");
    let supervisor = shell_supervisor("exit 1", &install_root);

    let policy = RetryPolicy::default()
        .with_max_retries(2)
        .with_initial_delay(Duration::from_millis(1));
    let error = run_with_retry(|| supervisor.download(), &policy)
        .await
        .unwrap_err();

    assert!(matches!(error, DownloadError::Failed { .. }));
}
