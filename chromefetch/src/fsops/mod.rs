//! Async filesystem facade and recursive directory eraser.
//!
//! The download supervisor treats the managed installation root as a single
//! unit of cleanup. [`erase_dir`] removes such a tree bottom-up: siblings
//! within one directory level are deleted concurrently, and a directory is
//! only removed once every child has been removed. A non-existent root is a
//! successful no-op, which makes cleanup idempotent across retries.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use futures::future::try_join_all;
use thiserror::Error;
use tokio::fs;

/// Boxed future type for recursive async functions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error raised when erasing a path fails.
///
/// Carries the first path at which deletion failed. Anything already
/// deleted stays deleted; partial erasure is an accepted degraded state and
/// the caller is expected to re-erase.
#[derive(Debug, Error)]
#[error("failed to erase {}: {source}", path.display())]
pub struct EraseError {
    /// Path at which the failing operation was attempted.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: io::Error,
}

impl EraseError {
    fn at(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Check whether a path exists, without following a trailing symlink.
pub async fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

/// Stat a path without following a trailing symlink.
pub async fn lstat(path: &Path) -> io::Result<std::fs::Metadata> {
    fs::symlink_metadata(path).await
}

/// List the immediate children of a directory.
pub async fn list_dir(path: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut reader = fs::read_dir(path).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry);
    }
    Ok(entries)
}

/// Delete a single file or symlink.
pub async fn remove_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path).await
}

/// Delete an empty directory.
pub async fn remove_dir(path: &Path) -> io::Result<()> {
    fs::remove_dir(path).await
}

/// Recursively erase a path, bottom-up.
///
/// - A non-existent path succeeds trivially, with no filesystem mutation.
/// - A plain file or symlink is unlinked.
/// - A directory has all its children erased first (siblings at one level
///   run concurrently), then is removed itself. The directory removal is
///   skipped if any child deletion failed; that error propagates.
pub fn erase_dir(path: &Path) -> BoxFuture<'_, Result<(), EraseError>> {
    Box::pin(async move {
        let meta = match lstat(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(EraseError::at(path, e)),
        };

        if !meta.is_dir() {
            return remove_file(path).await.map_err(|e| EraseError::at(path, e));
        }

        let entries = list_dir(path).await.map_err(|e| EraseError::at(path, e))?;
        let children = entries.into_iter().map(|entry| async move {
            let child = entry.path();
            let child_meta = lstat(&child)
                .await
                .map_err(|e| EraseError::at(&child, e))?;
            if child_meta.is_dir() {
                erase_dir(&child).await
            } else {
                remove_file(&child)
                    .await
                    .map_err(|e| EraseError::at(&child, e))
            }
        });
        try_join_all(children).await?;

        remove_dir(path).await.map_err(|e| EraseError::at(path, e))
    })
}
