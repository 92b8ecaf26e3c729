use crate::Result;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Read a file to bytes, returning `None` if it does not exist.
pub(crate) async fn read_bytes_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read file at {}", path.display())),
    }
}

/// Create a directory and all of its parents.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory at {}", path.to_string_lossy()))
}

/// Remove a directory and everything in it. A missing directory is not an error.
pub(crate) async fn remove_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Unable to remove directory {}", path.display())),
    }
}

pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", path.to_string_lossy()))
}

/// Returns the names of the subdirectories of `path`, sorted.
pub(crate) async fn subdirectories(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut dir = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Unable to read directory {}", path.display()))?;
    let mut names = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .context("Failed to read directory entry")?
    {
        let file_type = entry
            .file_type()
            .await
            .context("Failed to read directory entry type")?;
        if file_type.is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[tokio::test]
async fn test_read_bytes_if_exists() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let p = dir.path().join("a.bin");
    assert!(read_bytes_if_exists(&p).await.unwrap().is_none());
    write(&p, b"abc").await.unwrap();
    assert_eq!(read_bytes_if_exists(&p).await.unwrap().unwrap(), b"abc");
}

#[tokio::test]
async fn test_subdirectories() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    make_dir(dir.path().join("v2")).await.unwrap();
    make_dir(dir.path().join("v1")).await.unwrap();
    write(dir.path().join("file.txt"), "x").await.unwrap();
    assert_eq!(subdirectories(dir.path()).await.unwrap(), vec!["v1", "v2"]);
    remove_dir(dir.path().join("v1")).await.unwrap();
    remove_dir(dir.path().join("missing")).await.unwrap();
    assert_eq!(subdirectories(dir.path()).await.unwrap(), vec!["v2"]);
}
