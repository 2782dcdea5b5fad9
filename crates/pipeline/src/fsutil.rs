//! Filesystem helpers for artifact handling

use flate2::read::GzDecoder;
use gantry_errors::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive as TarArchive;
use tokio::task;

/// Extract a `.tar.gz` archive into a destination directory.
///
/// # Errors
/// Returns an error if the archive cannot be opened or unpacked.
pub async fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let archive_path = archive_path.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    task::spawn_blocking(move || -> Result<()> {
        let file = File::open(&archive_path).map_err(|e| Error::io_with_path(&e, &archive_path))?;
        let decoder = GzDecoder::new(file);
        let mut archive = TarArchive::new(decoder);
        archive
            .unpack(&dest_dir)
            .map_err(|e| Error::io_with_path(&e, &dest_dir))?;
        Ok(())
    })
    .await
    .map_err(|e| Error::internal(format!("extraction task failed: {e}")))?
}

/// Recursively copy a directory tree, replacing the destination.
///
/// # Errors
/// Returns an error if any file or directory cannot be copied.
pub async fn replace_dir(src: &Path, dst: &Path) -> Result<()> {
    let src = src.to_path_buf();
    let dst = dst.to_path_buf();

    task::spawn_blocking(move || -> Result<()> {
        if dst.exists() {
            std::fs::remove_dir_all(&dst).map_err(|e| Error::io_with_path(&e, &dst))?;
        }
        copy_dir_recursive(&src, &dst)
    })
    .await
    .map_err(|e| Error::internal(format!("copy task failed: {e}")))?
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst).map_err(|e| Error::io_with_path(&e, dst))?;
    for entry in std::fs::read_dir(src).map_err(|e| Error::io_with_path(&e, src))? {
        let entry = entry.map_err(|e| Error::io_with_path(&e, src))?;
        let target = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| Error::io_with_path(&e, entry.path()))?;
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)
                .map_err(|e| Error::io_with_path(&e, entry.path()))?;
        }
    }
    Ok(())
}

/// Files in `dir` whose name ends with `suffix`, most recently modified
/// last. Returns an empty list when the directory does not exist.
///
/// # Errors
/// Returns an error if the directory exists but cannot be read.
pub async fn files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut found: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io_with_path(&e, dir)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?
    {
        let path = entry.path();
        let is_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix));
        if !is_match || !path.is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .await
            .and_then(|m| m.modified())
            .unwrap_or(std::time::UNIX_EPOCH);
        found.push((modified, path));
    }

    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn files_with_suffix_filters_and_orders() {
        let tmp = tempdir().unwrap();
        tokio::fs::write(tmp.path().join("a.crate"), b"a").await.unwrap();
        tokio::fs::write(tmp.path().join("skip.txt"), b"x").await.unwrap();
        tokio::fs::write(tmp.path().join("b.crate"), b"b").await.unwrap();

        let found = files_with_suffix(tmp.path(), ".crate").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "crate"));
    }

    #[tokio::test]
    async fn files_with_suffix_missing_dir_is_empty() {
        let tmp = tempdir().unwrap();
        let found = files_with_suffix(&tmp.path().join("nope"), ".crate")
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn replace_dir_overwrites_stale_content() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("nested/file.html"), b"fresh").unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        std::fs::write(dst.join("stale.html"), b"old").unwrap();

        replace_dir(&src, &dst).await.unwrap();
        assert!(dst.join("nested/file.html").is_file());
        assert!(!dst.join("stale.html").exists());
    }
}
