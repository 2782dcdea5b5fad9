//! Checksum manifest format
//!
//! One line per artifact, `<hex>  <file name>`, in the style of the
//! coreutils checksum tools. The manifest covers files by name relative
//! to the directory it lives in.

use crate::Hash;
use gantry_errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// A single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumEntry {
    pub name: String,
    pub hash: Hash,
}

/// Checksums for a set of artifacts in one directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksumManifest {
    pub entries: Vec<ChecksumEntry>,
}

impl ChecksumManifest {
    /// Hash the named files inside `dir`, in sorted order.
    ///
    /// # Errors
    /// Returns an error if any listed file cannot be read.
    pub async fn for_files(dir: &Path, names: &[String]) -> Result<Self> {
        let mut sorted: Vec<String> = names.to_vec();
        sorted.sort();

        let mut entries = Vec::with_capacity(sorted.len());
        for name in sorted {
            let hash = Hash::hash_file(&dir.join(&name)).await?;
            entries.push(ChecksumEntry { name, hash });
        }
        Ok(Self { entries })
    }

    /// Render to the line-oriented text format.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.hash.to_hex());
            out.push_str("  ");
            out.push_str(&entry.name);
            out.push('\n');
        }
        out
    }

    /// Parse the line-oriented text format.
    ///
    /// # Errors
    /// Returns an error for lines that are not `<hex>  <name>`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (hex, name) = line.split_once("  ").ok_or_else(|| {
                Error::internal(format!("malformed checksum line: {line}"))
            })?;
            entries.push(ChecksumEntry {
                name: name.to_string(),
                hash: Hash::from_hex(hex)?,
            });
        }
        Ok(Self { entries })
    }

    /// Write the manifest to `path`, overwriting any previous one.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub async fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_text())
            .await
            .map_err(|e| Error::io_with_path(&e, path))
    }

    /// Load a manifest from `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Self::parse(&text)
    }

    /// Recompute every entry against the files in `dir`.
    ///
    /// # Errors
    /// Returns [`gantry_errors::BuildError::ChecksumMismatch`] on the first
    /// entry whose hash no longer matches, or an I/O error if a file is
    /// missing.
    pub async fn verify(&self, dir: &Path) -> Result<()> {
        for entry in &self.entries {
            crate::verify_file(&dir.join(&entry.name), &entry.hash).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn manifest_fixture(dir: &Path) -> ChecksumManifest {
        tokio::fs::write(dir.join("b.crate"), b"artifact b").await.unwrap();
        tokio::fs::write(dir.join("a.crate"), b"artifact a").await.unwrap();
        ChecksumManifest::for_files(
            dir,
            &["b.crate".to_string(), "a.crate".to_string()],
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn entries_are_sorted_by_name() {
        let dir = tempdir().unwrap();
        let manifest = manifest_fixture(dir.path()).await;
        let names: Vec<_> = manifest.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.crate", "b.crate"]);
    }

    #[tokio::test]
    async fn text_round_trip() {
        let dir = tempdir().unwrap();
        let manifest = manifest_fixture(dir.path()).await;
        let parsed = ChecksumManifest::parse(&manifest.to_text()).unwrap();
        assert_eq!(parsed.entries, manifest.entries);
    }

    #[tokio::test]
    async fn verify_detects_tampering() {
        let dir = tempdir().unwrap();
        let manifest = manifest_fixture(dir.path()).await;
        assert!(manifest.verify(dir.path()).await.is_ok());

        tokio::fs::write(dir.path().join("a.crate"), b"tampered").await.unwrap();
        assert!(manifest.verify(dir.path()).await.is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ChecksumManifest::parse("not a manifest line").is_err());
    }
}
