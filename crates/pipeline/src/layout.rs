//! Output-directory layout shared by all stages
//!
//! The layout is an explicit value threaded through every stage
//! invocation. Stages write to disjoint subpaths, so no locking
//! discipline is needed.

use gantry_errors::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// The set of per-stage output directories under one output root.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Root of the whole output tree
    pub out_root: PathBuf,
    /// One report file per analysis tool
    pub reports: PathBuf,
    /// Test runner transcript and structured summary
    pub test_results: PathBuf,
    /// Machine-readable and rendered coverage output
    pub coverage: PathBuf,
    /// Built distribution artifacts plus checksum manifest
    pub dist: PathBuf,
    /// Rendered documentation
    pub doc: PathBuf,
    /// Release archives and their checksum files
    pub release: PathBuf,
}

impl Layout {
    #[must_use]
    pub fn new(out_root: PathBuf) -> Self {
        let reports = out_root.join("reports");
        let test_results = out_root.join("test-results");
        let coverage = out_root.join("coverage");
        let dist = out_root.join("dist");
        let doc = out_root.join("doc");
        let release = out_root.join("release");
        Self {
            out_root,
            reports,
            test_results,
            coverage,
            dist,
            doc,
            release,
        }
    }

    /// Create every output directory that does not exist yet.
    ///
    /// # Errors
    /// Returns an error if a directory cannot be created.
    pub async fn ensure(&self) -> Result<()> {
        for dir in [
            &self.out_root,
            &self.reports,
            &self.test_results,
            &self.coverage,
            &self.dist,
            &self.doc,
            &self.release,
        ] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::io_with_path(&e, dir))?;
        }
        Ok(())
    }

    /// Ephemeral scratch directory for the smoke stage of one run.
    ///
    /// Unconditionally removed after the smoke stage, pass or fail.
    #[must_use]
    pub fn smoke_scratch(&self, run_id: Uuid) -> PathBuf {
        self.out_root.join(format!("smoke-{run_id}"))
    }

    /// Remove the whole output tree.
    ///
    /// # Errors
    /// Returns an error if the tree exists but cannot be removed.
    pub async fn clean(&self) -> Result<()> {
        match fs::remove_dir_all(&self.out_root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io_with_path(&e, &self.out_root)),
        }
    }
}

/// Expand `{source}` and layout placeholders in a command argument list.
#[must_use]
pub fn expand_placeholders(args: &[String], layout: &Layout, source: &Path) -> Vec<String> {
    let pairs = [
        ("{source}", source.display().to_string()),
        ("{reports}", layout.reports.display().to_string()),
        ("{dist}", layout.dist.display().to_string()),
        ("{coverage}", layout.coverage.display().to_string()),
        ("{test_results}", layout.test_results.display().to_string()),
        ("{doc}", layout.doc.display().to_string()),
    ];

    args.iter()
        .map(|arg| {
            let mut out = arg.clone();
            for (needle, value) in &pairs {
                if out.contains(needle) {
                    out = out.replace(needle, value);
                }
            }
            out
        })
        .collect()
}
