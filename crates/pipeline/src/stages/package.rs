//! Release packaging stage
//!
//! Terminal step of the pipeline: bundles the distribution, docs,
//! coverage, test-results, and reports directories into one gzip-
//! compressed tar archive, writes the release manifest inside it, and
//! emits a sibling checksum file. Runs only after every fatal gate has
//! passed; no partial archive is ever produced.

use super::elapsed_ms;
use crate::context::PipelineContext;
use crate::vcs;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use gantry_errors::{Error, PackageError, Result};
use gantry_events::{EventEmitter, PipelineEvent};
use gantry_hash::Hash;
use gantry_types::{ReleaseManifest, StageId, StageOutcome};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::task;

/// Manifest file name inside the release archive
pub const MANIFEST_NAME: &str = "RELEASE_MANIFEST.txt";

pub async fn run(ctx: &PipelineContext) -> Result<(StageOutcome, PathBuf)> {
    let start = Instant::now();

    let vcs_info = vcs::collect(ctx).await;
    let toolchain = vcs::toolchain(ctx).await;

    let manifest = ReleaseManifest {
        name: package_name(ctx).await,
        version: vcs_info.version,
        commit: vcs_info.commit,
        built_at: Utc::now(),
        toolchain,
    };

    let archive_name = format!("{}.tar.gz", manifest.artifact_stem());
    let archive_path = ctx.layout.release.join(&archive_name);

    if !ctx.layout.dist.is_dir() {
        return Err(PackageError::MissingInput {
            path: ctx.layout.dist.display().to_string(),
        }
        .into());
    }

    write_archive(ctx, &archive_path, &manifest).await?;

    let checksum = Hash::hash_file(&archive_path).await?;
    let checksum_path = ctx.layout.release.join(format!("{archive_name}.blake3"));
    fs::write(&checksum_path, format!("{}  {archive_name}\n", checksum.to_hex()))
        .await
        .map_err(|e| Error::io_with_path(&e, &checksum_path))?;

    ctx.emit(PipelineEvent::ArchiveCreated {
        path: archive_path.clone(),
        checksum: checksum.to_hex(),
    });

    let outcome = StageOutcome::passed(StageId::Package, None, elapsed_ms(start));
    Ok((outcome, archive_path))
}

async fn write_archive(
    ctx: &PipelineContext,
    archive_path: &Path,
    manifest: &ReleaseManifest,
) -> Result<()> {
    let inputs: Vec<(PathBuf, &'static str)> = vec![
        (ctx.layout.dist.clone(), "dist"),
        (ctx.layout.doc.clone(), "doc"),
        (ctx.layout.coverage.clone(), "coverage"),
        (ctx.layout.test_results.clone(), "test-results"),
        (ctx.layout.reports.clone(), "reports"),
    ];
    let manifest_text = manifest.to_text();
    let manifest_mtime = u64::try_from(manifest.built_at.timestamp()).unwrap_or(0);
    let archive_path = archive_path.to_path_buf();

    task::spawn_blocking(move || -> Result<()> {
        let file =
            File::create(&archive_path).map_err(|e| Error::io_with_path(&e, &archive_path))?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut header = tar::Header::new_gnu();
        header.set_size(manifest_text.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(manifest_mtime);
        header.set_cksum();
        builder
            .append_data(&mut header, MANIFEST_NAME, manifest_text.as_bytes())
            .map_err(|e| archive_error(&e))?;

        for (dir, name) in inputs {
            if dir.is_dir() {
                builder
                    .append_dir_all(name, &dir)
                    .map_err(|e| archive_error(&e))?;
            }
        }

        let encoder = builder.into_inner().map_err(|e| archive_error(&e))?;
        encoder.finish().map_err(|e| archive_error(&e))?;
        Ok(())
    })
    .await
    .map_err(|e| Error::internal(format!("archive task failed: {e}")))?
}

fn archive_error(err: &std::io::Error) -> Error {
    PackageError::ArchiveFailed {
        message: err.to_string(),
    }
    .into()
}

/// Release name: the source tree's package name when one is declared,
/// otherwise the source directory name.
async fn package_name(ctx: &PipelineContext) -> String {
    let descriptor = ctx.source.join("Cargo.toml");
    if let Ok(contents) = fs::read_to_string(&descriptor).await {
        if let Ok(parsed) = toml::from_str::<toml::Value>(&contents) {
            if let Some(name) = parsed
                .get("package")
                .and_then(|package| package.get("name"))
                .and_then(toml::Value::as_str)
            {
                return name.to_string();
            }
        }
    }

    ctx.source
        .file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| "release".to_string(), str::to_string)
}
