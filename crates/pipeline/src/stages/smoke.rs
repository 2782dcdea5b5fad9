//! Smoke test stage
//!
//! Unpacks the newest built source artifact into an ephemeral scratch
//! directory, verifies the package manifest inside carries a readable
//! version, and runs the configured verify command in the unpacked tree.
//! The scratch directory is removed unconditionally afterward, pass or
//! fail, so throwaway environments never accumulate across runs.

use super::elapsed_ms;
use crate::command::{run_tool, ToolCommand};
use crate::context::PipelineContext;
use crate::fsutil::{extract_tar_gz, files_with_suffix};
use gantry_errors::{Error, Result, TestError};
use gantry_events::EventEmitter;
use gantry_types::{StageId, StageOutcome};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();
    let scratch = ctx.layout.smoke_scratch(ctx.run_id);

    fs::create_dir_all(&scratch)
        .await
        .map_err(|e| Error::io_with_path(&e, &scratch))?;

    let result = verify_artifact(ctx, &scratch).await;

    // Teardown happens whether or not the smoke body passed
    if let Err(e) = fs::remove_dir_all(&scratch).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            ctx.emit_warning(format!(
                "failed to remove smoke scratch {}: {e}",
                scratch.display()
            ));
        }
    }

    result.map(|()| StageOutcome::passed(StageId::Smoke, None, elapsed_ms(start)))
}

async fn verify_artifact(ctx: &PipelineContext, scratch: &Path) -> Result<()> {
    let artifacts = files_with_suffix(&ctx.layout.dist, ".crate").await?;
    let Some(artifact) = artifacts.last() else {
        return Err(TestError::SmokeTestFailed {
            message: format!(
                "no source artifact in {}; run the build stage first",
                ctx.layout.dist.display()
            ),
        }
        .into());
    };

    extract_tar_gz(artifact, scratch).await?;

    let unpacked = unpacked_package_dir(scratch).await?;
    let version = read_package_version(&unpacked.join("Cargo.toml")).await?;
    ctx.emit_debug(format!(
        "smoke: unpacked {} version {version}",
        artifact.display()
    ));

    let default = [
        ctx.config.tools.cargo.clone(),
        "check".to_string(),
        "--quiet".to_string(),
    ];
    let cmd = ToolCommand::resolve(ctx, ctx.config.commands.smoke.as_ref(), &default)?
        .with_cwd(&unpacked);
    let out = run_tool(ctx, &cmd).await?;

    if !out.success {
        return Err(TestError::SmokeTestFailed {
            message: format!(
                "`{}` exited with {:?}: {}",
                cmd.rendered(),
                out.exit_code,
                out.tail(20)
            ),
        }
        .into());
    }

    Ok(())
}

/// The single directory the source artifact unpacks to.
async fn unpacked_package_dir(scratch: &Path) -> Result<PathBuf> {
    let mut entries = fs::read_dir(scratch)
        .await
        .map_err(|e| Error::io_with_path(&e, scratch))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, scratch))?
    {
        let path = entry.path();
        if path.is_dir() && path.join("Cargo.toml").is_file() {
            return Ok(path);
        }
    }

    Err(TestError::SmokeTestFailed {
        message: "unpacked artifact contains no package manifest".to_string(),
    }
    .into())
}

/// The version attribute of the unpacked package, which must be readable
/// and non-empty.
async fn read_package_version(manifest_path: &Path) -> Result<String> {
    let contents = fs::read_to_string(manifest_path)
        .await
        .map_err(|e| Error::io_with_path(&e, manifest_path))?;

    let parsed: toml::Value = toml::from_str(&contents).map_err(|e| TestError::SmokeTestFailed {
        message: format!("unreadable package manifest: {e}"),
    })?;

    parsed
        .get("package")
        .and_then(|package| package.get("version"))
        .and_then(toml::Value::as_str)
        .filter(|version| !version.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            TestError::SmokeTestFailed {
                message: "package version attribute missing or empty".to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn version_read_from_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("Cargo.toml");
        fs::write(&manifest, "[package]\nname = \"demo\"\nversion = \"0.3.1\"\n")
            .await
            .unwrap();
        assert_eq!(read_package_version(&manifest).await.unwrap(), "0.3.1");
    }

    #[tokio::test]
    async fn missing_version_is_a_smoke_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join("Cargo.toml");
        fs::write(&manifest, "[package]\nname = \"demo\"\n").await.unwrap();
        let err = read_package_version(&manifest).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Test(TestError::SmokeTestFailed { .. })
        ));
    }
}
