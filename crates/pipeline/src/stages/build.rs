//! Build stage
//!
//! Compiles the source tree, produces the source distribution, copies the
//! resulting artifacts into the distribution directory, and writes a
//! checksum manifest next to them.

use super::elapsed_ms;
use crate::command::{run_tool, write_report, CommandOutput, ToolCommand};
use crate::context::PipelineContext;
use crate::fsutil::files_with_suffix;
use gantry_errors::{BuildError, Error, Result};
use gantry_hash::ChecksumManifest;
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;
use tokio::fs;

pub const REPORT_NAME: &str = "build.txt";

/// File name of the checksum manifest written into the dist directory
pub const CHECKSUM_MANIFEST_NAME: &str = "CHECKSUMS.blake3";

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    let descriptor = ctx.source.join("Cargo.toml");
    if !descriptor.is_file() {
        return Err(BuildError::MissingBuildDescriptor {
            path: ctx.source.display().to_string(),
        }
        .into());
    }

    let compile_default = [
        ctx.config.tools.cargo.clone(),
        "build".to_string(),
        "--release".to_string(),
    ];
    let compile_cmd = ToolCommand::resolve(ctx, ctx.config.commands.build.as_ref(), &compile_default)?;
    let compile_out = run_tool(ctx, &compile_cmd).await?;

    let mut package_default = vec![
        ctx.config.tools.cargo.clone(),
        "package".to_string(),
        "--no-verify".to_string(),
        "--allow-dirty".to_string(),
    ];
    for package in &ctx.config.build.packages {
        package_default.push("-p".to_string());
        package_default.push(package.clone());
    }

    let report_path = ctx.layout.reports.join(REPORT_NAME);

    if !compile_out.success {
        write_report(&report_path, &compile_out).await?;
        return Err(BuildError::CommandFailed {
            message: format!("compile failed: {}", compile_out.tail(20)),
        }
        .into());
    }

    let package_cmd =
        ToolCommand::resolve(ctx, ctx.config.commands.package_source.as_ref(), &package_default)?;
    let package_out = run_tool(ctx, &package_cmd).await?;

    let report = write_report(&report_path, &merge_outputs(&compile_out, &package_out)).await?;

    if !package_out.success {
        return Err(BuildError::CommandFailed {
            message: format!("source packaging failed: {}", package_out.tail(20)),
        }
        .into());
    }

    // Collect produced artifacts into the distribution directory
    let artifact_dir = ctx.config.artifact_dir(&ctx.source);
    let produced = files_with_suffix(&artifact_dir, ".crate").await?;
    if produced.is_empty() {
        return Err(BuildError::NoArtifacts {
            dir: artifact_dir.display().to_string(),
        }
        .into());
    }

    let mut names = Vec::with_capacity(produced.len());
    for artifact in &produced {
        let name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::internal("artifact with non-UTF8 name"))?
            .to_string();
        let dest = ctx.layout.dist.join(&name);
        fs::copy(artifact, &dest)
            .await
            .map_err(|e| Error::io_with_path(&e, artifact))?;
        names.push(name);
    }

    let manifest = ChecksumManifest::for_files(&ctx.layout.dist, &names).await?;
    manifest
        .write(&ctx.layout.dist.join(CHECKSUM_MANIFEST_NAME))
        .await?;

    Ok(StageOutcome::passed(
        StageId::Build,
        Some(report),
        elapsed_ms(start),
    ))
}

fn merge_outputs(compile: &CommandOutput, package: &CommandOutput) -> CommandOutput {
    CommandOutput {
        success: compile.success && package.success,
        exit_code: package.exit_code,
        stdout: format!("{}\n{}", compile.stdout, package.stdout),
        stderr: format!("{}\n{}", compile.stderr, package.stderr),
    }
}
