//! Version-control metadata for release packaging
//!
//! Lookups degrade to placeholder values instead of failing: a source
//! tree without a git history must still package.

use crate::command::{run_tool, ToolCommand};
use crate::context::PipelineContext;
use gantry_errors::{PackageError, Result};
use gantry_events::EventEmitter;
use gantry_types::VcsInfo;

/// Collect version and commit metadata from the source tree.
///
/// Never fails: unavailable metadata yields the `0.0.0` / `dev`
/// placeholders and a warning event.
pub async fn collect(ctx: &PipelineContext) -> VcsInfo {
    let version = match describe_version(ctx).await {
        Ok(version) => version,
        Err(e) => {
            ctx.emit_warning(format!("{e}; using placeholder version"));
            VcsInfo::fallback().version
        }
    };

    let commit = match head_commit(ctx).await {
        Ok(commit) => commit,
        Err(e) => {
            ctx.emit_warning(format!("{e}; using placeholder commit"));
            VcsInfo::fallback().commit
        }
    };

    VcsInfo { version, commit }
}

/// Toolchain identification embedded in the release manifest.
pub async fn toolchain(ctx: &PipelineContext) -> String {
    let argv = vec![ctx.config.tools.cargo.clone(), "--version".to_string()];
    let Ok(cmd) = ToolCommand::resolve(ctx, None, &argv) else {
        return "unknown".to_string();
    };
    match run_tool(ctx, &cmd).await {
        Ok(out) if out.success => out
            .stdout
            .lines()
            .next()
            .map_or_else(|| "unknown".to_string(), str::to_string),
        _ => "unknown".to_string(),
    }
}

async fn git_line(ctx: &PipelineContext, args: &[&str]) -> Result<String> {
    let mut argv = vec![ctx.config.tools.git.clone()];
    argv.extend(args.iter().map(|s| (*s).to_string()));
    let cmd = ToolCommand::resolve(ctx, None, &argv)?;

    let out = run_tool(ctx, &cmd)
        .await
        .map_err(|e| PackageError::VersionMetadataUnavailable {
            reason: e.to_string(),
        })?;

    if !out.success {
        return Err(PackageError::VersionMetadataUnavailable {
            reason: format!("`{}` exited with {:?}", cmd.rendered(), out.exit_code),
        }
        .into());
    }

    out.stdout
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .ok_or_else(|| {
            PackageError::VersionMetadataUnavailable {
                reason: format!("`{}` produced no output", cmd.rendered()),
            }
            .into()
        })
}

async fn describe_version(ctx: &PipelineContext) -> Result<String> {
    let tag = git_line(ctx, &["describe", "--tags", "--abbrev=0"]).await?;
    let version = tag.trim_start_matches('v');

    // A tag that is not a semantic version is as good as no tag
    semver::Version::parse(version).map_err(|e| PackageError::VersionMetadataUnavailable {
        reason: format!("tag {tag:?} is not a version: {e}"),
    })?;

    Ok(version.to_string())
}

async fn head_commit(ctx: &PipelineContext) -> Result<String> {
    git_line(ctx, &["rev-parse", "--short", "HEAD"]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PipelineContextBuilder;
    use gantry_config::Config;

    fn ctx_with_git(git: &str) -> (tempfile::TempDir, PipelineContext) {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.tools.git = git.to_string();
        let ctx = PipelineContextBuilder::new()
            .with_source(tmp.path())
            .with_config(config)
            .build()
            .unwrap();
        (tmp, ctx)
    }

    #[tokio::test]
    async fn unavailable_git_degrades_to_placeholders() {
        let (_tmp, ctx) = ctx_with_git("false");
        let vcs = collect(&ctx).await;
        assert_eq!(vcs.version, "0.0.0");
        assert_eq!(vcs.commit, "dev");
    }

    #[tokio::test]
    async fn missing_git_binary_degrades_to_placeholders() {
        let (_tmp, ctx) = ctx_with_git("gantry-no-such-git");
        let vcs = collect(&ctx).await;
        assert_eq!(vcs.version, "0.0.0");
        assert_eq!(vcs.commit, "dev");
    }

    #[tokio::test]
    async fn toolchain_falls_back_to_unknown() {
        let (_tmp, mut ctx) = ctx_with_git("false");
        ctx.config.tools.cargo = "false".to_string();
        assert_eq!(toolchain(&ctx).await, "unknown");
    }
}
