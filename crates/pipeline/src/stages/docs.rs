//! Documentation build stage
//!
//! Runs the documentation renderer, then syncs the rendered tree into
//! the layout's doc directory so packaging bundles a stable path.

use super::elapsed_ms;
use crate::command::{run_tool, ToolCommand};
use crate::context::PipelineContext;
use crate::fsutil::replace_dir;
use gantry_errors::{DocsError, Result};
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    let default = [
        ctx.config.tools.cargo.clone(),
        "doc".to_string(),
        "--no-deps".to_string(),
    ];
    let cmd = ToolCommand::resolve(ctx, ctx.config.commands.docs.as_ref(), &default)?;
    let out = run_tool(ctx, &cmd).await?;

    if !out.success {
        return Err(DocsError::RenderFailed {
            message: format!(
                "`{}` exited with {:?}: {}",
                cmd.rendered(),
                out.exit_code,
                out.tail(20)
            ),
        }
        .into());
    }

    // The default renderer writes under target/doc; overrides may write
    // straight into the layout's doc directory instead.
    let rendered = ctx.source.join("target").join("doc");
    if rendered.is_dir() {
        replace_dir(&rendered, &ctx.layout.doc).await?;
    }

    if !ctx.layout.doc.is_dir() {
        return Err(DocsError::OutputMissing {
            path: ctx.layout.doc.display().to_string(),
        }
        .into());
    }

    Ok(StageOutcome::passed(
        StageId::Docs,
        None,
        elapsed_ms(start),
    ))
}
