//! Format check stage
//!
//! The one gate with zero side effects: no report file is written, and
//! the formatter runs in check mode only.

use super::elapsed_ms;
use crate::command::{run_tool, ToolCommand};
use crate::context::PipelineContext;
use gantry_errors::{CheckError, Result};
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    let default = [
        ctx.config.tools.cargo.clone(),
        "fmt".to_string(),
        "--all".to_string(),
        "--check".to_string(),
    ];
    let cmd = ToolCommand::resolve(ctx, ctx.config.commands.format.as_ref(), &default)?;
    let out = run_tool(ctx, &cmd).await?;

    if !out.success {
        return Err(CheckError::FormattingViolation {
            details: out.tail(20),
        }
        .into());
    }

    Ok(StageOutcome::passed(
        StageId::Format,
        None,
        elapsed_ms(start),
    ))
}
