//! Type check stage

use super::elapsed_ms;
use crate::command::{run_tool, write_report, ToolCommand};
use crate::context::PipelineContext;
use gantry_errors::{CheckError, Result};
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;

pub const REPORT_NAME: &str = "typecheck.txt";

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    let default = [
        ctx.config.tools.cargo.clone(),
        "check".to_string(),
        "--workspace".to_string(),
        "--all-targets".to_string(),
    ];
    let cmd = ToolCommand::resolve(ctx, ctx.config.commands.typecheck.as_ref(), &default)?;
    let out = run_tool(ctx, &cmd).await?;
    let report = write_report(&ctx.layout.reports.join(REPORT_NAME), &out).await?;

    if !out.success {
        return Err(CheckError::TypeCheckFailed {
            message: format!(
                "type check exited with {:?}, report at {}",
                out.exit_code,
                report.display()
            ),
        }
        .into());
    }

    Ok(StageOutcome::passed(
        StageId::Typecheck,
        Some(report),
        elapsed_ms(start),
    ))
}
