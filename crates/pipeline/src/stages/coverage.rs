//! Coverage stage
//!
//! Re-executes the test suite under instrumentation. Deliberately does
//! not replace the unit-test stage: instrumentation can alter
//! timing-sensitive behavior, so both artifacts are kept.

use super::elapsed_ms;
use crate::command::{run_tool, ToolCommand};
use crate::context::PipelineContext;
use gantry_errors::{Result, TestError};
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    // Machine-readable report
    let lcov_default = [
        ctx.config.tools.cargo.clone(),
        "llvm-cov".to_string(),
        "--workspace".to_string(),
        "--lcov".to_string(),
        "--output-path".to_string(),
        "{coverage}/lcov.info".to_string(),
    ];
    let lcov_cmd = ToolCommand::resolve(ctx, ctx.config.commands.coverage.as_ref(), &lcov_default)?;
    let lcov_out = run_tool(ctx, &lcov_cmd).await?;
    if !lcov_out.success {
        return Err(TestError::CoverageFailed {
            message: format!(
                "`{}` exited with {:?}: {}",
                lcov_cmd.rendered(),
                lcov_out.exit_code,
                lcov_out.tail(20)
            ),
        }
        .into());
    }

    // Human-readable report
    let html_default = [
        ctx.config.tools.cargo.clone(),
        "llvm-cov".to_string(),
        "report".to_string(),
        "--html".to_string(),
        "--output-dir".to_string(),
        "{coverage}/html".to_string(),
    ];
    let html_cmd =
        ToolCommand::resolve(ctx, ctx.config.commands.coverage_html.as_ref(), &html_default)?;
    let html_out = run_tool(ctx, &html_cmd).await?;
    if !html_out.success {
        return Err(TestError::CoverageFailed {
            message: format!(
                "`{}` exited with {:?}: {}",
                html_cmd.rendered(),
                html_out.exit_code,
                html_out.tail(20)
            ),
        }
        .into());
    }

    Ok(StageOutcome::passed(
        StageId::Coverage,
        Some(ctx.layout.coverage.join("lcov.info")),
        elapsed_ms(start),
    ))
}
