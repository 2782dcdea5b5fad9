//! Unit test stage
//!
//! The runner's full transcript lands in `test-results/unit-tests.txt`;
//! a structured JSON summary sits next to it so a machine-readable
//! result always exists regardless of the configured runner.

use super::elapsed_ms;
use crate::command::{run_tool, write_report, ToolCommand};
use crate::context::PipelineContext;
use gantry_errors::{Error, Result, TestError};
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;
use tokio::fs;

pub const TRANSCRIPT_NAME: &str = "unit-tests.txt";
pub const SUMMARY_NAME: &str = "summary.json";

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    let default = [
        ctx.config.tools.cargo.clone(),
        "test".to_string(),
        "--workspace".to_string(),
    ];
    let cmd = ToolCommand::resolve(ctx, ctx.config.commands.test.as_ref(), &default)?;
    let out = run_tool(ctx, &cmd).await?;

    let report = write_report(&ctx.layout.test_results.join(TRANSCRIPT_NAME), &out).await?;

    // No timing data here: identical runs must produce identical bundles
    let summary = serde_json::json!({
        "stage": StageId::UnitTest,
        "exit_code": out.exit_code,
        "passed": out.success,
    });
    let summary_path = ctx.layout.test_results.join(SUMMARY_NAME);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .await
        .map_err(|e| Error::io_with_path(&e, &summary_path))?;

    if !out.success {
        return Err(TestError::UnitTestsFailed {
            message: format!(
                "test runner exited with {:?}, transcript at {}",
                out.exit_code,
                report.display()
            ),
        }
        .into());
    }

    Ok(StageOutcome::passed(
        StageId::UnitTest,
        Some(report),
        elapsed_ms(start),
    ))
}
