//! Lint gate stage
//!
//! The linter's full output is always written to `reports/lint.txt`,
//! pass or fail. Policy comes from configuration: deny categories are
//! appended to the default invocation, and a warning-count ceiling is
//! applied over the captured output.

use super::elapsed_ms;
use crate::command::{run_tool, write_report, ToolCommand};
use crate::context::PipelineContext;
use gantry_errors::{CheckError, Result};
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;

pub const REPORT_NAME: &str = "lint.txt";

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    let mut default = vec![
        ctx.config.tools.cargo.clone(),
        "clippy".to_string(),
        "--workspace".to_string(),
        "--all-targets".to_string(),
    ];
    if !ctx.config.lint.deny.is_empty() {
        default.push("--".to_string());
        for category in &ctx.config.lint.deny {
            default.push("-D".to_string());
            default.push(category.clone());
        }
    }

    let cmd = ToolCommand::resolve(ctx, ctx.config.commands.lint.as_ref(), &default)?;
    let out = run_tool(ctx, &cmd).await?;
    let report = write_report(&ctx.layout.reports.join(REPORT_NAME), &out).await?;

    if !out.success {
        return Err(CheckError::LintPolicyViolation {
            message: format!(
                "linter exited with {:?}, report at {}",
                out.exit_code,
                report.display()
            ),
        }
        .into());
    }

    let warnings = count_warnings(&out.combined());
    if warnings > ctx.config.lint.max_warnings {
        return Err(CheckError::LintWarningsOverThreshold {
            warnings,
            max_warnings: ctx.config.lint.max_warnings,
        }
        .into());
    }

    Ok(StageOutcome::passed(
        StageId::Lint,
        Some(report),
        elapsed_ms(start),
    ))
}

/// Count warning markers in linter output. The summary line the linter
/// appends ("generated N warnings") is excluded.
fn count_warnings(output: &str) -> usize {
    output
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            line.starts_with("warning") && !line.contains("generated")
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::count_warnings;

    #[test]
    fn counts_warning_markers_only() {
        let output = "\
warning: unused variable: `x`
  --> src/lib.rs:4:9
note: something else
warning: `primes` (lib) generated 1 warning
";
        assert_eq!(count_warnings(output), 1);
    }

    #[test]
    fn clean_output_has_no_warnings() {
        assert_eq!(count_warnings("Checking primes v0.1.0\nFinished dev"), 0);
    }
}
