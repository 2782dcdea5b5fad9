//! Security scan stage
//!
//! Two independent scanners run back to back: a dependency vulnerability
//! scan and a static scan of the code itself. Findings never abort the
//! pipeline - the stage always writes both reports, records a
//! failed-but-tolerated outcome, and lets the run continue.

use super::elapsed_ms;
use crate::command::{run_tool, write_report, CommandOutput, ToolCommand};
use crate::context::PipelineContext;
use gantry_errors::Result;
use gantry_events::EventEmitter;
use gantry_types::{StageId, StageOutcome};
use std::time::Instant;

pub const DEPS_REPORT_NAME: &str = "audit-deps.txt";
pub const STATIC_REPORT_NAME: &str = "audit-static.txt";

pub async fn run(ctx: &PipelineContext) -> Result<StageOutcome> {
    let start = Instant::now();

    let deps_default = [
        ctx.config.tools.cargo.clone(),
        "audit".to_string(),
    ];
    let static_default = [
        ctx.config.tools.cargo.clone(),
        "geiger".to_string(),
        "--workspace".to_string(),
    ];

    let scanners: [(&str, Option<&Vec<String>>, &[String]); 2] = [
        (
            DEPS_REPORT_NAME,
            ctx.config.commands.scan_deps.as_ref(),
            &deps_default,
        ),
        (
            STATIC_REPORT_NAME,
            ctx.config.commands.scan_static.as_ref(),
            &static_default,
        ),
    ];

    let mut clean = true;
    for (report_name, override_argv, default) in scanners {
        let report_path = ctx.layout.reports.join(report_name);
        let cmd = ToolCommand::resolve(ctx, override_argv, default)?;

        match run_tool(ctx, &cmd).await {
            Ok(out) => {
                write_report(&report_path, &out).await?;
                if !out.success {
                    clean = false;
                    ctx.emit_warning(format!(
                        "security scanner `{}` reported findings (see {})",
                        cmd.rendered(),
                        report_path.display()
                    ));
                }
            }
            // A scanner that cannot even start must not block the run
            Err(e) => {
                let placeholder = CommandOutput {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!("scanner did not run: {e}"),
                };
                write_report(&report_path, &placeholder).await?;
                clean = false;
                ctx.emit_warning(format!("security scanner unavailable: {e}"));
            }
        }
    }

    let report = Some(ctx.layout.reports.join(DEPS_REPORT_NAME));
    let duration = elapsed_ms(start);
    if clean {
        Ok(StageOutcome::passed(StageId::SecurityScan, report, duration))
    } else {
        Ok(StageOutcome::failed(
            StageId::SecurityScan,
            None,
            report,
            duration,
        ))
    }
}
