//! Stage table and sequential runner
//!
//! Execution order and failure policy are data: the const [`SEQUENCE`]
//! declares both, so adding or reordering stages is a table change, not
//! control-flow surgery.

use crate::context::PipelineContext;
use crate::layout::Layout;
use crate::stages;
use gantry_errors::{Error, Result};
use gantry_events::{EventEmitter, PipelineEvent};
use gantry_types::{FailurePolicy, RunSummary, StageId, StageOutcome};
use std::path::PathBuf;

/// One declared pipeline stage.
#[derive(Debug, Clone, Copy)]
pub struct StageSpec {
    pub id: StageId,
    pub policy: FailurePolicy,
}

/// The quality-gate sequence, in execution order. Packaging is the
/// terminal step layered on top of this table by [`run_package`].
pub const SEQUENCE: &[StageSpec] = &[
    StageSpec {
        id: StageId::Format,
        policy: FailurePolicy::Fatal,
    },
    StageSpec {
        id: StageId::Lint,
        policy: FailurePolicy::Fatal,
    },
    StageSpec {
        id: StageId::Typecheck,
        policy: FailurePolicy::Fatal,
    },
    StageSpec {
        id: StageId::SecurityScan,
        policy: FailurePolicy::BestEffort,
    },
    StageSpec {
        id: StageId::Build,
        policy: FailurePolicy::Fatal,
    },
    StageSpec {
        id: StageId::Smoke,
        policy: FailurePolicy::Fatal,
    },
    StageSpec {
        id: StageId::UnitTest,
        policy: FailurePolicy::Fatal,
    },
    StageSpec {
        id: StageId::Coverage,
        policy: FailurePolicy::Fatal,
    },
    StageSpec {
        id: StageId::Docs,
        policy: FailurePolicy::Fatal,
    },
];

/// Well-known report location for a stage, used when surfacing failures.
#[must_use]
pub fn report_hint(layout: &Layout, id: StageId) -> Option<PathBuf> {
    match id {
        StageId::Lint => Some(layout.reports.join(stages::lint::REPORT_NAME)),
        StageId::Typecheck => Some(layout.reports.join(stages::typecheck::REPORT_NAME)),
        StageId::SecurityScan => Some(layout.reports.join(stages::scan::DEPS_REPORT_NAME)),
        StageId::Build => Some(layout.reports.join(stages::build::REPORT_NAME)),
        StageId::UnitTest => Some(layout.test_results.join(stages::test::TRANSCRIPT_NAME)),
        StageId::Coverage => Some(layout.coverage.join("lcov.info")),
        StageId::Format | StageId::Smoke | StageId::Docs | StageId::Package => None,
    }
}

async fn dispatch(ctx: &PipelineContext, id: StageId) -> Result<StageOutcome> {
    match id {
        StageId::Format => stages::format::run(ctx).await,
        StageId::Lint => stages::lint::run(ctx).await,
        StageId::Typecheck => stages::typecheck::run(ctx).await,
        StageId::SecurityScan => stages::scan::run(ctx).await,
        StageId::Build => stages::build::run(ctx).await,
        StageId::Smoke => stages::smoke::run(ctx).await,
        StageId::UnitTest => stages::test::run(ctx).await,
        StageId::Coverage => stages::coverage::run(ctx).await,
        StageId::Docs => stages::docs::run(ctx).await,
        StageId::Package => Err(Error::internal(
            "package is the terminal step; run it through run_package",
        )),
    }
}

/// Run one declared stage, applying its failure policy.
async fn execute(ctx: &PipelineContext, spec: StageSpec) -> Result<StageOutcome> {
    ctx.emit(PipelineEvent::StageStarted { stage: spec.id });

    match dispatch(ctx, spec.id).await {
        Ok(outcome) => {
            if outcome.is_passed() {
                ctx.emit(PipelineEvent::StageCompleted {
                    stage: spec.id,
                    duration_ms: outcome.duration_ms,
                });
            } else {
                ctx.emit(PipelineEvent::StageTolerated {
                    stage: spec.id,
                    message: format!("{} reported findings", spec.id),
                    report: outcome.report.clone(),
                });
            }
            Ok(outcome)
        }
        Err(e) => match spec.policy {
            FailurePolicy::Fatal => {
                ctx.emit(PipelineEvent::StageFailed {
                    stage: spec.id,
                    message: e.to_string(),
                    report: report_hint(&ctx.layout, spec.id),
                });
                Err(e)
            }
            FailurePolicy::BestEffort => {
                ctx.emit(PipelineEvent::StageTolerated {
                    stage: spec.id,
                    message: e.to_string(),
                    report: report_hint(&ctx.layout, spec.id),
                });
                Ok(StageOutcome::failed(
                    spec.id,
                    None,
                    report_hint(&ctx.layout, spec.id),
                    0,
                ))
            }
        },
    }
}

/// Run the full quality-gate sequence, stopping at the first fatal
/// failure.
///
/// # Errors
/// Returns the first fatal stage's error; the stages after it never
/// begin.
pub async fn run_gates(ctx: &PipelineContext) -> Result<RunSummary> {
    ctx.layout.ensure().await?;

    let mut summary = RunSummary::new(ctx.run_id);
    for spec in SEQUENCE {
        let outcome = execute(ctx, *spec).await?;
        summary.record(outcome);
    }
    Ok(summary)
}

/// Run the full sequence, then assemble the release artifact.
///
/// # Errors
/// Returns an error if any fatal gate fails (no archive is produced) or
/// if archive assembly itself fails.
pub async fn run_package(ctx: &PipelineContext) -> Result<RunSummary> {
    let mut summary = run_gates(ctx).await?;

    ctx.emit(PipelineEvent::StageStarted {
        stage: StageId::Package,
    });
    match stages::package::run(ctx).await {
        Ok((outcome, archive)) => {
            ctx.emit(PipelineEvent::StageCompleted {
                stage: StageId::Package,
                duration_ms: outcome.duration_ms,
            });
            summary.record(outcome);
            summary.archive = Some(archive);
            Ok(summary)
        }
        Err(e) => {
            ctx.emit(PipelineEvent::StageFailed {
                stage: StageId::Package,
                message: e.to_string(),
                report: None,
            });
            Err(e)
        }
    }
}

/// Run a single named stage (the per-stage CLI commands).
///
/// # Errors
/// Returns the stage's error when it fails fatally.
pub async fn run_stage(ctx: &PipelineContext, id: StageId) -> Result<RunSummary> {
    if id == StageId::Package {
        return run_package(ctx).await;
    }

    ctx.layout.ensure().await?;

    let spec = SEQUENCE
        .iter()
        .find(|spec| spec.id == id)
        .copied()
        .ok_or_else(|| Error::internal(format!("unknown stage: {id}")))?;

    let mut summary = RunSummary::new(ctx.run_id);
    let outcome = execute(ctx, spec).await?;
    summary.record(outcome);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_declares_nine_gates_in_order() {
        let ids: Vec<StageId> = SEQUENCE.iter().map(|spec| spec.id).collect();
        assert_eq!(
            ids,
            vec![
                StageId::Format,
                StageId::Lint,
                StageId::Typecheck,
                StageId::SecurityScan,
                StageId::Build,
                StageId::Smoke,
                StageId::UnitTest,
                StageId::Coverage,
                StageId::Docs,
            ]
        );
    }

    #[test]
    fn only_security_scan_is_best_effort() {
        for spec in SEQUENCE {
            let expected = if spec.id == StageId::SecurityScan {
                FailurePolicy::BestEffort
            } else {
                FailurePolicy::Fatal
            };
            assert_eq!(spec.policy, expected, "stage {}", spec.id);
        }
    }

    #[test]
    fn cheap_checks_precede_expensive_stages() {
        let position = |id: StageId| {
            SEQUENCE
                .iter()
                .position(|spec| spec.id == id)
                .unwrap_or(usize::MAX)
        };
        assert!(position(StageId::Format) < position(StageId::Build));
        assert!(position(StageId::Lint) < position(StageId::Build));
        assert!(position(StageId::Build) < position(StageId::Smoke));
        assert!(position(StageId::UnitTest) < position(StageId::Coverage));
    }
}
