//! Stage identifiers, failure policy, and per-run result types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Identifier of one pipeline stage.
///
/// The declaration order here matches the execution order of the pipeline;
/// the authoritative sequence (including failure policy) lives in the
/// pipeline crate's stage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    Format,
    Lint,
    Typecheck,
    SecurityScan,
    Build,
    Smoke,
    UnitTest,
    Coverage,
    Docs,
    Package,
}

impl StageId {
    /// Stable name used in CLI output, reports, and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Lint => "lint",
            Self::Typecheck => "typecheck",
            Self::SecurityScan => "security-scan",
            Self::Build => "build",
            Self::Smoke => "smoke",
            Self::UnitTest => "unit-test",
            Self::Coverage => "coverage",
            Self::Docs => "docs",
            Self::Package => "package",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a stage's failure affects the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Failure aborts the remaining sequence and the run exits non-zero.
    Fatal,
    /// Failure is recorded and reported but never blocks progress.
    BestEffort,
}

/// Terminal status of one stage execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Passed,
    Failed,
}

/// Immutable record of one stage execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: StageId,
    pub status: StageStatus,
    /// Exit code of the underlying tool, when one ran and reported it
    pub exit_code: Option<i32>,
    /// Report file the stage produced, when it produces one
    pub report: Option<PathBuf>,
    pub duration_ms: u64,
}

impl StageOutcome {
    #[must_use]
    pub fn passed(stage: StageId, report: Option<PathBuf>, duration_ms: u64) -> Self {
        Self {
            stage,
            status: StageStatus::Passed,
            exit_code: Some(0),
            report,
            duration_ms,
        }
    }

    #[must_use]
    pub fn failed(
        stage: StageId,
        exit_code: Option<i32>,
        report: Option<PathBuf>,
        duration_ms: u64,
    ) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            exit_code,
            report,
            duration_ms,
        }
    }

    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status == StageStatus::Passed
    }
}

/// Collected outcomes of one pipeline run.
///
/// Exists only for the duration of the run; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Identifier of this run, also used to name ephemeral scratch space
    pub run_id: Uuid,
    pub outcomes: Vec<StageOutcome>,
    /// Release archive produced by the package stage, if it ran
    pub archive: Option<PathBuf>,
}

impl RunSummary {
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            outcomes: Vec::new(),
            archive: None,
        }
    }

    pub fn record(&mut self, outcome: StageOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes of stages that failed, in execution order
    #[must_use]
    pub fn failures(&self) -> Vec<&StageOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == StageStatus::Failed)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(StageId::Format.as_str(), "format");
        assert_eq!(StageId::SecurityScan.as_str(), "security-scan");
        assert_eq!(StageId::UnitTest.to_string(), "unit-test");
    }

    #[test]
    fn outcome_constructors() {
        let ok = StageOutcome::passed(StageId::Lint, Some(PathBuf::from("lint.txt")), 12);
        assert!(ok.is_passed());
        assert_eq!(ok.exit_code, Some(0));

        let bad = StageOutcome::failed(StageId::Build, Some(101), None, 7);
        assert!(!bad.is_passed());
    }

    #[test]
    fn summary_collects_failures_in_order() {
        let mut summary = RunSummary::new(Uuid::new_v4());
        summary.record(StageOutcome::passed(StageId::Format, None, 1));
        summary.record(StageOutcome::failed(StageId::SecurityScan, Some(1), None, 2));
        summary.record(StageOutcome::failed(StageId::Build, Some(101), None, 3));

        let failures = summary.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].stage, StageId::SecurityScan);
        assert_eq!(failures[1].stage, StageId::Build);
    }

    #[test]
    fn stage_id_serde_round_trip() {
        let json = serde_json::to_string(&StageId::SecurityScan).unwrap();
        assert_eq!(json, "\"security-scan\"");
        let back: StageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StageId::SecurityScan);
    }
}
