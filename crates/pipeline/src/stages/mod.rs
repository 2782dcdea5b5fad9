//! Stage implementations
//!
//! One module per pipeline stage. Every stage consumes the shared
//! [`PipelineContext`](crate::context::PipelineContext) and returns a
//! [`StageOutcome`](gantry_types::StageOutcome); quality-gate violations
//! surface as errors and are classified by the stage table's failure
//! policy, not here.

pub mod build;
pub mod coverage;
pub mod docs;
pub mod format;
pub mod lint;
pub mod package;
pub mod scan;
pub mod smoke;
pub mod test;
pub mod typecheck;

use std::time::Instant;

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
