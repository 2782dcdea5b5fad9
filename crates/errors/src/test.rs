//! Test and coverage stage error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TestError {
    #[error("unit tests failed: {message}")]
    UnitTestsFailed { message: String },

    #[error("smoke test failed: {message}")]
    SmokeTestFailed { message: String },

    #[error("coverage collection failed: {message}")]
    CoverageFailed { message: String },
}

impl UserFacingError for TestError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SmokeTestFailed { .. } => {
                Some("Inspect the built artifact in the distribution directory.")
            }
            Self::CoverageFailed { .. } => {
                Some("Coverage needs the instrumentation tool installed (default: cargo-llvm-cov).")
            }
            Self::UnitTestsFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnitTestsFailed { .. } => "test.unit_tests_failed",
            Self::SmokeTestFailed { .. } => "test.smoke_test_failed",
            Self::CoverageFailed { .. } => "test.coverage_failed",
        };
        Some(code)
    }
}
