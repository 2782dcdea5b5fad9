//! Static-analysis gate error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum CheckError {
    #[error("formatting violation: {details}")]
    FormattingViolation { details: String },

    #[error("lint policy violation: {message}")]
    LintPolicyViolation { message: String },

    #[error("lint warnings over threshold: {warnings} found, {max_warnings} allowed")]
    LintWarningsOverThreshold { warnings: usize, max_warnings: usize },

    #[error("type check failed: {message}")]
    TypeCheckFailed { message: String },

    #[error("tool unavailable: {program}: {message}")]
    ToolUnavailable { program: String, message: String },
}

impl UserFacingError for CheckError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::FormattingViolation { .. } => {
                Some("Run the formatter over the source tree, then retry.")
            }
            Self::LintPolicyViolation { .. } | Self::LintWarningsOverThreshold { .. } => {
                Some("Fix the reported lints or adjust the lint policy in gantry.toml.")
            }
            Self::ToolUnavailable { .. } => {
                Some("Install the tool or point tools.* / commands.* at an alternative.")
            }
            Self::TypeCheckFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::FormattingViolation { .. } => "check.formatting_violation",
            Self::LintPolicyViolation { .. } => "check.lint_policy_violation",
            Self::LintWarningsOverThreshold { .. } => "check.lint_warnings_over_threshold",
            Self::TypeCheckFailed { .. } => "check.type_check_failed",
            Self::ToolUnavailable { .. } => "check.tool_unavailable",
        };
        Some(code)
    }
}
