//! Documentation stage error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum DocsError {
    #[error("documentation build failed: {message}")]
    RenderFailed { message: String },

    #[error("rendered documentation not found at {path}")]
    OutputMissing { path: String },
}

impl UserFacingError for DocsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::RenderFailed { .. } => "docs.render_failed",
            Self::OutputMissing { .. } => "docs.output_missing",
        };
        Some(code)
    }
}
