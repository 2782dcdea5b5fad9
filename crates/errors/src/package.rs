//! Release packaging error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PackageError {
    /// Raised by VCS lookups; packaging catches this and degrades to
    /// placeholder version/commit values instead of failing.
    #[error("version-control metadata unavailable: {reason}")]
    VersionMetadataUnavailable { reason: String },

    #[error("archive assembly failed: {message}")]
    ArchiveFailed { message: String },

    #[error("required packaging input missing: {path}")]
    MissingInput { path: String },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingInput { .. } => {
                Some("Run the full pipeline (gantry package) so every bundled input exists.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::VersionMetadataUnavailable { .. } => "package.version_metadata_unavailable",
            Self::ArchiveFailed { .. } => "package.archive_failed",
            Self::MissingInput { .. } => "package.missing_input",
        };
        Some(code)
    }
}
