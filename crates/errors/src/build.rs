//! Build stage error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("no build descriptor found in {path}")]
    MissingBuildDescriptor { path: String },

    #[error("build command failed: {message}")]
    CommandFailed { message: String },

    #[error("no distribution artifacts produced in {dir}")]
    NoArtifacts { dir: String },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingBuildDescriptor { .. } => {
                Some("The source tree needs a Cargo.toml before it can be built.")
            }
            Self::NoArtifacts { .. } => {
                Some("Check build.artifact_dir points at where the build deposits artifacts.")
            }
            Self::ChecksumMismatch { .. } => {
                Some("Rebuild the distribution directory; an artifact changed after hashing.")
            }
            Self::CommandFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingBuildDescriptor { .. } => "build.missing_build_descriptor",
            Self::CommandFailed { .. } => "build.command_failed",
            Self::NoArtifacts { .. } => "build.no_artifacts",
            Self::ChecksumMismatch { .. } => "build.checksum_mismatch",
        };
        Some(code)
    }
}
