//! Release manifest embedded in the final archive

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version recorded when no release tag can be resolved
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Commit recorded when version-control metadata is unavailable
pub const FALLBACK_COMMIT: &str = "dev";

/// Version-control metadata captured at packaging time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsInfo {
    pub version: String,
    pub commit: String,
}

impl VcsInfo {
    /// Placeholder metadata for source trees without usable VCS state
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            version: FALLBACK_VERSION.to_string(),
            commit: FALLBACK_COMMIT.to_string(),
        }
    }
}

/// Manifest written as `RELEASE_MANIFEST.txt` inside the release archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseManifest {
    pub name: String,
    pub version: String,
    pub commit: String,
    pub built_at: DateTime<Utc>,
    pub toolchain: String,
}

impl ReleaseManifest {
    /// Render as the line-oriented text format stored in the archive
    #[must_use]
    pub fn to_text(&self) -> String {
        format!(
            "name: {}\nversion: {}\ncommit: {}\nbuilt_at: {}\ntoolchain: {}\n",
            self.name,
            self.version,
            self.commit,
            self.built_at.to_rfc3339(),
            self.toolchain,
        )
    }

    /// Archive file stem, `<name>-<version>+<commit>`
    #[must_use]
    pub fn artifact_stem(&self) -> String {
        format!("{}-{}+{}", self.name, self.version, self.commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> ReleaseManifest {
        ReleaseManifest {
            name: "primes".to_string(),
            version: "1.2.3".to_string(),
            commit: "abc1234".to_string(),
            built_at: DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            toolchain: "cargo 1.80.0".to_string(),
        }
    }

    #[test]
    fn text_rendering_is_line_oriented() {
        let text = manifest().to_text();
        assert!(text.contains("name: primes\n"));
        assert!(text.contains("version: 1.2.3\n"));
        assert!(text.contains("commit: abc1234\n"));
        assert!(text.contains("built_at: 2025-06-01T12:00:00+00:00\n"));
    }

    #[test]
    fn artifact_stem_embeds_version_and_commit() {
        assert_eq!(manifest().artifact_stem(), "primes-1.2.3+abc1234");
    }

    #[test]
    fn fallback_placeholders() {
        let vcs = VcsInfo::fallback();
        assert_eq!(vcs.version, "0.0.0");
        assert_eq!(vcs.commit, "dev");
    }
}
