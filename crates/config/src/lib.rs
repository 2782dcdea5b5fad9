#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for gantry
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (`gantry.toml` in the source tree)
//! - Environment variables (`GANTRY_*`)
//! - CLI flags

use gantry_errors::{ConfigError, Error};
use gantry_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File name looked up in the source tree when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "gantry.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub lint: LintConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub commands: CommandOverrides,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(default)]
    pub color: ColorChoice,
}

/// Paths of the external tools the pipeline drives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_cargo_tool")]
    pub cargo: String,
    #[serde(default = "default_git_tool")]
    pub git: String,
}

/// Lint gate policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Lint categories appended to the linter invocation as fatal (`-D`)
    #[serde(default = "default_lint_deny")]
    pub deny: Vec<String>,
    /// Warnings tolerated in the linter output before the gate fails
    #[serde(default)]
    pub max_warnings: usize,
}

/// Build stage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildConfig {
    /// Where the package builder deposits source artifacts
    /// (default: `target/package` under the source tree)
    pub artifact_dir: Option<PathBuf>,
    /// Packages to build distributions for (empty = whole workspace)
    #[serde(default)]
    pub packages: Vec<String>,
}

/// Output tree configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LayoutConfig {
    /// Root of the pipeline output tree
    /// (default: `target/gantry` under the source tree)
    pub out_dir: Option<PathBuf>,
}

/// Per-stage command overrides
///
/// Each entry is a full argv (program first). Arguments may use the
/// placeholders `{source}`, `{reports}`, `{dist}`, `{coverage}`,
/// `{test_results}` and `{doc}`, expanded against the active layout.
/// Unset entries fall back to the built-in Cargo tool contracts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommandOverrides {
    pub format: Option<Vec<String>>,
    pub lint: Option<Vec<String>>,
    pub typecheck: Option<Vec<String>>,
    pub scan_deps: Option<Vec<String>>,
    pub scan_static: Option<Vec<String>>,
    pub build: Option<Vec<String>>,
    pub package_source: Option<Vec<String>>,
    pub smoke: Option<Vec<String>>,
    pub test: Option<Vec<String>>,
    pub coverage: Option<Vec<String>>,
    pub coverage_html: Option<Vec<String>>,
    pub docs: Option<Vec<String>>,
}

// Default implementations

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cargo: default_cargo_tool(),
            git: default_git_tool(),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            deny: default_lint_deny(),
            max_warnings: 0,
        }
    }
}

// Default value functions for serde

fn default_cargo_tool() -> String {
    "cargo".to_string()
}

fn default_git_tool() -> String {
    "git".to_string()
}

fn default_lint_deny() -> Vec<String> {
    vec!["warnings".to_string()]
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid
    /// TOML syntax.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from an explicit path, or from `gantry.toml` in
    /// the source tree, or fall back to defaults when neither exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be read
    /// or parsed.
    pub async fn load_or_default(path: Option<&Path>, source: &Path) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => {
                let default_path = source.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load_from_file(&default_path).await
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain values that
    /// cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // GANTRY_COLOR
        if let Ok(color) = std::env::var("GANTRY_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "GANTRY_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // GANTRY_OUT_DIR
        if let Ok(out_dir) = std::env::var("GANTRY_OUT_DIR") {
            self.layout.out_dir = Some(PathBuf::from(out_dir));
        }

        // GANTRY_CARGO
        if let Ok(cargo) = std::env::var("GANTRY_CARGO") {
            self.tools.cargo = cargo;
        }

        // GANTRY_GIT
        if let Ok(git) = std::env::var("GANTRY_GIT") {
            self.tools.git = git;
        }

        // GANTRY_LINT_MAX_WARNINGS
        if let Ok(max) = std::env::var("GANTRY_LINT_MAX_WARNINGS") {
            self.lint.max_warnings = max.parse().map_err(|_| ConfigError::InvalidValue {
                field: "GANTRY_LINT_MAX_WARNINGS".to_string(),
                value: max,
            })?;
        }

        // GANTRY_LINT_DENY (comma-separated)
        if let Ok(deny) = std::env::var("GANTRY_LINT_DENY") {
            self.lint.deny = deny
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    /// Root of the pipeline output tree (with default)
    #[must_use]
    pub fn out_dir(&self, source: &Path) -> PathBuf {
        self.layout
            .out_dir
            .clone()
            .unwrap_or_else(|| source.join("target").join("gantry"))
    }

    /// Directory scanned for build artifacts (with default)
    #[must_use]
    pub fn artifact_dir(&self, source: &Path) -> PathBuf {
        self.build
            .artifact_dir
            .clone()
            .unwrap_or_else(|| source.join("target").join("package"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "GANTRY_COLOR",
            "GANTRY_OUT_DIR",
            "GANTRY_CARGO",
            "GANTRY_GIT",
            "GANTRY_LINT_MAX_WARNINGS",
            "GANTRY_LINT_DENY",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.tools.cargo, "cargo");
        assert_eq!(config.tools.git, "git");
        assert_eq!(config.lint.deny, vec!["warnings"]);
        assert_eq!(config.lint.max_warnings, 0);
        assert_eq!(
            config.out_dir(Path::new("/src")),
            PathBuf::from("/src/target/gantry")
        );
        assert_eq!(
            config.artifact_dir(Path::new("/src")),
            PathBuf::from("/src/target/package")
        );
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [lint]
            deny = ["warnings", "clippy::pedantic"]
            max_warnings = 5

            [commands]
            test = ["cargo", "nextest", "run"]
            "#,
        )
        .unwrap();

        assert_eq!(config.lint.max_warnings, 5);
        assert_eq!(config.lint.deny.len(), 2);
        assert_eq!(
            config.commands.test.as_deref(),
            Some(["cargo", "nextest", "run"].map(String::from).as_slice())
        );
        // Unmentioned sections keep defaults
        assert_eq!(config.tools.cargo, "cargo");
    }

    #[test]
    fn env_merge_overrides_and_validates() {
        clear_env();
        std::env::set_var("GANTRY_CARGO", "/opt/rust/bin/cargo");
        std::env::set_var("GANTRY_LINT_MAX_WARNINGS", "3");
        std::env::set_var("GANTRY_LINT_DENY", "warnings, clippy::all");

        let mut config = Config::default();
        config.merge_env().unwrap();
        assert_eq!(config.tools.cargo, "/opt/rust/bin/cargo");
        assert_eq!(config.lint.max_warnings, 3);
        assert_eq!(config.lint.deny, vec!["warnings", "clippy::all"]);

        std::env::set_var("GANTRY_LINT_MAX_WARNINGS", "not-a-number");
        assert!(config.merge_env().is_err());
        clear_env();
    }

    #[tokio::test]
    async fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(None, dir.path()).await.unwrap();
        assert_eq!(config.tools.cargo, "cargo");
    }

    #[tokio::test]
    async fn load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&path, "not = [valid").await.unwrap();
        assert!(Config::load_from_file(&path).await.is_err());
    }
}
