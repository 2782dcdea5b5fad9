//! Command line interface definition

use clap::{Parser, Subcommand};
use gantry_types::{ColorChoice, StageId};
use std::path::PathBuf;

/// gantry - quality-gate and release pipeline orchestrator
#[derive(Parser)]
#[command(name = "gantry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Quality-gate and release pipeline orchestrator")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Source tree the pipeline runs against
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub source: PathBuf,

    /// Output root for reports, artifacts and the release archive
    #[arg(long, global = true, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Available commands: one per pipeline stage plus the composite
/// `package` and the output-tree `clean`.
#[derive(Subcommand)]
pub enum Commands {
    /// Check source formatting (zero side effects)
    #[command(alias = "fmt")]
    Format,

    /// Run the linter and enforce the configured lint policy
    Lint,

    /// Type-check the source tree
    Typecheck,

    /// Run the security scanners (findings never abort the pipeline)
    Scan,

    /// Build distribution artifacts and write their checksum manifest
    Build,

    /// Smoke-test the newest built artifact in an ephemeral environment
    Smoke,

    /// Run the unit test suite
    Test,

    /// Re-run tests under instrumentation and collect coverage
    Coverage,

    /// Render documentation
    Docs,

    /// Run every gate in order, then assemble the release archive
    #[command(alias = "release")]
    Package,

    /// Remove the pipeline output tree
    Clean,
}

impl Commands {
    /// The pipeline stage this command maps to, if any
    #[must_use]
    pub fn stage(&self) -> Option<StageId> {
        match self {
            Commands::Format => Some(StageId::Format),
            Commands::Lint => Some(StageId::Lint),
            Commands::Typecheck => Some(StageId::Typecheck),
            Commands::Scan => Some(StageId::SecurityScan),
            Commands::Build => Some(StageId::Build),
            Commands::Smoke => Some(StageId::Smoke),
            Commands::Test => Some(StageId::UnitTest),
            Commands::Coverage => Some(StageId::Coverage),
            Commands::Docs => Some(StageId::Docs),
            Commands::Package => Some(StageId::Package),
            Commands::Clean => None,
        }
    }

    /// Get command name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Format => "format",
            Commands::Lint => "lint",
            Commands::Typecheck => "typecheck",
            Commands::Scan => "scan",
            Commands::Build => "build",
            Commands::Smoke => "smoke",
            Commands::Test => "test",
            Commands::Coverage => "coverage",
            Commands::Docs => "docs",
            Commands::Package => "package",
            Commands::Clean => "clean",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["gantry", "package"]);
        assert!(matches!(cli.command, Commands::Package));

        let cli = Cli::parse_from(["gantry", "--json", "--debug", "lint"]);
        assert!(cli.global.json);
        assert!(cli.global.debug);
        assert!(matches!(cli.command, Commands::Lint));

        let cli = Cli::parse_from(["gantry", "--source", "/tmp/tree", "build"]);
        assert_eq!(cli.global.source, PathBuf::from("/tmp/tree"));
    }

    #[test]
    fn test_command_aliases() {
        let cli = Cli::parse_from(["gantry", "fmt"]);
        assert!(matches!(cli.command, Commands::Format));

        let cli = Cli::parse_from(["gantry", "release"]);
        assert!(matches!(cli.command, Commands::Package));
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(Commands::Scan.stage(), Some(StageId::SecurityScan));
        assert_eq!(Commands::Test.stage(), Some(StageId::UnitTest));
        assert_eq!(Commands::Clean.stage(), None);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Commands::Package.name(), "package");
        assert_eq!(Commands::Clean.name(), "clean");
    }
}
