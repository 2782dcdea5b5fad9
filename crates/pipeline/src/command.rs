//! External tool invocation
//!
//! Every quality gate is an opaque command-line tool: the orchestrator
//! spawns it, waits for completion, and captures exit status plus output.
//! Nothing here interprets tool output beyond carrying it to report files.

use crate::context::PipelineContext;
use crate::layout::expand_placeholders;
use gantry_errors::{CheckError, ConfigError, Error, Result};
use gantry_events::{EventEmitter, PipelineEvent};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

/// One resolved tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ToolCommand {
    /// Resolve a command from an optional config override, falling back to
    /// the built-in default argv. Placeholders are expanded against the
    /// context's layout; the working directory defaults to the source tree.
    ///
    /// # Errors
    /// Returns an error if a configured override is empty.
    pub fn resolve(
        ctx: &PipelineContext,
        override_argv: Option<&Vec<String>>,
        default_argv: &[String],
    ) -> Result<Self> {
        let argv: Vec<String> = match override_argv {
            Some(argv) => argv.clone(),
            None => default_argv.to_vec(),
        };

        let expanded = expand_placeholders(&argv, &ctx.layout, &ctx.source);
        let mut parts = expanded.into_iter();
        let program = parts.next().ok_or_else(|| {
            Error::from(ConfigError::InvalidValue {
                field: "commands".to_string(),
                value: "empty command".to_string(),
            })
        })?;

        Ok(Self {
            program,
            args: parts.collect(),
            cwd: ctx.source.clone(),
        })
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Human-readable rendering for events and logs
    #[must_use]
    pub fn rendered(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout and stderr concatenated, for report files
    #[must_use]
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Trailing lines of the combined output, for error messages
    #[must_use]
    pub fn tail(&self, lines: usize) -> String {
        let combined = self.combined();
        let all: Vec<&str> = combined.lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// Execute a tool and capture its output.
///
/// # Errors
/// Returns [`CheckError::ToolUnavailable`] if the program cannot be
/// spawned at all. A non-zero exit is NOT an error here; callers decide
/// what a failing tool means for their stage.
pub async fn run_tool(ctx: &PipelineContext, cmd: &ToolCommand) -> Result<CommandOutput> {
    ctx.emit(PipelineEvent::CommandStarted {
        command: cmd.rendered(),
    });
    tracing::debug!(command = %cmd.rendered(), cwd = %cmd.cwd.display(), "running tool");

    let output = Command::new(&cmd.program)
        .args(&cmd.args)
        .current_dir(&cmd.cwd)
        .output()
        .await
        .map_err(|e| {
            Error::from(CheckError::ToolUnavailable {
                program: cmd.program.clone(),
                message: e.to_string(),
            })
        })?;

    let stdout_lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(std::string::ToString::to_string)
        .collect();

    let stderr_lines: Vec<String> = String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(std::string::ToString::to_string)
        .collect();

    Ok(CommandOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: stdout_lines.join("\n"),
        stderr: stderr_lines.join("\n"),
    })
}

/// Write a tool's output to a report file, replacing any previous report.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub async fn write_report(path: &Path, output: &CommandOutput) -> Result<PathBuf> {
    let mut contents = output.combined();
    if !contents.ends_with('\n') && !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(path, contents)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    Ok(path.to_path_buf())
}
