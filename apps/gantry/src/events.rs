//! Event handling and progress display

use console::style;
use gantry_events::PipelineEvent;

/// Renders pipeline events as status lines on stderr
pub struct EventHandler {
    colors_enabled: bool,
    debug_enabled: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage } => {
                self.status(&format!("→ {stage}"));
            }
            PipelineEvent::StageCompleted { stage, duration_ms } => {
                self.status(&self.styled_ok(&format!("✓ {stage} ({duration_ms} ms)")));
            }
            PipelineEvent::StageTolerated {
                stage,
                message,
                report,
            } => {
                let mut line = format!("⚠ {stage}: {message}");
                if let Some(report) = report {
                    line.push_str(&format!(" (report: {})", report.display()));
                }
                self.status(&self.styled_warn(&line));
            }
            PipelineEvent::StageFailed {
                stage,
                message,
                report,
            } => {
                let mut line = format!("✗ {stage}: {message}");
                if let Some(report) = report {
                    line.push_str(&format!(" (report: {})", report.display()));
                }
                self.status(&self.styled_err(&line));
            }
            PipelineEvent::CommandStarted { command } => {
                if self.debug_enabled {
                    self.status(&format!("  $ {command}"));
                }
            }
            PipelineEvent::ArchiveCreated { path, checksum } => {
                self.status(&format!("📦 {} (blake3 {checksum})", path.display()));
            }
            PipelineEvent::Warning { message } => {
                self.status(&self.styled_warn(&format!("⚠ {message}")));
            }
            PipelineEvent::Debug { message } => {
                if self.debug_enabled {
                    self.status(&format!("  {message}"));
                }
            }
        }
    }

    fn status(&self, line: &str) {
        eprintln!("{line}");
    }

    fn styled_ok(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).green().to_string()
        } else {
            text.to_string()
        }
    }

    fn styled_warn(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).yellow().to_string()
        } else {
            text.to_string()
        }
    }

    fn styled_err(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}
