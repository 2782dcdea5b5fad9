//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use gantry_types::{RunSummary, StageStatus};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render the run summary
    pub fn render_summary(&self, summary: &RunSummary) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
            Cell::new("Report").add_attribute(Attribute::Bold),
        ]);

        for outcome in &summary.outcomes {
            let status_cell = match outcome.status {
                StageStatus::Passed => Cell::new("passed").fg(Color::Green),
                StageStatus::Failed => Cell::new("failed").fg(Color::Yellow),
            };
            let report = outcome
                .report
                .as_ref()
                .map_or(String::from("-"), |p| p.display().to_string());

            table.add_row(vec![
                Cell::new(outcome.stage.to_string()),
                status_cell,
                Cell::new(format!("{} ms", outcome.duration_ms)),
                Cell::new(report),
            ]);
        }

        println!("{table}");

        if let Some(archive) = &summary.archive {
            println!("Release archive: {}", archive.display());
        }

        Ok(())
    }
}
