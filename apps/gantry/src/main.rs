//! gantry - quality-gate and release pipeline orchestrator
//!
//! This is the CLI application over the pipeline crate: it resolves
//! configuration (file, environment, flags), wires up the event channel,
//! runs the requested stage or the full release sequence, and renders
//! the result.

mod cli;
mod display;
mod error;
mod events;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use gantry_config::Config;
use gantry_events::EventReceiver;
use gantry_pipeline::{run_stage, PipelineContext, PipelineContextBuilder};
use gantry_types::{ColorChoice, RunSummary, StageId};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting gantry v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config =
        Config::load_or_default(cli.global.config.as_deref(), &cli.global.source).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    if let Some(color) = cli.global.color {
        config.general.color = color;
    }

    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };

    // Create event channel
    let (event_sender, event_receiver) = gantry_events::channel();

    let ctx = PipelineContextBuilder::new()
        .with_config(config)
        .with_source(cli.global.source.clone())
        .with_out_dir(cli.global.out_dir.clone())
        .with_event_sender(event_sender)
        .build()?;

    if matches!(cli.command, Commands::Clean) {
        ctx.layout.clean().await?;
        if !cli.global.json {
            println!("Removed {}", ctx.layout.out_root.display());
        }
        return Ok(());
    }

    // Events are rendered only in TTY mode; JSON output must stay clean
    let mut event_handler = if cli.global.json {
        None
    } else {
        Some(EventHandler::new(colors_enabled, cli.global.debug))
    };

    let stage = cli.command.stage().ok_or_else(|| {
        CliError::Pipeline(gantry_errors::Error::internal(format!(
            "command {} does not map to a stage",
            cli.command.name()
        )))
    })?;

    let result =
        execute_with_events(&ctx, stage, event_receiver, &mut event_handler).await;

    let renderer = OutputRenderer::new(cli.global.json);
    let summary = result?;
    renderer.render_summary(&summary)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute the stage while draining events concurrently
async fn execute_with_events(
    ctx: &PipelineContext,
    stage: StageId,
    mut event_receiver: EventReceiver,
    event_handler: &mut Option<EventHandler>,
) -> Result<RunSummary, CliError> {
    // `run_stage` routes the package command through the full sequence
    let mut run_future = Box::pin(run_stage(ctx, stage));

    loop {
        select! {
            // Command completed
            result = &mut run_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    if let Some(handler) = event_handler.as_mut() {
                        handler.handle_event(event);
                    }
                }
                return result.map_err(Into::into);
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => {
                        if let Some(handler) = event_handler.as_mut() {
                            handler.handle_event(event);
                        }
                    }
                    None => { /* Channel closed: keep waiting for the run to finish */ }
                }
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled: bool) {
    if json_mode {
        // JSON mode: suppress console logging to avoid contaminating output
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gantry=debug")),
            )
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}
