//! Pipeline execution context

use crate::layout::Layout;
use gantry_config::Config;
use gantry_errors::{Error, Result};
use gantry_events::{EventEmitter, EventSender};
use std::path::PathBuf;
use uuid::Uuid;

/// Everything a stage needs: configuration, the source tree, the output
/// layout, and the optional event channel. No ambient state.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub config: Config,
    pub source: PathBuf,
    pub layout: Layout,
    /// Identifier of this run; names the ephemeral smoke scratch dir
    pub run_id: Uuid,
    pub tx: Option<EventSender>,
}

impl EventEmitter for PipelineContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

/// Builder for [`PipelineContext`]
#[derive(Debug, Default)]
pub struct PipelineContextBuilder {
    config: Option<Config>,
    source: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    tx: Option<EventSender>,
}

impl PipelineContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Override the output root (otherwise taken from configuration)
    #[must_use]
    pub fn with_out_dir(mut self, out_dir: Option<PathBuf>) -> Self {
        self.out_dir = out_dir;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Build the context.
    ///
    /// # Errors
    /// Returns an error if the source directory does not exist.
    pub fn build(self) -> Result<PipelineContext> {
        let config = self.config.unwrap_or_default();
        let source = self.source.unwrap_or_else(|| PathBuf::from("."));

        if !source.is_dir() {
            return Err(Error::internal(format!(
                "source directory not found: {}",
                source.display()
            )));
        }

        let out_root = self.out_dir.unwrap_or_else(|| config.out_dir(&source));
        let layout = Layout::new(out_root);

        Ok(PipelineContext {
            config,
            source,
            layout,
            run_id: Uuid::new_v4(),
            tx: self.tx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_out_dir_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = PipelineContextBuilder::new()
            .with_source(tmp.path())
            .build()
            .unwrap();
        assert_eq!(ctx.layout.out_root, tmp.path().join("target").join("gantry"));
    }

    #[test]
    fn builder_honors_out_dir_override() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = PipelineContextBuilder::new()
            .with_source(tmp.path())
            .with_out_dir(Some(tmp.path().join("elsewhere")))
            .build()
            .unwrap();
        assert_eq!(ctx.layout.out_root, tmp.path().join("elsewhere"));
    }

    #[test]
    fn builder_rejects_missing_source() {
        let result = PipelineContextBuilder::new()
            .with_source("/definitely/not/here")
            .build();
        assert!(result.is_err());
    }
}
