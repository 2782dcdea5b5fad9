#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Release orchestration for gantry
//!
//! This crate is the single engineered component of the repository: it
//! executes a fixed, ordered sequence of quality gates against a source
//! tree, collects every tool's report, and assembles a versioned,
//! checksummed release archive. The gates themselves are external
//! command-line tools consumed as opaque pass/fail steps; nothing here
//! formats, lints, builds, or analyzes anything on its own.
//!
//! Execution is strictly sequential. Failure policy is declared per
//! stage in [`SEQUENCE`]; the only stateful resource is the output
//! directory tree, threaded through every stage as an explicit
//! [`Layout`].

pub mod command;
pub mod context;
pub mod fsutil;
pub mod layout;
pub mod stage;
pub mod stages;
pub mod vcs;

pub use command::{CommandOutput, ToolCommand};
pub use context::{PipelineContext, PipelineContextBuilder};
pub use layout::Layout;
pub use stage::{run_gates, run_package, run_stage, StageSpec, SEQUENCE};
