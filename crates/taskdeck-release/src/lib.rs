#![forbid(unsafe_code)]
//! Release tooling for taskdeck.
//!
//! Four concerns, one per module:
//! - [`tag`]: the `v<major>.<minor>` version tag and its bump rule.
//! - [`state`]: persisted tag history, so successive pipeline runs issue
//!   strictly increasing tags instead of re-bumping a constant.
//! - [`manifest`]: typed rendering of the Deployment + Service YAML.
//! - [`pipeline`]: the sequential test/build/push/deploy/verify runner and
//!   the explicit rollback operation.

mod manifest;
mod pipeline;
mod runner;
mod state;
mod tag;

pub use manifest::{render_manifest, ManifestSpec, RenderError, RenderedManifest, CONTAINER_PORT};
pub use pipeline::{
    Pipeline, PipelineConfig, PipelineError, PipelineReport, Stage, StageOutcome,
};
pub use runner::{CommandOutput, CommandRunner, RunnerError, ScriptedRunner, ShellRunner};
pub use state::{FileTagState, IssuedTag, StateError, TagState, TagStateStore};
pub use tag::{highest_tag, MalformedVersionTag, Tag, TagOverflow};

pub const CRATE_NAME: &str = "taskdeck-release";
