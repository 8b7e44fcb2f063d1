// SPDX-License-Identifier: Apache-2.0

use crate::manifest::{render_manifest, ManifestSpec, RenderError};
use crate::runner::{CommandRunner, RunnerError};
use crate::state::{StateError, TagStateStore};
use crate::tag::Tag;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

/// One sequential step of a release run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Test,
    Build,
    Push,
    Deploy,
    Verify,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Build => "build",
            Self::Push => "push",
            Self::Deploy => "deploy",
            Self::Verify => "verify",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum PipelineError {
    State(StateError),
    Render(RenderError),
    Io(String),
    /// A stage command failed; everything after it was skipped and nothing
    /// was rolled back (the previously deployed version stays active).
    Stage { stage: Stage, detail: String },
    /// Rollback requested but no verified deployment has ever been recorded.
    NoKnownGood,
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(e) => write!(f, "tag state error: {e}"),
            Self::Render(e) => write!(f, "manifest render error: {e}"),
            Self::Io(msg) => write!(f, "{msg}"),
            Self::Stage { stage, detail } => write!(f, "stage {stage} failed: {detail}"),
            Self::NoKnownGood => write!(f, "no last-known-good tag recorded; cannot roll back"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<StateError> for PipelineError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<RenderError> for PipelineError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Image repository without a tag.
    pub image: String,
    /// Deployment/Service name and selector label value.
    pub app_name: String,
    pub replicas: u32,
    /// Where the rendered manifest is written before `kubectl apply`.
    pub manifest_out: PathBuf,
    /// Starting point when no tag state exists yet.
    pub seed: Tag,
    pub skip_tests: bool,
}

impl PipelineConfig {
    #[must_use]
    pub fn new(image: &str, manifest_out: PathBuf) -> Self {
        Self {
            image: image.to_string(),
            app_name: "taskdeck".to_string(),
            replicas: 2,
            manifest_out,
            seed: Tag::new(1, 0),
            skip_tests: false,
        }
    }

    fn manifest_spec(&self, tag: Tag) -> ManifestSpec {
        ManifestSpec {
            image: self.image.clone(),
            tag,
            replicas: self.replicas,
            app_name: self.app_name.clone(),
        }
    }

    fn stage_command(&self, stage: Stage, tag: Tag) -> (String, Vec<String>) {
        let image_ref = format!("{}:{tag}", self.image);
        match stage {
            Stage::Test => (
                "cargo".to_string(),
                vec!["test".into(), "--workspace".into(), "--quiet".into()],
            ),
            Stage::Build => (
                "docker".to_string(),
                vec!["build".into(), "-t".into(), image_ref, ".".into()],
            ),
            Stage::Push => ("docker".to_string(), vec!["push".into(), image_ref]),
            Stage::Deploy => (
                "kubectl".to_string(),
                vec![
                    "apply".into(),
                    "-f".into(),
                    self.manifest_out.display().to_string(),
                ],
            ),
            Stage::Verify => (
                "kubectl".to_string(),
                vec![
                    "rollout".into(),
                    "status".into(),
                    format!("deployment/{}", self.app_name),
                    "--timeout=120s".into(),
                ],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub tag: Tag,
    pub manifest_path: PathBuf,
    pub manifest_sha256: String,
    pub stages: Vec<StageOutcome>,
}

pub struct Pipeline<'a> {
    config: PipelineConfig,
    state: &'a dyn TagStateStore,
    runner: &'a dyn CommandRunner,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        state: &'a dyn TagStateStore,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            state,
            runner,
        }
    }

    /// Full release run: issue the next tag, render the manifest, then the
    /// stages strictly in order, aborting on the first failure. Only a run
    /// that survives `Verify` moves the last-known-good marker.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let tag = self.state.issue_next(self.config.seed)?;
        info!(tag = %tag, image = %self.config.image, "release run start");

        let manifest_sha256 = self.write_manifest(tag)?;

        let mut stages = Vec::new();
        for stage in [
            Stage::Test,
            Stage::Build,
            Stage::Push,
            Stage::Deploy,
            Stage::Verify,
        ] {
            if stage == Stage::Test && self.config.skip_tests {
                continue;
            }
            stages.push(self.run_stage(stage, tag)?);
        }

        self.state.mark_known_good(tag)?;
        info!(tag = %tag, "release run verified");
        Ok(PipelineReport {
            tag,
            manifest_path: self.config.manifest_out.clone(),
            manifest_sha256,
            stages,
        })
    }

    /// Re-applies the last tag that passed verification. `current` is left
    /// untouched so the next release still bumps past the failed one.
    pub fn rollback(&self) -> Result<PipelineReport, PipelineError> {
        let state = self.state.load()?.ok_or(PipelineError::NoKnownGood)?;
        let tag = state.last_known_good.ok_or(PipelineError::NoKnownGood)?;
        info!(tag = %tag, "rolling back to last known good");

        let manifest_sha256 = self.write_manifest(tag)?;
        let mut stages = Vec::new();
        for stage in [Stage::Deploy, Stage::Verify] {
            stages.push(self.run_stage(stage, tag)?);
        }
        Ok(PipelineReport {
            tag,
            manifest_path: self.config.manifest_out.clone(),
            manifest_sha256,
            stages,
        })
    }

    fn write_manifest(&self, tag: Tag) -> Result<String, PipelineError> {
        let rendered = render_manifest(&self.config.manifest_spec(tag))?;
        if let Some(parent) = self.config.manifest_out.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    PipelineError::Io(format!("failed to create {}: {e}", parent.display()))
                })?;
            }
        }
        fs::write(&self.config.manifest_out, rendered.yaml.as_bytes()).map_err(|e| {
            PipelineError::Io(format!(
                "failed to write {}: {e}",
                self.config.manifest_out.display()
            ))
        })?;
        Ok(rendered.sha256)
    }

    fn run_stage(&self, stage: Stage, tag: Tag) -> Result<StageOutcome, PipelineError> {
        let (program, args) = self.config.stage_command(stage, tag);
        let command = format!("{program} {}", args.join(" "));
        info!(stage = stage.as_str(), command = %command, "stage start");
        let output = self
            .runner
            .run(&program, &args)
            .map_err(|RunnerError(detail)| PipelineError::Stage { stage, detail })?;
        if !output.success {
            error!(stage = stage.as_str(), stderr = %output.stderr, "stage failed");
            return Err(PipelineError::Stage {
                stage,
                detail: if output.stderr.trim().is_empty() {
                    format!("command exited non-zero: {command}")
                } else {
                    output.stderr.trim().to_string()
                },
            });
        }
        info!(stage = stage.as_str(), "stage ok");
        Ok(StageOutcome { stage, command })
    }
}
