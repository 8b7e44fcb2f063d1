use std::fmt::{Display, Formatter};
use std::process::Command;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerError(pub String);

impl Display for RunnerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RunnerError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the pipeline and the external build/orchestration tools.
/// The pipeline never interprets tool output; it only needs exit status.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, RunnerError>;
}

/// Runs real processes. Inherits the caller's environment; the image name
/// and tag travel as arguments, never as persisted state.
#[derive(Debug, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, RunnerError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| RunnerError(format!("failed to spawn {program}: {e}")))?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Test double: records every invocation and fails any command whose
/// rendered form contains a configured marker.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    pub calls: Mutex<Vec<String>>,
    pub fail_on: Option<String>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn failing_on(marker: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(marker.to_string()),
        }
    }

    #[must_use]
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, RunnerError> {
        let rendered = if args.is_empty() {
            program.to_string()
        } else {
            format!("{program} {}", args.join(" "))
        };
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(rendered.clone());
        }
        let success = match &self.fail_on {
            Some(marker) => !rendered.contains(marker.as_str()),
            None => true,
        };
        Ok(CommandOutput {
            success,
            stdout: String::new(),
            stderr: if success {
                String::new()
            } else {
                format!("scripted failure for: {rendered}")
            },
        })
    }
}
