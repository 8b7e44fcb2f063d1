use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub(crate) enum TagCommand {
    /// Compute the next tag: pure bump with --current, stateful with
    /// --state-file (exactly one of the two).
    Next {
        #[arg(long)]
        current: Option<String>,
        #[arg(long)]
        state_file: Option<PathBuf>,
        /// Starting point when the state file does not exist yet.
        #[arg(long, default_value = "v1.0")]
        seed: String,
    },
    Show {
        #[arg(long)]
        state_file: PathBuf,
    },
}

#[derive(Subcommand)]
pub(crate) enum ManifestCommand {
    Render {
        #[arg(long)]
        image: String,
        #[arg(long)]
        tag: String,
        #[arg(long, default_value_t = 2)]
        replicas: u32,
        #[arg(long, default_value = "taskdeck")]
        app_name: String,
        /// Write here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ReleaseCommand {
    /// Full pipeline: issue tag, render manifest, then
    /// test -> build -> push -> deploy -> verify, aborting on first failure.
    Run {
        #[arg(long)]
        state_file: PathBuf,
        #[arg(long)]
        image: String,
        #[arg(long, default_value = "deploy/taskdeck.yaml")]
        manifest_out: PathBuf,
        #[arg(long, default_value_t = 2)]
        replicas: u32,
        #[arg(long, default_value = "taskdeck")]
        app_name: String,
        #[arg(long, default_value = "v1.0")]
        seed: String,
        #[arg(long, default_value_t = false)]
        skip_tests: bool,
    },
    /// Re-apply the last tag that passed verification.
    Rollback {
        #[arg(long)]
        state_file: PathBuf,
        #[arg(long)]
        image: String,
        #[arg(long, default_value = "deploy/taskdeck.yaml")]
        manifest_out: PathBuf,
        #[arg(long, default_value_t = 2)]
        replicas: u32,
        #[arg(long, default_value = "taskdeck")]
        app_name: String,
    },
}
