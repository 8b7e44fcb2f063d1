#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use taskdeck_release::{
    render_manifest, FileTagState, ManifestSpec, Pipeline, PipelineConfig, PipelineError,
    ShellRunner, Tag, TagStateStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{ManifestCommand, ReleaseCommand, TagCommand};

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Taskdeck release operations CLI")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },
    Manifest {
        #[command(subcommand)]
        command: ManifestCommand,
    },
    Release {
        #[command(subcommand)]
        command: ReleaseCommand,
    },
}

#[repr(u8)]
#[derive(Debug, Clone, Copy)]
enum CliExit {
    Usage = 2,
    Validation = 3,
    DependencyFailure = 4,
    Internal = 10,
}

struct CliError {
    exit: CliExit,
    message: String,
}

impl CliError {
    fn new(exit: CliExit, message: impl Into<String>) -> Self {
        Self {
            exit,
            message: message.into(),
        }
    }
}

fn main() -> ProcessExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    match dispatch(cli) {
        Ok(()) => ProcessExitCode::SUCCESS,
        Err(err) => {
            if json {
                eprintln!("{}", json!({ "error": err.message }));
            } else {
                eprintln!("error: {}", err.message);
            }
            ProcessExitCode::from(err.exit as u8)
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Tag { command } => run_tag(command, cli.json),
        Commands::Manifest { command } => run_manifest(command, cli.json),
        Commands::Release { command } => run_release(command, cli.json),
    }
}

fn parse_tag(raw: &str) -> Result<Tag, CliError> {
    Tag::parse(raw).map_err(|e| CliError::new(CliExit::Validation, e.to_string()))
}

fn run_tag(command: TagCommand, json: bool) -> Result<(), CliError> {
    match command {
        TagCommand::Next {
            current,
            state_file,
            seed,
        } => {
            let seed = parse_tag(&seed)?;
            let next = match (current, state_file) {
                (Some(raw), None) => parse_tag(&raw)?
                    .next()
                    .map_err(|e| CliError::new(CliExit::Validation, e.to_string()))?,
                (None, Some(path)) => FileTagState::new(path)
                    .issue_next(seed)
                    .map_err(|e| CliError::new(CliExit::Validation, e.to_string()))?,
                _ => {
                    return Err(CliError::new(
                        CliExit::Usage,
                        "pass exactly one of --current or --state-file",
                    ))
                }
            };
            if json {
                println!("{}", json!({ "tag": next.to_string() }));
            } else {
                println!("{next}");
            }
            Ok(())
        }
        TagCommand::Show { state_file } => {
            let state = FileTagState::new(state_file)
                .load()
                .map_err(|e| CliError::new(CliExit::Validation, e.to_string()))?
                .ok_or_else(|| CliError::new(CliExit::Validation, "no tag state recorded yet"))?;
            if json {
                println!(
                    "{}",
                    json!({
                        "current": state.current.to_string(),
                        "last_known_good": state.last_known_good.map(|t| t.to_string()),
                        "issued": state.history.len(),
                    })
                );
            } else {
                println!("current: {}", state.current);
                match state.last_known_good {
                    Some(tag) => println!("last known good: {tag}"),
                    None => println!("last known good: (none)"),
                }
            }
            Ok(())
        }
    }
}

fn run_manifest(command: ManifestCommand, json: bool) -> Result<(), CliError> {
    let ManifestCommand::Render {
        image,
        tag,
        replicas,
        app_name,
        out,
    } = command;
    let spec = ManifestSpec {
        image,
        tag: parse_tag(&tag)?,
        replicas,
        app_name,
    };
    let rendered =
        render_manifest(&spec).map_err(|e| CliError::new(CliExit::Internal, e.to_string()))?;
    match out {
        Some(path) => {
            write_manifest_file(&path, &rendered.yaml)?;
            if json {
                println!("{}", json!({ "out": path, "sha256": rendered.sha256 }));
            } else {
                println!("wrote {} (sha256 {})", path.display(), rendered.sha256);
            }
        }
        None => print!("{}", rendered.yaml),
    }
    Ok(())
}

fn write_manifest_file(path: &PathBuf, yaml: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CliError::new(
                    CliExit::Internal,
                    format!("failed to create {}: {e}", parent.display()),
                )
            })?;
        }
    }
    std::fs::write(path, yaml).map_err(|e| {
        CliError::new(
            CliExit::Internal,
            format!("failed to write {}: {e}", path.display()),
        )
    })
}

fn pipeline_error(e: PipelineError) -> CliError {
    let exit = match &e {
        PipelineError::Stage { .. } => CliExit::DependencyFailure,
        PipelineError::State(_) | PipelineError::NoKnownGood => CliExit::Validation,
        PipelineError::Render(_) | PipelineError::Io(_) => CliExit::Internal,
        _ => CliExit::Internal,
    };
    CliError::new(exit, e.to_string())
}

fn run_release(command: ReleaseCommand, json: bool) -> Result<(), CliError> {
    let runner = ShellRunner;
    match command {
        ReleaseCommand::Run {
            state_file,
            image,
            manifest_out,
            replicas,
            app_name,
            seed,
            skip_tests,
        } => {
            let mut config = PipelineConfig::new(&image, manifest_out);
            config.replicas = replicas;
            config.app_name = app_name;
            config.seed = parse_tag(&seed)?;
            config.skip_tests = skip_tests;
            let store = FileTagState::new(state_file);
            let report = Pipeline::new(config, &store, &runner)
                .run()
                .map_err(pipeline_error)?;
            emit_report("release run", &report, json);
            Ok(())
        }
        ReleaseCommand::Rollback {
            state_file,
            image,
            manifest_out,
            replicas,
            app_name,
        } => {
            let mut config = PipelineConfig::new(&image, manifest_out);
            config.replicas = replicas;
            config.app_name = app_name;
            let store = FileTagState::new(state_file);
            let report = Pipeline::new(config, &store, &runner)
                .rollback()
                .map_err(pipeline_error)?;
            emit_report("release rollback", &report, json);
            Ok(())
        }
    }
}

fn emit_report(command: &str, report: &taskdeck_release::PipelineReport, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "command": command,
                "status": "ok",
                "tag": report.tag.to_string(),
                "manifest": report.manifest_path,
                "manifest_sha256": report.manifest_sha256,
                "stages": report.stages,
            })
        );
    } else {
        println!("{command}: {} deployed", report.tag);
        println!(
            "manifest {} (sha256 {})",
            report.manifest_path.display(),
            report.manifest_sha256
        );
        for stage in &report.stages {
            println!("  {} ok: {}", stage.stage, stage.command);
        }
    }
}
