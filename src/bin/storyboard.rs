//! storyboard-compiler binary
//!
//! Compiles a storyboard JSON document and prints, exports or dry-runs the
//! resulting command timeline.
//!
//! ## Configuration (TOML / env via `config` crate, flags override)
//!
//! | Key                                | Default      | Description                        |
//! |------------------------------------|--------------|------------------------------------|
//! | `STORYBOARD_TICK_DELAY_MS`         | `50`         | Wall-clock ms per tick when pacing |
//! | `STORYBOARD_REALTIME`              | `false`      | Pace submissions in real time      |
//! | `STORYBOARD_NAMESPACE`             | `storyboard` | Function-file namespace            |
//! | `STORYBOARD_OUTPUT_DIR`            | `output`     | Export directory                   |
//! | `STORYBOARD_SETUP__GAMEMODE`       | `creative`   | World-setup game mode              |
//! | `STORYBOARD_SETUP__DIFFICULTY`     | `peaceful`   | World-setup difficulty             |
//!
//! The safety denylist (`[safety] blocked_prefixes / blocked_substrings`) is
//! only configurable from the TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, Environment, File};
use storyboard_compiler::{
    export::{self, ExportFile},
    scheduler::{DryRunTransport, RunOptions, Scheduler},
    world_setup_commands, CompilerSettings, SafetyPolicy, Script, ScriptAssembler, Storyboard,
};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "storyboard-compiler",
    about = "Compile storyboards into world command timelines",
    version
)]
struct Args {
    /// Optional TOML settings file
    #[arg(long, env = "STORYBOARD_CONFIG", default_value = "storyboard.toml")]
    config: PathBuf,

    /// Disable the teleport denylist
    #[arg(long, global = true)]
    permissive: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the compiled timeline
    Compile {
        /// Storyboard JSON file
        input: PathBuf,

        /// Print the script as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print a human-readable storyboard overview
    Summary {
        /// Storyboard JSON file
        input: PathBuf,
    },

    /// Write replay artifacts to the output directory
    Export {
        /// Storyboard JSON file
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportFormat::All)]
        format: ExportFormat,

        /// Overrides `output_dir` from settings
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Dry-run the timeline through the scheduler
    Run {
        /// Storyboard JSON file
        input: PathBuf,

        /// Pace submissions to match tick spacing
        #[arg(long)]
        realtime: bool,

        /// Overrides `tick_delay_ms` from settings
        #[arg(long)]
        tick_delay_ms: Option<u64>,

        /// Prepend the world-setup preset
        #[arg(long)]
        setup: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFormat {
    Text,
    Functions,
    Datapack,
    All,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storyboard_compiler=debug".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if args.permissive {
        settings.safety = SafetyPolicy::permissive();
    }

    match args.command {
        Cmd::Compile { input, json } => {
            let script = compile(&input, &settings)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&script)?);
            } else {
                print!("{}", export::render_text(&script).contents);
            }
        }

        Cmd::Summary { input } => {
            let storyboard = read_storyboard(&input)?;
            println!("{}", storyboard.summary());
        }

        Cmd::Export {
            input,
            format,
            output_dir,
        } => {
            let script = compile(&input, &settings)?;
            let root = output_dir.unwrap_or_else(|| PathBuf::from(&settings.output_dir));
            let files = render(&script, format, &settings.namespace);
            write_files(&root, &files)?;
            log::info!("Wrote {} files under {}", files.len(), root.display());
        }

        Cmd::Run {
            input,
            realtime,
            tick_delay_ms,
            setup,
        } => {
            let script = compile(&input, &settings)?;
            let mut options = RunOptions::from(&settings);
            options.realtime |= realtime;
            if let Some(ms) = tick_delay_ms {
                options.tick_delay_ms = ms;
            }

            let mut commands = Vec::new();
            if setup {
                commands.extend(world_setup_commands(&settings.setup));
            }
            commands.extend(script.timeline());

            let cancel = CancellationToken::new();
            {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("Cancelling run (SIGINT)");
                        cancel.cancel();
                    }
                });
            }

            let transport = Arc::new(DryRunTransport::new());
            let report = Scheduler::new(transport, options)
                .run(&commands, &cancel)
                .await;

            println!("{}", report.summary());
            if report.cancelled {
                println!("Run cancelled");
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_settings(path: &Path) -> Result<CompilerSettings> {
    Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("STORYBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to load settings from {}", path.display()))?
        .try_deserialize()
        .context("Failed to parse settings")
}

fn read_storyboard(path: &Path) -> Result<Storyboard> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read storyboard {}", path.display()))?;
    Storyboard::from_json(&text)
        .with_context(|| format!("Invalid storyboard {}", path.display()))
}

fn compile(path: &Path, settings: &CompilerSettings) -> Result<Script> {
    let storyboard = read_storyboard(path)?;
    Ok(ScriptAssembler::new(settings.safety.clone()).assemble(&storyboard))
}

fn render(script: &Script, format: ExportFormat, namespace: &str) -> Vec<ExportFile> {
    let mut files = Vec::new();
    if matches!(format, ExportFormat::Text | ExportFormat::All) {
        files.push(export::render_text(script));
    }
    if matches!(format, ExportFormat::Functions | ExportFormat::All) {
        files.extend(
            export::render_functions(script, namespace)
                .into_iter()
                .map(|f| ExportFile {
                    path: Path::new("functions").join(f.path),
                    contents: f.contents,
                }),
        );
    }
    if matches!(format, ExportFormat::Datapack | ExportFormat::All) {
        files.extend(export::render_datapack(script, namespace));
    }
    files
}

fn write_files(root: &Path, files: &[ExportFile]) -> Result<()> {
    for file in files {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
