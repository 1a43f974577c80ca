//! CLI Tooling
//!
//! Command-line interface over exported canvas snapshots: inspect the path to a
//! frame, list the clips it would merge, and run a merge against the service.

use super::format::{
    format_path_json, format_path_text, format_receipt_text, format_videos_json,
    format_videos_text, outcome_label,
};
use crate::config::{ConfigLoader, StudioConfig};
use crate::error::{ApiError, MergeError};
use crate::graph::{CanvasSnapshot, GraphQuery};
use crate::merge::{MergeOrchestrator, MergeOutcome};
use crate::notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
use crate::path::{resolve_path, FramePath};
use crate::sequence::extract_videos;
use crate::types::ShapeId;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Framemerge CLI - merge generated clips along a frame chain
#[derive(Parser)]
#[command(name = "framemerge")]
#[command(about = "Resolve frame chains on an exported canvas and merge their videos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the chain of frames from the root to the selected frame
    Path {
        /// Canvas snapshot exported by the editor (JSON)
        #[arg(long)]
        snapshot: PathBuf,
        /// Frame to resolve instead of the snapshot's selection
        #[arg(long)]
        frame: Option<String>,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the videos that would be merged, in order
    Videos {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        frame: Option<String>,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Merge the videos along the path and download the result
    Merge {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        frame: Option<String>,
        /// Directory for the downloaded video (overrides delivery.output_dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

/// Prints notifications to stderr and mirrors them into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => eprintln!("{}", notification.message.green()),
            NotificationLevel::Error => eprintln!("{}", notification.message.red()),
        }
        TracingNotifier.notify(notification);
    }
}

/// CLI context for one workspace
pub struct CliContext {
    workspace_root: PathBuf,
    config: StudioConfig,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(cfg_path) = &config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command).await;
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis(),
            "Command finished"
        );
        result
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Path {
                snapshot,
                frame,
                format,
            } => {
                let canvas = self.load_snapshot(snapshot, frame.as_deref())?;
                let path = resolve_selected(&canvas)?;
                match format.as_str() {
                    "json" => Ok(format_path_json(&path)),
                    "text" => Ok(format_path_text(&path)),
                    other => Err(invalid_format(other)),
                }
            }
            Commands::Videos {
                snapshot,
                frame,
                format,
            } => {
                let canvas = self.load_snapshot(snapshot, frame.as_deref())?;
                let path = resolve_selected(&canvas)?;
                let videos = extract_videos(&path);
                match format.as_str() {
                    "json" => Ok(format_videos_json(&videos)),
                    "text" => Ok(format_videos_text(&videos)),
                    other => Err(invalid_format(other)),
                }
            }
            Commands::Merge {
                snapshot,
                frame,
                output,
            } => {
                let canvas = self.load_snapshot(snapshot, frame.as_deref())?;
                self.run_merge(Arc::new(canvas), output.as_deref()).await
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => toml::to_string_pretty(&self.config).map_err(|e| {
                    ApiError::ConfigError(format!("Failed to serialize configuration: {}", e))
                }),
            },
        }
    }

    fn load_snapshot(&self, path: &Path, frame: Option<&str>) -> Result<CanvasSnapshot, ApiError> {
        let mut canvas = CanvasSnapshot::load(&self.resolve(path))?;
        if let Some(frame) = frame {
            canvas.select(vec![ShapeId::from(frame)]);
        }
        Ok(canvas)
    }

    async fn run_merge(
        &self,
        canvas: Arc<CanvasSnapshot>,
        output: Option<&Path>,
    ) -> Result<String, ApiError> {
        let mut config = self.config.clone();
        if let Some(output) = output {
            config.delivery.output_dir = output.to_path_buf();
        }
        config.delivery.output_dir = self.resolve(&config.delivery.output_dir);

        info!(
            endpoint = %config.merge_service.endpoint(),
            output_dir = %config.delivery.output_dir.display(),
            "Starting merge"
        );
        let orchestrator =
            MergeOrchestrator::from_config(canvas, &config, Arc::new(ConsoleNotifier))?;

        let outcome = orchestrator.merge().await;
        info!(outcome = outcome_label(&outcome), "Merge finished");
        match outcome {
            MergeOutcome::Merged(receipt) => Ok(format_receipt_text(&receipt)),
            MergeOutcome::Rejected(e) | MergeOutcome::Failed(e) => Err(ApiError::Reported(e)),
            MergeOutcome::Ignored => Ok("A merge is already in progress.".to_string()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}

/// Resolve the path for the snapshot's selected frame.
fn resolve_selected(canvas: &CanvasSnapshot) -> Result<FramePath, ApiError> {
    let target = canvas.selected_frame().ok_or(MergeError::NoFrameSelected)?;
    Ok(resolve_path(canvas, &target.id)?)
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Invalid format: {} (must be 'text' or 'json')",
        format
    ))
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Path { .. } => "path",
        Commands::Videos { .. } => "videos",
        Commands::Merge { .. } => "merge",
        Commands::Config { .. } => "config.show",
    }
}
