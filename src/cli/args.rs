//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::cluster::Transport;

/// ocaudit - OpenShift cluster health check report generator.
#[derive(Debug, Parser)]
#[command(name = "ocaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./ocaudit.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to kubeconfig (defaults to $KUBECONFIG, then ~/.kube/config)
    #[arg(long, global = true, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Audit the cluster and write the report (default if no command specified)
    Run(RunArgs),

    /// List available checks
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Run only specified checks (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip specified checks (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Directory the report is written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Custom AsciiDoc report template
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Archive path (defaults to <cluster>-health-check-<date>.zip)
    #[arg(long, value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Customer name printed on the report
    #[arg(long)]
    pub customer: Option<String>,

    /// How to reach the cluster (oc or api)
    #[arg(long)]
    pub transport: Option<Transport>,

    /// Pause between checks in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Write the report without creating an archive
    #[arg(long)]
    pub no_archive: bool,

    /// Skip release channel lookups
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
