//! `tektasker`: from marked Go types to Tekton Tasks.
//!
//! Reads package snapshots, then either assembles Task manifests (`generate manifest`),
//! synthesizes Go bindings (`generate go`) or documents the supported markers
//! (`markers`).

mod cli_config;
mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli_config::CliConfig;

#[derive(Debug, Parser)]
#[command(
    name = "tektasker",
    version,
    about = "From your Go IDE to your Tekton cluster in minutes",
    styles = output::clap_styles()
)]
pub(crate) struct Cli {
    /// Run in debug mode
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only output to stdout
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Package snapshot to generate from (repeatable)
    #[arg(short = 'i', long = "input", global = true, value_name = "SNAPSHOT")]
    pub inputs: Vec<PathBuf>,

    /// Config file to use instead of the discovered `.tektasker.toml`
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Generate artifacts from the given packages
    #[command(subcommand, visible_aliases = ["gen", "g"])]
    Generate(GenerateCommands),

    /// Show help for all markers you can use in your code, or for the one given
    Markers {
        /// Marker name, with or without the leading `+`
        name: Option<String>,

        /// What the marker is attached to: package, type or field
        #[arg(default_value = "type")]
        target: String,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum GenerateCommands {
    /// Generate the Task manifests and write them under the given directory
    #[command(after_help = "Examples:\n  \
        tektasker gen -i snapshot.yaml manifest ./manifests/\n  \
        tektasker gen -i snapshot.yaml --dry-run manifest")]
    Manifest {
        /// Output directory (required unless --dry-run is set)
        output_dir: Option<PathBuf>,

        /// Tera template of the step command
        #[arg(long, value_name = "TEMPLATE")]
        command: Option<String>,

        /// Do not write base/kustomization.yaml
        #[arg(long)]
        skip_kustomization: bool,
    },

    /// Generate the Go code to integrate with Tekton
    ///
    /// Without arguments this is `tektasker gen go internal/ tekton`: support files are
    /// written to internal/tekton with a package name of "tekton", and the methods of
    /// every task package land in its zz_generated.tektasker.go.
    Go {
        /// Parent directory of the support package
        dir: Option<PathBuf>,

        /// Name of the support package
        pkg_name: Option<String>,

        /// License header prepended to generated files (` YEAR` is substituted)
        #[arg(long, value_name = "FILE")]
        header_file: Option<PathBuf>,

        /// Year substituted in the license header (defaults to the current year)
        #[arg(long)]
        year: Option<String>,
    },
}

/// Global options shared by every command.
#[derive(Debug)]
pub(crate) struct RunContext {
    pub dry_run: bool,
    pub inputs: Vec<PathBuf>,
    pub config: CliConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.debug) {
        output::error(format!("failed to initialize logging: {e:#}"));
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => cli_config::load_config_file(path)?,
        None => cli_config::load_cli_config(),
    };

    let ctx = RunContext {
        dry_run: cli.dry_run,
        inputs: cli.inputs,
        config,
    };

    match cli.command {
        Commands::Generate(cmd) => commands::handle_generate_command(cmd, &ctx),
        Commands::Markers { name, target } => {
            commands::handle_markers_command(name.as_deref(), &target)
        }
    }
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("tektasker={level}").parse()?)
                .add_directive(format!("tektasker_sdk={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
