mod check;
mod explain;
mod generate;

use std::path::{Path, PathBuf};

use check::CheckCommand;
use clap::{Args, Parser, Subcommand};
use eyre::Result;
use explain::ExplainCommand;
use generate::GenerateCommand;
use kiln_manifest::Manifest;
use tracing_subscriber::EnvFilter;

use crate::config::{Overrides, Project};

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for kiln_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "kiln")]
#[command(version)]
#[command(about = "Compile app host manifests into Bicep and Container Apps templates")]
pub(crate) struct Cli {
    /// Log pipeline progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        self.init_logging();

        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Explain(cmd) => cmd.run(),
        }
    }

    fn init_logging(&self) {
        let filter = if self.verbose { "debug" } else { "warn" };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
            )
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .init();
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Bicep infrastructure and Container Apps templates
    Generate(GenerateCommand),

    /// Validate the manifest and resolve every service without writing files
    Check(CheckCommand),

    /// Show the resource graph, type catalog and platform resources
    Explain(ExplainCommand),
}

/// Project selection shared by every command.
#[derive(Args)]
pub(crate) struct ProjectArgs {
    /// Path to kiln.toml (defaults to ./kiln.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the manifest (overrides kiln.toml, defaults to ./manifest.json)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Expose a service externally: `name` for every binding, `name:binding` for one
    #[arg(long = "expose", value_name = "NAME[:BINDING]")]
    pub expose: Vec<String>,
}

impl ProjectArgs {
    /// Load the project and its manifest, exiting with a diagnostic if the
    /// manifest is invalid.
    pub fn load(&self, output: Option<&Path>) -> Result<(Project, Manifest)> {
        let project = Project::load(Overrides {
            config: self.config.as_deref(),
            manifest: self.manifest.as_deref(),
            output,
            expose: &self.expose,
        })?;
        let manifest = Manifest::from_file(&project.manifest_path).unwrap_or_exit();
        Ok((project, manifest))
    }
}
