use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::ProjectArgs;
use crate::{
    ops::{self, GenerateOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory (overrides kiln.toml, defaults to the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Preview generated files without writing to disk
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let (project, manifest) = self.project.load(self.output.as_deref())?;

        let report = ops::generate(
            manifest,
            &project,
            GenerateOptions {
                output_dir: &project.output_dir,
                dry_run: self.dry_run,
            },
        )?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
