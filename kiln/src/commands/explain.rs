use clap::Args;
use eyre::Result;

use super::ProjectArgs;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ExplainCommand {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl ExplainCommand {
    pub fn run(&self) -> Result<()> {
        let (project, manifest) = self.project.load(None)?;

        ops::explain(manifest, &project)?.render(&mut TerminalOutput::new());
        Ok(())
    }
}
