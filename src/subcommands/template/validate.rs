//! `validate` subcommand.

use crate::ctx::{write_validation, EbcContext};
use anyhow::{ensure, Result};
use clap::Args;

/// CLI arguments for the `validate` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ValidateCmd {
    /// The template to check, e.g. `feature/${System.Id}-${System.Title}`.
    #[clap(index = 1)]
    template: String,
}

impl ValidateCmd {
    /// Run the `validate` subcommand.
    pub async fn run(self, ctx: EbcContext) -> Result<()> {
        let validation = ctx.validate(&self.template).await?;

        let mut buf = String::new();
        write_validation(&mut buf, &self.template, &validation)?;
        print!("{}", buf);

        ensure!(validation.is_valid(), "Template is invalid.");
        Ok(())
    }
}
