//! `preview` subcommand.

use crate::{
    constants::{ERR_COLOR, NAME_COLOR},
    ctx::EbcContext,
    notify::TerminalNotifier,
};
use anyhow::Result;
use clap::Args;
use itertools::Itertools;
use std::sync::Arc;

/// CLI arguments for the `preview` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct PreviewCmd {
    /// Ids of the records to preview branch names for.
    #[clap(required = true)]
    record_ids: Vec<u64>,
    /// Branch the new branches would be cut from. Prompts for one when omitted.
    #[clap(long, short)]
    source_branch: Option<String>,
}

impl PreviewCmd {
    /// Run the `preview` subcommand.
    pub async fn run(self, ctx: EbcContext) -> Result<()> {
        let source_branch_name = match self.source_branch {
            Some(name) => name,
            None => ctx.select_source_branch(&ctx.repository_name).await?,
        };

        let creator = ctx.creator(Arc::new(TerminalNotifier));
        for record_id in self.record_ids.into_iter().unique() {
            match creator
                .branch_name(record_id, &ctx.project, &source_branch_name)
                .await
            {
                Ok(name) => println!("{}: {}", record_id, NAME_COLOR.paint(name)),
                Err(e) => println!("{}: {}", record_id, ERR_COLOR.paint(e.to_string())),
            }
        }
        Ok(())
    }
}
