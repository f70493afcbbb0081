//! `create` subcommand.

use crate::{
    constants::ERR_COLOR,
    creator::{parse_base_url, BranchCreationRequest, CreationOutcome, StepOutcome},
    ctx::EbcContext,
    notify::TerminalNotifier,
};
use anyhow::{ensure, Result};
use clap::Args;
use itertools::Itertools;
use std::sync::Arc;
use url::Url;

/// CLI arguments for the `create` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CreateCmd {
    /// Ids of the records to create branches for.
    #[clap(required = true)]
    record_ids: Vec<u64>,
    /// Repository to create the branches in. Defaults to the current repository.
    #[clap(long, short)]
    repository: Option<String>,
    /// Branch to cut the new branches from. Prompts for one when omitted.
    #[clap(long, short)]
    source_branch: Option<String>,
    /// Base URL of the repository host, e.g. `https://dev.azure.com/org/project/_git`.
    #[clap(long, env = "EBC_BASE_URL", value_parser = parse_base_url)]
    base_url: Url,
}

impl CreateCmd {
    /// Run the `create` subcommand.
    pub async fn run(self, ctx: EbcContext) -> Result<()> {
        let repository_id = self
            .repository
            .unwrap_or_else(|| ctx.repository_name.clone());
        let source_branch_name = match self.source_branch {
            Some(name) => name,
            None => ctx.select_source_branch(&repository_id).await?,
        };

        let requests = self
            .record_ids
            .into_iter()
            .unique()
            .map(|record_id| BranchCreationRequest {
                record_id,
                repository_id: repository_id.clone(),
                source_branch_name: source_branch_name.clone(),
                project: ctx.project.clone(),
                base_url: self.base_url.clone(),
            })
            .collect_vec();

        let creator = ctx.creator(Arc::new(TerminalNotifier));
        let results = creator.create_branches(&requests).await;

        let mut failed = 0;
        for (record_id, result) in &results {
            match result {
                Ok(CreationOutcome::Created { link, state, .. }) => {
                    report_step(*record_id, "link", link);
                    report_step(*record_id, "state update", state);
                }
                Ok(CreationOutcome::AlreadyExists { .. }) => {}
                Err(e) => {
                    failed += 1;
                    println!(
                        "{} {}",
                        ERR_COLOR.paint(format!("Record {}:", record_id)),
                        e
                    );
                }
            }
        }

        ensure!(
            failed == 0,
            "{} of {} records could not be processed.",
            failed,
            results.len()
        );
        Ok(())
    }
}

/// Mentions a failed post-creation step. The branch itself exists.
fn report_step(record_id: u64, step: &str, outcome: &StepOutcome) {
    if let StepOutcome::Failed(e) = outcome {
        println!(
            "{} {} skipped: {}",
            ERR_COLOR.paint(format!("Record {}:", record_id)),
            step,
            e
        );
    }
}
