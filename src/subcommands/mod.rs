//! The subcommands for the `ebc` application.

use crate::ctx::EbcContext;
use clap::Subcommand;

mod branch;
pub use branch::{CreateCmd, PreviewCmd};

mod template;
pub use template::{ConfigCmd, ValidateCmd};

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Create a branch for each record, named after the project's branch name template.
    #[clap(alias = "c")]
    Create(CreateCmd),
    /// Print the branch names records would get, without creating anything.
    #[clap(alias = "p")]
    Preview(PreviewCmd),
    /// Check a branch name template against the project's known fields.
    Validate(ValidateCmd),
    /// Show or edit the project's settings.
    #[clap(alias = "cfg")]
    Config(ConfigCmd),
}

impl Subcommands {
    /// Run the subcommand with the given context.
    pub async fn run(self, ctx: EbcContext) -> anyhow::Result<()> {
        match self {
            Self::Create(args) => args.run(ctx).await,
            Self::Preview(args) => args.run(ctx).await,
            Self::Validate(args) => args.run(ctx).await,
            Self::Config(args) => args.run(ctx).await,
        }
    }
}
