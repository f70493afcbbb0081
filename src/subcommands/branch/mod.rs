//! Subcommands pertaining to branch creation.

mod create;
pub use create::CreateCmd;

mod preview;
pub use preview::PreviewCmd;
