//! Subcommands pertaining to templates and settings.

mod config;
pub use config::ConfigCmd;

mod validate;
pub use validate::ValidateCmd;
