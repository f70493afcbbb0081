//! Best-effort steps that run after a branch exists and never fail the creation.

use crate::errors::{EbcError, EbcResult};
use std::{fmt, future::Future};
use tracing::{debug, warn};

/// A post-creation step.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum PostStep {
    /// Link the new branch to its record.
    Link,
    /// Move the record into its configured target state.
    UpdateState,
}

impl fmt::Display for PostStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => write!(f, "link"),
            Self::UpdateState => write!(f, "update-state"),
        }
    }
}

/// Outcome of a [PostStep].
#[derive(Debug)]
pub(crate) enum StepOutcome {
    Completed,
    /// The step was not configured to run.
    Skipped,
    /// The step failed. The error has been logged.
    Failed(EbcError),
}

/// Runs `step`, logging and capturing its error instead of propagating it.
pub(crate) async fn best_effort<F>(step: PostStep, fut: F) -> StepOutcome
where
    F: Future<Output = EbcResult<()>>,
{
    match fut.await {
        Ok(()) => {
            debug!(%step, "Post-creation step completed");
            StepOutcome::Completed
        }
        Err(e) => {
            warn!(%step, error = %e, "Post-creation step failed");
            StepOutcome::Failed(e)
        }
    }
}
