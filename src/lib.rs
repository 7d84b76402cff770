//! auto-approve: automated review of feature-flag deployment pull requests.
//!
//! Reads a comparison document describing how a pending deployment changes
//! each flag in each environment, decides whether every affected environment
//! is one that may change without human review, and then converges the pull
//! request's reviews: approving it, or dismissing earlier bot approvals that
//! no longer apply.

pub mod cli;
pub mod comparison;
pub mod context;
pub mod decision;
pub mod error;
pub mod forge;
pub mod github;
pub mod reconcile;
pub mod types;

pub use cli::{Config, parse_args};
pub use comparison::{ComparisonDocument, EnvironmentChange, FlagChange, load_comparison};
pub use context::EventContext;
pub use decision::{BlockingChange, can_auto_approve, find_blocking_change};
pub use error::{Error, Result};
pub use forge::{PageCursor, ReviewForge, ReviewPage};
pub use github::GitHub;
pub use reconcile::{BOT_LOGIN, DISMISSAL_MESSAGE, Effect, bot_approvals, reconcile};
pub use types::{
    AllowedEnvironments, PullRequestRef, Repo, RepoError, Review, ReviewEvent, ReviewId,
    ReviewState,
};

/// What a completed run decided and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub approvable: bool,
    pub effects: Vec<Effect>,
}

/// Loads the comparison, decides, and reconciles the pull request.
///
/// The comparison is validated before the forge is touched, so an invalid
/// document never results in an API call.
pub async fn run<F>(config: &Config, context: &EventContext, forge: &F) -> Result<Outcome>
where
    F: ReviewForge + Sync + ?Sized,
{
    let comparison = load_comparison(&config.comparison_path)?;
    let approvable = can_auto_approve(&comparison, &config.environments);
    tracing::debug!(pull = %context.pull, approvable, "Decided");

    let effects = reconcile(forge, &context.pull, &context.commit_id, approvable).await?;

    Ok(Outcome {
        approvable,
        effects,
    })
}
