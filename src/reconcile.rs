//! Converges a pull request's bot reviews to match an approval decision.
//!
//! Approving always submits a fresh review. Withdrawing approval dismisses
//! every outstanding review left by the bot. Each run starts from whatever the
//! forge reports, so re-running after a failure is the recovery path.

use std::pin::pin;

use futures::{Stream, TryStreamExt, future, stream};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    forge::{PageCursor, ReviewForge},
    types::{PullRequestRef, Review, ReviewEvent, ReviewId},
};

/// Login GitHub Actions uses when a workflow acts with its own token.
pub const BOT_LOGIN: &str = "github-actions[bot]";

/// Reason attached to every dismissal.
pub const DISMISSAL_MESSAGE: &str = "Approval no longer applicable.";

/// A single write issued against the pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Approved { review_id: ReviewId },
    Dismissed { review_id: ReviewId },
}

/// Brings the pull request in line with `approve`, returning the writes in
/// the order they were issued.
pub async fn reconcile<F>(
    forge: &F,
    pull: &PullRequestRef,
    commit_id: &str,
    approve: bool,
) -> Result<Vec<Effect>>
where
    F: ReviewForge + Sync + ?Sized,
{
    if approve {
        let review_id = approve_pull_request(forge, pull, commit_id).await?;
        Ok(vec![Effect::Approved { review_id }])
    } else {
        let dismissed = dismiss_approvals(forge, pull).await?;
        Ok(dismissed
            .into_iter()
            .map(|review_id| Effect::Dismissed { review_id })
            .collect())
    }
}

/// Submits an approval and checks it was recorded under the bot identity.
pub async fn approve_pull_request<F>(
    forge: &F,
    pull: &PullRequestRef,
    commit_id: &str,
) -> Result<ReviewId>
where
    F: ReviewForge + Sync + ?Sized,
{
    let review = forge
        .create_review(pull, commit_id, ReviewEvent::Approve)
        .await
        .map_err(Error::transport("create review"))?;

    if !review.is_authored_by(BOT_LOGIN) {
        return Err(Error::IdentityMismatch {
            expected: BOT_LOGIN.to_string(),
            actual: review.author.unwrap_or_default(),
        });
    }

    info!("Approved pull request. (id: {})", review.id);
    Ok(review.id)
}

/// Dismisses every outstanding bot review, one at a time. Stops at the first
/// failure.
pub async fn dismiss_approvals<F>(forge: &F, pull: &PullRequestRef) -> Result<Vec<ReviewId>>
where
    F: ReviewForge + Sync + ?Sized,
{
    let mut approvals = pin!(bot_approvals(forge, pull));
    let mut dismissed = Vec::new();

    while let Some(review) = approvals.try_next().await? {
        forge
            .dismiss_review(pull, review.id, DISMISSAL_MESSAGE)
            .await
            .map_err(Error::transport("dismiss review"))?;

        info!("Dismissed approval. (id: {})", review.id);
        dismissed.push(review.id);
    }

    Ok(dismissed)
}

enum Cursor {
    First,
    Next(PageCursor),
    Exhausted,
}

/// Lazily lists the bot's reviews that have not been dismissed.
///
/// Pages are requested only as the consumer drains the previous one.
pub fn bot_approvals<'a, F>(
    forge: &'a F,
    pull: &'a PullRequestRef,
) -> impl Stream<Item = Result<Review>> + 'a
where
    F: ReviewForge + Sync + ?Sized,
{
    stream::try_unfold(Cursor::First, move |cursor| async move {
        let from = match cursor {
            Cursor::First => None,
            Cursor::Next(cursor) => Some(cursor),
            Cursor::Exhausted => return Ok::<_, Error>(None),
        };

        let page = forge
            .list_reviews(pull, from.as_ref())
            .await
            .map_err(Error::transport("list reviews"))?;
        debug!(
            pull = %pull,
            reviews = page.reviews.len(),
            more = page.next.is_some(),
            "Fetched review page"
        );

        let next = page.next.map_or(Cursor::Exhausted, Cursor::Next);
        let reviews = stream::iter(page.reviews.into_iter().map(Ok::<Review, Error>));
        Ok(Some((reviews, next)))
    })
    .try_flatten()
    .try_filter(|review| {
        future::ready(review.is_authored_by(BOT_LOGIN) && !review.is_dismissed())
    })
}
