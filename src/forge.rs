use async_trait::async_trait;

use crate::types::{PullRequestRef, Review, ReviewEvent, ReviewId};

/// Opaque position of the next page in a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(pub String);

impl PageCursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a pull request's reviews.
#[derive(Debug, Clone, Default)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    /// Where to continue; `None` once the listing is exhausted.
    pub next: Option<PageCursor>,
}

/// The review operations the reconciler needs from a source-control host.
///
/// Implementations perform exactly one remote call per method and never
/// retry; failures surface to the caller unchanged.
#[async_trait]
pub trait ReviewForge {
    /// Submits a new review on `commit_id` and returns it as recorded.
    async fn create_review(
        &self,
        pull: &PullRequestRef,
        commit_id: &str,
        event: ReviewEvent,
    ) -> anyhow::Result<Review>;

    /// Fetches one page of reviews, starting from the first page when
    /// `cursor` is `None`.
    async fn list_reviews(
        &self,
        pull: &PullRequestRef,
        cursor: Option<&PageCursor>,
    ) -> anyhow::Result<ReviewPage>;

    async fn dismiss_review(
        &self,
        pull: &PullRequestRef,
        review_id: ReviewId,
        message: &str,
    ) -> anyhow::Result<()>;
}
