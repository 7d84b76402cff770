use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::{Octocrab, Page, service::middleware::retry::RetryConfig};
use serde::{Deserialize, Serialize};

use crate::{
    forge::{PageCursor, ReviewForge, ReviewPage},
    types::{PullRequestRef, Review, ReviewEvent, ReviewId, ReviewState},
};

/// GitHub allows at most 100 items per page.
const REVIEWS_PER_PAGE: u8 = 100;

/// Review forge backed by the GitHub REST API.
pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Creates an authenticated client against `api_url`.
    ///
    /// Every request is sent exactly once; octocrab's default retry layer is
    /// disabled.
    pub fn connect(token: &str, api_url: &url::Url) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .personal_token(token.to_string())
            .base_uri(api_url.as_str())
            .with_context(|| format!("Invalid GitHub API URL: '{}'", api_url))?
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self::new(octocrab))
    }
}

#[derive(Debug, Serialize)]
struct CreateReviewBody<'a> {
    commit_id: &'a str,
    event: &'static str,
}

#[derive(Debug, Serialize)]
struct DismissReviewBody<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ListReviewsParams {
    per_page: u8,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiReview {
    id: u64,
    user: Option<ApiUser>,
    state: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
}

impl From<ApiReview> for Review {
    fn from(review: ApiReview) -> Self {
        Review {
            id: ReviewId(review.id),
            author: review.user.map(|user| user.login),
            state: review
                .state
                .as_deref()
                .map_or(ReviewState::Pending, ReviewState::parse),
            submitted_at: review.submitted_at,
        }
    }
}

fn into_review_page(page: Page<ApiReview>) -> ReviewPage {
    ReviewPage {
        reviews: page.items.into_iter().map(Review::from).collect(),
        next: page.next.map(|uri| PageCursor(uri.to_string())),
    }
}

#[async_trait]
impl ReviewForge for GitHub {
    async fn create_review(
        &self,
        pull: &PullRequestRef,
        commit_id: &str,
        event: ReviewEvent,
    ) -> Result<Review> {
        let body = CreateReviewBody {
            commit_id,
            event: event.as_str(),
        };
        let review: ApiReview = self
            .octocrab
            .post(pull.reviews_route(), Some(&body))
            .await
            .with_context(|| format!("Failed to submit review on {}", pull))?;
        Ok(review.into())
    }

    async fn list_reviews(
        &self,
        pull: &PullRequestRef,
        cursor: Option<&PageCursor>,
    ) -> Result<ReviewPage> {
        let page: Page<ApiReview> = match cursor {
            // The cursor is the absolute `rel="next"` URL, query included.
            Some(cursor) => {
                self.octocrab
                    .get::<Page<ApiReview>, _, ()>(cursor.as_str(), None)
                    .await
            }
            None => {
                let params = ListReviewsParams {
                    per_page: REVIEWS_PER_PAGE,
                };
                self.octocrab
                    .get::<Page<ApiReview>, _, _>(pull.reviews_route(), Some(&params))
                    .await
            }
        }
        .with_context(|| format!("Failed to list reviews on {}", pull))?;

        Ok(into_review_page(page))
    }

    async fn dismiss_review(
        &self,
        pull: &PullRequestRef,
        review_id: ReviewId,
        message: &str,
    ) -> Result<()> {
        let route = format!("{}/{}/dismissals", pull.reviews_route(), review_id);
        let _: ApiReview = self
            .octocrab
            .put(route, Some(&DismissReviewBody { message }))
            .await
            .with_context(|| format!("Failed to dismiss review {} on {}", review_id, pull))?;
        Ok(())
    }
}
