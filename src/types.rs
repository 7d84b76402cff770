use std::{collections::HashSet, fmt};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced while parsing an `owner/name` repository slug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    InvalidFormat(String),
    #[error("repository owner must not be empty")]
    EmptyOwner,
    #[error("repository name must not be empty")]
    EmptyName,
}

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        if owner.trim().is_empty() {
            return Err(RepoError::EmptyOwner);
        }
        if name.trim().is_empty() {
            return Err(RepoError::EmptyName);
        }
        Ok(Self { owner, name })
    }

    /// Parses the `owner/repo` form used by `GITHUB_REPOSITORY`.
    pub fn parse(slug: &str) -> Result<Self, RepoError> {
        let Some((owner, name)) = slug.split_once('/') else {
            return Err(RepoError::InvalidFormat(slug.to_string()));
        };
        if name.contains('/') {
            return Err(RepoError::InvalidFormat(slug.to_string()));
        }
        Self::new(owner, name)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The pull request a run acts on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestRef {
    pub repo: Repo,
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(repo: Repo, number: u64) -> Self {
        Self { repo, number }
    }

    /// REST route of the pull request's review collection.
    pub fn reviews_route(&self) -> String {
        format!(
            "/repos/{}/{}/pulls/{}/reviews",
            self.repo.owner(),
            self.repo.name(),
            self.number
        )
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReviewId(pub u64);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review states as reported by the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other(String),
}

impl ReviewState {
    pub fn parse(state: &str) -> Self {
        match state {
            "APPROVED" => ReviewState::Approved,
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "COMMENTED" => ReviewState::Commented,
            "DISMISSED" => ReviewState::Dismissed,
            "PENDING" => ReviewState::Pending,
            other => ReviewState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReviewState::Approved => "APPROVED",
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            ReviewState::Commented => "COMMENTED",
            ReviewState::Dismissed => "DISMISSED",
            ReviewState::Pending => "PENDING",
            ReviewState::Other(other) => other,
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event submitted with a new review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    Approve,
}

impl ReviewEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewEvent::Approve => "APPROVE",
        }
    }
}

/// A single review on a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    /// Login of the author; `None` when the account has been deleted.
    pub author: Option<String>,
    pub state: ReviewState,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }

    pub fn is_dismissed(&self) -> bool {
        self.state == ReviewState::Dismissed
    }
}

/// Environments into which changes may be approved without a human.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedEnvironments(HashSet<String>);

impl AllowedEnvironments {
    /// Splits a `;`-separated list. Segments are taken verbatim, so an empty
    /// input yields the single empty name.
    pub fn parse(environments: &str) -> Self {
        Self(environments.split(';').map(str::to_string).collect())
    }

    pub fn contains(&self, environment: &str) -> bool {
        self.0.contains(environment)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedEnvironments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_parse_valid() {
        let repo = Repo::parse("test_owner/test_repo").unwrap();
        assert_eq!(repo.owner(), "test_owner");
        assert_eq!(repo.name(), "test_repo");
        assert_eq!(repo.to_string(), "test_owner/test_repo");
    }

    #[test]
    fn test_repo_parse_rejects_malformed() {
        assert_eq!(
            Repo::parse("no-slash"),
            Err(RepoError::InvalidFormat("no-slash".to_string()))
        );
        assert_eq!(
            Repo::parse("a/b/c"),
            Err(RepoError::InvalidFormat("a/b/c".to_string()))
        );
        assert_eq!(Repo::parse("/repo"), Err(RepoError::EmptyOwner));
        assert_eq!(Repo::parse("owner/"), Err(RepoError::EmptyName));
    }

    #[test]
    fn test_reviews_route() {
        let pull = PullRequestRef::new(Repo::parse("o/r").unwrap(), 123);
        assert_eq!(pull.reviews_route(), "/repos/o/r/pulls/123/reviews");
        assert_eq!(pull.to_string(), "o/r#123");
    }

    #[test]
    fn test_review_state_parse() {
        assert_eq!(ReviewState::parse("APPROVED"), ReviewState::Approved);
        assert_eq!(ReviewState::parse("DISMISSED"), ReviewState::Dismissed);
        assert_eq!(
            ReviewState::parse("SOMETHING_NEW"),
            ReviewState::Other("SOMETHING_NEW".to_string())
        );
        assert_eq!(ReviewState::parse("SOMETHING_NEW").as_str(), "SOMETHING_NEW");
    }

    #[test]
    fn test_allowed_environments_split_on_semicolon() {
        let allowed = AllowedEnvironments::parse("test;staging");
        assert_eq!(allowed.len(), 2);
        assert!(allowed.contains("test"));
        assert!(allowed.contains("staging"));
        assert!(!allowed.contains("prod"));
    }

    #[test]
    fn test_allowed_environments_are_not_trimmed() {
        let allowed = AllowedEnvironments::parse("test; prod");
        assert!(allowed.contains(" prod"));
        assert!(!allowed.contains("prod"));
    }

    #[test]
    fn test_allowed_environments_empty_input() {
        let allowed = AllowedEnvironments::parse("");
        assert_eq!(allowed.len(), 1);
        assert!(allowed.contains(""));
    }

    #[test]
    fn test_allowed_environments_deduplicates() {
        assert_eq!(AllowedEnvironments::parse("test;test").len(), 1);
    }
}
