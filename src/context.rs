use std::path::Path;

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    types::{PullRequestRef, Repo},
};

const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";
const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";
const SHA_VAR: &str = "GITHUB_SHA";

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
}

/// What the triggering workflow run tells us about the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub pull: PullRequestRef,
    pub commit_id: String,
}

impl EventContext {
    /// Builds the context from the variables GitHub Actions sets for every
    /// step.
    pub fn from_env() -> Result<Self> {
        let event_path = required_var(EVENT_PATH_VAR)?;
        let repository = required_var(REPOSITORY_VAR)?;
        let sha = required_var(SHA_VAR)?;

        let event_path = Path::new(&event_path);
        let event_json = std::fs::read_to_string(event_path).map_err(|source| Error::Io {
            path: event_path.to_path_buf(),
            source,
        })?;

        Self::from_parts(&event_json, &repository, &sha)
    }

    pub fn from_parts(event_json: &str, repository: &str, sha: &str) -> Result<Self> {
        let payload: EventPayload = serde_json::from_str(event_json)
            .map_err(|e| Error::MissingContext(format!("unreadable event payload: {e}")))?;
        let pull_request = payload.pull_request.ok_or_else(|| {
            Error::MissingContext("the triggering event is not a pull request event".to_string())
        })?;

        let repo = Repo::parse(repository)
            .map_err(|e| Error::Config(format!("{REPOSITORY_VAR}: {e}")))?;

        if sha.trim().is_empty() {
            return Err(Error::Config(format!("{SHA_VAR} is empty")));
        }

        Ok(Self {
            pull: PullRequestRef::new(repo, pull_request.number),
            commit_id: sha.to_string(),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|e| Error::Config(format!("{name}: {e}")))
}
