//! Decides whether a flag deployment may be approved without human review.
//!
//! Risk is measured per environment: a flag whose environments are all
//! unchanged, or changed only in allowed environments, carries no risk. The
//! flag's own top-level classification is not consulted.

use crate::{comparison::ComparisonDocument, types::AllowedEnvironments};

/// An affected environment outside the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingChange<'a> {
    pub flag: &'a str,
    pub environment: &'a str,
    pub change: &'a str,
}

/// Returns the first flag/environment pair that prevents auto approval.
pub fn find_blocking_change<'a>(
    doc: &'a ComparisonDocument,
    allowed: &AllowedEnvironments,
) -> Option<BlockingChange<'a>> {
    doc.flags.iter().find_map(|(flag, flag_change)| {
        flag_change
            .environments
            .iter()
            .find(|(environment, env_change)| {
                !env_change.is_unchanged() && !allowed.contains(environment)
            })
            .map(|(environment, env_change)| BlockingChange {
                flag,
                environment,
                change: &env_change.change,
            })
    })
}

pub fn can_auto_approve(doc: &ComparisonDocument, allowed: &AllowedEnvironments) -> bool {
    match find_blocking_change(doc, allowed) {
        Some(blocking) => {
            tracing::info!(
                flag = blocking.flag,
                change = blocking.change,
                "Cannot auto approve with changes to the '{}' environment.",
                blocking.environment
            );
            false
        }
        None => true,
    }
}
