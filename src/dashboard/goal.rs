//! Fire-and-forget persistence of the user's health goal.

use crate::activity::{ActivityEntry, ActivityKind, ActivityLog};
use crate::backend::{GoalBackend, GoalRequest};

/// Ask the service to store `goal_type`.
///
/// Failures are written to the activity log and otherwise swallowed: the
/// user is never interrupted and no chat state is touched. Returns whether
/// the service confirmed, for callers that care; blank goal types are
/// skipped and report `false`.
pub fn save_goal<B: GoalBackend + ?Sized>(backend: &B, goal_type: &str, log: &ActivityLog) -> bool {
    let goal_type = goal_type.trim();
    if goal_type.is_empty() {
        return false;
    }

    let request = GoalRequest {
        goal_type: goal_type.to_string(),
    };
    let failure = match backend.save_goal(&request) {
        Ok(reply) if reply.is_success() => None,
        Ok(reply) => Some(reply.message.unwrap_or(reply.status)),
        Err(err) => Some(format!("{err:#}")),
    };

    let mut entry = ActivityEntry::new(
        ActivityKind::GoalSave,
        if failure.is_some() { "failed" } else { "saved" },
    );
    entry.detail = Some(match &failure {
        Some(reason) => format!("{goal_type}: {reason}"),
        None => goal_type.to_string(),
    });
    log.record(&entry);

    failure.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StatusReply;

    struct Refusing;

    impl GoalBackend for Refusing {
        fn save_goal(&self, _request: &GoalRequest) -> anyhow::Result<StatusReply> {
            Ok(StatusReply::error(Some("not logged in")))
        }
    }

    #[test]
    fn refusal_is_logged_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::at(dir.path().join("activity.jsonl"));

        assert!(!save_goal(&Refusing, "weight_loss", &log));

        let entries = log.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ActivityKind::GoalSave);
        assert_eq!(entries[0].outcome, "failed");
        assert_eq!(entries[0].detail.as_deref(), Some("weight_loss: not logged in"));
    }

    #[test]
    fn blank_goal_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::at(dir.path().join("activity.jsonl"));
        assert!(!save_goal(&Refusing, "   ", &log));
        assert!(log.read_all().is_empty());
    }
}
