//! Optimistic completion toggling for the tasks of a daily plan.

use std::collections::BTreeMap;

use crate::activity::{ActivityEntry, ActivityKind, ActivityLog};
use crate::backend::{TaskBackend, ToggleRequest};

/// Alert shown when the service did not confirm a toggle.
pub const SYNC_FAILED_ALERT: &str = "Sync failed, please check your network connection.";

/// Result of a single toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The service accepted the change; `completed` is the new state.
    Confirmed { completed: bool },
    /// The service did not confirm; the state was restored to `completed`
    /// and `alert` should be shown to the user.
    Reverted { completed: bool, alert: String },
    /// The index does not exist on this board; nothing was sent.
    Ignored,
}

/// Visual completion state of the known tasks of one plan, keyed by task
/// index. Indices need not be contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBoard {
    plan_id: u64,
    completed: BTreeMap<usize, bool>,
}

impl TaskBoard {
    /// A board holding every task of a plan, in index order.
    pub fn new(plan_id: u64, completed: Vec<bool>) -> Self {
        Self {
            plan_id,
            completed: completed.into_iter().enumerate().collect(),
        }
    }

    /// A board that knows only the task at `task_idx`.
    pub fn single(plan_id: u64, task_idx: usize, completed: bool) -> Self {
        Self {
            plan_id,
            completed: BTreeMap::from([(task_idx, completed)]),
        }
    }

    pub fn plan_id(&self) -> u64 {
        self.plan_id
    }

    pub fn is_completed(&self, task_idx: usize) -> Option<bool> {
        self.completed.get(&task_idx).copied()
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Flip a task immediately, then confirm with the service.
    ///
    /// Any non-success signal (refusal or transport failure) flips it back.
    /// No retry.
    pub fn toggle<B: TaskBackend + ?Sized>(
        &mut self,
        backend: &B,
        task_idx: usize,
        log: &ActivityLog,
    ) -> ToggleOutcome {
        let Some(state) = self.completed.get_mut(&task_idx) else {
            return ToggleOutcome::Ignored;
        };
        let before = *state;
        *state = !before;

        let request = ToggleRequest {
            plan_id: self.plan_id,
            task_idx,
        };
        let failure = match backend.toggle_task(&request) {
            Ok(reply) if reply.is_success() => None,
            Ok(reply) => Some(
                reply
                    .message
                    .unwrap_or_else(|| format!("status {}", reply.status)),
            ),
            Err(err) => Some(format!("{err:#}")),
        };

        let mut entry = ActivityEntry::new(
            ActivityKind::TaskToggle,
            if failure.is_some() { "reverted" } else { "confirmed" },
        );
        entry.plan_id = Some(self.plan_id);
        entry.task_idx = Some(task_idx);
        entry.detail = failure.clone();
        log.record(&entry);

        match failure {
            None => ToggleOutcome::Confirmed {
                completed: !before,
            },
            Some(_) => {
                self.completed.insert(task_idx, before);
                ToggleOutcome::Reverted {
                    completed: before,
                    alert: SYNC_FAILED_ALERT.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::backend::StatusReply;

    struct Fixed {
        reply: fn() -> anyhow::Result<StatusReply>,
        calls: Cell<usize>,
    }

    impl TaskBackend for Fixed {
        fn toggle_task(&self, _request: &ToggleRequest) -> anyhow::Result<StatusReply> {
            self.calls.set(self.calls.get() + 1);
            (self.reply)()
        }
    }

    fn backend(reply: fn() -> anyhow::Result<StatusReply>) -> Fixed {
        Fixed {
            reply,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn confirmed_toggle_keeps_new_state() {
        let backend = backend(|| Ok(StatusReply::success()));
        let mut board = TaskBoard::new(3, vec![false, true]);
        let outcome = board.toggle(&backend, 1, &ActivityLog::disabled());
        assert_eq!(outcome, ToggleOutcome::Confirmed { completed: false });
        assert_eq!(board.is_completed(1), Some(false));
    }

    #[test]
    fn refused_toggle_reverts() {
        let backend = backend(|| Ok(StatusReply::error(None)));
        let mut board = TaskBoard::new(3, vec![false]);
        let outcome = board.toggle(&backend, 0, &ActivityLog::disabled());
        assert!(matches!(outcome, ToggleOutcome::Reverted { completed: false, .. }));
        assert_eq!(board.is_completed(0), Some(false));
    }

    #[test]
    fn out_of_range_sends_nothing() {
        let backend = backend(|| Ok(StatusReply::success()));
        let mut board = TaskBoard::new(3, vec![false]);
        assert_eq!(
            board.toggle(&backend, 5, &ActivityLog::disabled()),
            ToggleOutcome::Ignored
        );
        assert_eq!(backend.calls.get(), 0);
    }

    #[test]
    fn single_task_board_handles_extreme_indices() {
        let backend = backend(|| Ok(StatusReply::success()));
        let mut board = TaskBoard::single(3, usize::MAX, true);
        assert_eq!(board.len(), 1);
        assert_eq!(board.is_completed(0), None);

        let outcome = board.toggle(&backend, usize::MAX, &ActivityLog::disabled());
        assert_eq!(outcome, ToggleOutcome::Confirmed { completed: false });
        assert_eq!(board.is_completed(usize::MAX), Some(false));
        assert_eq!(backend.calls.get(), 1);
    }
}
