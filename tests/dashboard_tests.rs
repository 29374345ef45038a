/// Dashboard tests: optimistic task toggling and goal saving, plus the
/// activity log and stats they feed.
use std::cell::RefCell;

use anyhow::{Result, anyhow};
use plancoach::activity::reporter::summarize;
use plancoach::activity::{ActivityKind, ActivityLog};
use plancoach::backend::{GoalBackend, GoalRequest, StatusReply, TaskBackend, ToggleRequest};
use plancoach::dashboard::tasks::SYNC_FAILED_ALERT;
use plancoach::dashboard::{TaskBoard, ToggleOutcome, save_goal};

/// Backend whose every answer is produced by the same closure.
struct Fake<F> {
    answer: F,
    toggles: RefCell<Vec<ToggleRequest>>,
    goals: RefCell<Vec<String>>,
}

impl<F: Fn() -> Result<StatusReply>> Fake<F> {
    fn new(answer: F) -> Self {
        Self {
            answer,
            toggles: RefCell::new(Vec::new()),
            goals: RefCell::new(Vec::new()),
        }
    }
}

impl<F: Fn() -> Result<StatusReply>> TaskBackend for Fake<F> {
    fn toggle_task(&self, request: &ToggleRequest) -> Result<StatusReply> {
        self.toggles.borrow_mut().push(*request);
        (self.answer)()
    }
}

impl<F: Fn() -> Result<StatusReply>> GoalBackend for Fake<F> {
    fn save_goal(&self, request: &GoalRequest) -> Result<StatusReply> {
        self.goals.borrow_mut().push(request.goal_type.clone());
        (self.answer)()
    }
}

fn temp_log() -> (tempfile::TempDir, ActivityLog) {
    let dir = tempfile::tempdir().unwrap();
    let log = ActivityLog::at(dir.path().join("activity.jsonl"));
    (dir, log)
}

// ---------------------------------------------------------------------------
// Task toggle
// ---------------------------------------------------------------------------

#[test]
fn confirmed_toggle_sends_one_request() {
    let backend = Fake::new(|| Ok(StatusReply::success()));
    let (_dir, log) = temp_log();
    let mut board = TaskBoard::new(7, vec![false, false, true]);

    let outcome = board.toggle(&backend, 0, &log);

    assert_eq!(outcome, ToggleOutcome::Confirmed { completed: true });
    assert_eq!(board.is_completed(0), Some(true));
    assert_eq!(
        backend.toggles.borrow().as_slice(),
        &[ToggleRequest {
            plan_id: 7,
            task_idx: 0
        }]
    );

    let entries = log.read_all();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ActivityKind::TaskToggle);
    assert_eq!(entries[0].outcome, "confirmed");
    assert_eq!(entries[0].plan_id, Some(7));
    assert_eq!(entries[0].task_idx, Some(0));
}

#[test]
fn transport_failure_restores_the_previous_state() {
    let backend = Fake::new(|| Err(anyhow!("connection reset")));
    let (_dir, log) = temp_log();
    let mut board = TaskBoard::new(7, vec![false, false, true]);

    let outcome = board.toggle(&backend, 2, &log);

    assert_eq!(
        outcome,
        ToggleOutcome::Reverted {
            completed: true,
            alert: SYNC_FAILED_ALERT.to_string(),
        }
    );
    assert_eq!(board.is_completed(2), Some(true));
    assert_eq!(log.read_all()[0].outcome, "reverted");
}

#[test]
fn business_refusal_restores_the_previous_state() {
    let backend = Fake::new(|| Ok(StatusReply::error(Some("plan not found"))));
    let (_dir, log) = temp_log();
    let mut board = TaskBoard::new(9, vec![true]);

    let outcome = board.toggle(&backend, 0, &log);

    assert!(matches!(outcome, ToggleOutcome::Reverted { completed: true, .. }));
    assert_eq!(board.is_completed(0), Some(true));
    assert_eq!(backend.toggles.borrow().len(), 1, "no retry");
    assert_eq!(log.read_all()[0].detail.as_deref(), Some("plan not found"));
}

#[test]
fn toggles_feed_the_stats_summary() {
    let ok = Fake::new(|| Ok(StatusReply::success()));
    let failing = Fake::new(|| Err(anyhow!("timed out")));
    let (_dir, log) = temp_log();
    let mut board = TaskBoard::new(1, vec![false; 3]);

    board.toggle(&ok, 0, &log);
    board.toggle(&ok, 1, &log);
    board.toggle(&failing, 2, &log);
    save_goal(&ok, "fat_loss", &log);

    let summary = summarize(&log.read_all());
    assert_eq!(summary.toggles_confirmed, 2);
    assert_eq!(summary.toggles_reverted, 1);
    assert_eq!(summary.goals_saved, 1);
    assert_eq!(summary.chat.total(), 0);
}

// ---------------------------------------------------------------------------
// Goal save
// ---------------------------------------------------------------------------

#[test]
fn goal_save_sends_trimmed_goal_type() {
    let backend = Fake::new(|| Ok(StatusReply::success()));
    let (_dir, log) = temp_log();

    assert!(save_goal(&backend, "  muscle_gain ", &log));
    assert_eq!(backend.goals.borrow().as_slice(), &["muscle_gain".to_string()]);

    let entries = log.read_all();
    assert_eq!(entries[0].outcome, "saved");
    assert_eq!(entries[0].detail.as_deref(), Some("muscle_gain"));
}

#[test]
fn goal_save_failure_is_only_logged() {
    let backend = Fake::new(|| Err(anyhow!("connection refused")));
    let (_dir, log) = temp_log();

    assert!(!save_goal(&backend, "keep_fit", &log));

    let entries = log.read_all();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ActivityKind::GoalSave);
    assert_eq!(entries[0].outcome, "failed");
    assert!(
        entries[0]
            .detail
            .as_deref()
            .is_some_and(|d| d.starts_with("keep_fit: "))
    );
}

#[test]
fn disabled_log_writes_nothing() {
    let backend = Fake::new(|| Ok(StatusReply::success()));
    let log = ActivityLog::disabled();
    let mut board = TaskBoard::new(1, vec![false]);

    board.toggle(&backend, 0, &log);
    save_goal(&backend, "keep_fit", &log);

    assert!(log.read_all().is_empty());
    assert_eq!(log.path(), None);
}
