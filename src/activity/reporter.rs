//! Aggregation of activity log entries for `plancoach stats`.

use serde::Serialize;

use super::logger::{ActivityEntry, ActivityKind};

/// Chat turn outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatCounts {
    pub success: usize,
    pub business_error: usize,
    pub transport_error: usize,
    pub plan_updates: usize,
}

impl ChatCounts {
    pub fn total(&self) -> usize {
        self.success + self.business_error + self.transport_error
    }
}

/// Summary of everything recorded in the activity log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub chat: ChatCounts,
    /// Mean round-trip of chat requests that recorded a latency.
    pub avg_latency_ms: Option<u64>,
    pub toggles_confirmed: usize,
    pub toggles_reverted: usize,
    pub goals_saved: usize,
    pub goals_failed: usize,
}

impl Summary {
    /// Share of chat turns that succeeded, as a percentage.
    pub fn chat_success_pct(&self) -> f64 {
        let total = self.chat.total();
        if total == 0 {
            0.0
        } else {
            self.chat.success as f64 / total as f64 * 100.0
        }
    }
}

/// Build a [`Summary`] from log entries. Unknown outcomes are ignored.
pub fn summarize(entries: &[ActivityEntry]) -> Summary {
    let mut summary = Summary::default();
    let mut latency_total: u64 = 0;
    let mut latency_count: u64 = 0;

    for entry in entries {
        match (entry.kind, entry.outcome.as_str()) {
            (ActivityKind::Chat, outcome) => {
                match outcome {
                    "success" => summary.chat.success += 1,
                    "business_error" => summary.chat.business_error += 1,
                    "transport_error" => summary.chat.transport_error += 1,
                    _ => continue,
                }
                if entry.updated_plan == Some(true) {
                    summary.chat.plan_updates += 1;
                }
                if let Some(ms) = entry.latency_ms {
                    latency_total += ms;
                    latency_count += 1;
                }
            }
            (ActivityKind::TaskToggle, "confirmed") => summary.toggles_confirmed += 1,
            (ActivityKind::TaskToggle, "reverted") => summary.toggles_reverted += 1,
            (ActivityKind::GoalSave, "saved") => summary.goals_saved += 1,
            (ActivityKind::GoalSave, "failed") => summary.goals_failed += 1,
            _ => {}
        }
    }

    if latency_count > 0 {
        summary.avg_latency_ms = Some(latency_total / latency_count);
    }

    summary
}
