use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Activity log entry (JSONL)
// ---------------------------------------------------------------------------

/// What kind of interaction an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Chat,
    TaskToggle,
    GoalSave,
}

/// A single line of `~/.plancoach/activity.jsonl`.
///
/// `outcome` is one of `success`, `business_error`, `transport_error` for
/// chat turns, `confirmed` / `reverted` for task toggles and `saved` /
/// `failed` for goal saves. The optional fields are only set for the kinds
/// they describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub kind: ActivityKind,
    pub outcome: String,
    /// Number of history turns sent with a chat message.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub history_len: Option<usize>,
    /// Round-trip time of a chat request in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latency_ms: Option<u64>,
    /// Whether the service reported a persisted plan change.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_plan: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub plan_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub task_idx: Option<usize>,
    /// Error text or goal type, depending on the kind.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl ActivityEntry {
    /// A bare entry stamped with the current time.
    pub fn new(kind: ActivityKind, outcome: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind,
            outcome: outcome.to_string(),
            history_len: None,
            latency_ms: None,
            updated_plan: None,
            plan_id: None,
            task_idx: None,
            detail: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Best-effort JSONL activity log.
///
/// Writing never fails the caller: I/O errors are dropped. A disabled log
/// (no path) silently discards entries and reads back nothing.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    path: Option<PathBuf>,
}

impl ActivityLog {
    /// The default log location, or a disabled log when logging is off.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if config.enabled {
            Self {
                path: default_log_path(),
            }
        } else {
            Self::disabled()
        }
    }

    /// A log writing to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, entry: &ActivityEntry) {
        let _ = self.append(entry);
    }

    fn append(&self, entry: &ActivityEntry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every entry back, skipping malformed lines.
    pub fn read_all(&self) -> Vec<ActivityEntry> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
            .collect()
    }

    /// Entries from the last `days` days, or all of them for `None`.
    pub fn read_since_days(&self, days: Option<u32>) -> Vec<ActivityEntry> {
        let entries = self.read_all();
        let Some(days) = days else {
            return entries;
        };

        let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
        entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect()
    }
}

/// `~/.plancoach/activity.jsonl`
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".plancoach").join("activity.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_round_trip_and_skip_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::at(dir.path().join("nested").join("activity.jsonl"));

        let mut entry = ActivityEntry::new(ActivityKind::Chat, "success");
        entry.history_len = Some(3);
        log.record(&entry);
        fs::OpenOptions::new()
            .append(true)
            .open(log.path().unwrap())
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();
        log.record(&ActivityEntry::new(ActivityKind::GoalSave, "failed"));

        let entries = log.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, ActivityKind::Chat);
        assert_eq!(entries[0].history_len, Some(3));
        assert_eq!(entries[1].outcome, "failed");
    }

    #[test]
    fn disabled_log_discards_entries() {
        let log = ActivityLog::disabled();
        log.record(&ActivityEntry::new(ActivityKind::Chat, "success"));
        assert!(log.read_all().is_empty());
        assert!(log.path().is_none());
    }

    #[test]
    fn day_filter_drops_old_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::at(dir.path().join("activity.jsonl"));

        let mut old = ActivityEntry::new(ActivityKind::TaskToggle, "confirmed");
        old.timestamp = "2000-01-01T00:00:00+00:00".to_string();
        log.record(&old);
        log.record(&ActivityEntry::new(ActivityKind::TaskToggle, "reverted"));

        let recent = log.read_since_days(Some(7));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].outcome, "reverted");
        assert_eq!(log.read_since_days(None).len(), 2);
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_string(&ActivityEntry::new(ActivityKind::GoalSave, "saved")).unwrap();
        assert!(json.contains(r#""kind":"goal_save""#));
        assert!(!json.contains("latency_ms"));
    }
}
