//! Activity log: a JSONL record of chat turns, task toggles and goal saves,
//! plus the aggregation behind `plancoach stats`.
//!
//! Log file: `~/.plancoach/activity.jsonl` (disabled with
//! `logging.enabled = false` or `PLANCOACH_LOGGING=0`).

pub mod logger;
pub mod reporter;

pub use logger::{ActivityEntry, ActivityKind, ActivityLog};
