//! Dashboard collaborators: optimistic task toggling and goal saving.

pub mod goal;
pub mod tasks;

pub use goal::save_goal;
pub use tasks::{TaskBoard, ToggleOutcome};
