//! Chat session core: turns, the session transcript, the entry field and
//! the turn lifecycle that ties them to a backend and a renderer.

pub mod input;
pub mod session;
pub mod transcript;
pub mod turn;

pub use input::InputBox;
pub use session::{ChatSession, Outcome, PendingTurn, SessionOptions, TurnStatus};
pub use transcript::Transcript;
pub use turn::{Role, Turn};
