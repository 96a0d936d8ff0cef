//! Chat sessions: turns, the per-session log, and the store of live sessions.

mod input;
mod session;
mod store;
mod turn;

pub use input::{Input, MAX_QUESTION_BYTES, parse_input};
pub use session::{ChatSession, PendingTurn, SessionState, TurnOutcome, TurnStart};
pub use store::{SessionEntry, SessionHandle, SessionId, SessionLimits, SessionStore};
pub use turn::{ChatTurn, Role, SessionLog};
