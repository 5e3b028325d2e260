//! Vertex editing: the undo/redo log and the session state machine.

mod history;
mod session;

pub use history::{Action, History};
pub use session::{EditSession, SessionState};
