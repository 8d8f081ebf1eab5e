//! Shift & Assignment Manager.
//!
//! Owns shift scheduling data, the client notes attached to each shift and
//! worker assignment state. `Shift::status` is a caller-controlled field:
//! this layer accepts any status change.

mod assignments;
mod shifts;

pub use shifts::{NewShift, NotesInput, ShiftManager, ShiftUpdate};
