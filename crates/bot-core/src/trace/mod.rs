//! Predicate trace of a mission: entity definitions, state atoms and
//! precondition / `!ACTION` / postcondition blocks, exported as plain text.

pub mod atom;
pub mod flags;
pub mod logger;

pub use atom::{Atom, NONE, StateTable};
pub use flags::TrackingFlags;
pub use logger::TraceLogger;
