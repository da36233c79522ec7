//! Session coordination: the track manager and its event queue

pub mod events;
pub mod session;

pub use events::{EventEnvelope, EventQueue, SessionEvent};
pub use session::{ImportReport, TrackManager};
