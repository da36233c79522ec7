//! Session events and the FIFO queue they are serialized onto

use crate::core::{DisplayMode, TrackKind};
use crate::ingest::{ImportResult, PollOutcome, Row, StatusOutcome};
use crate::track::RetentionConfig;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;

/// Discrete occurrence the session reacts to
#[derive(Debug)]
pub enum SessionEvent {
    /// A live poll finished
    PollCompleted {
        outcome: PollOutcome,
        received_at: DateTime<Utc>,
    },
    /// A device status poll finished
    StatusCompleted(StatusOutcome),
    /// A file finished loading into rows, or failed to
    ImportCompleted(ImportResult<Vec<Row>>),
    SwitchView(TrackKind),
    SetMode(DisplayMode),
    SetRetention(RetentionConfig),
}

impl SessionEvent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SessionEvent::PollCompleted { .. } => "poll_completed",
            SessionEvent::StatusCompleted(_) => "status_completed",
            SessionEvent::ImportCompleted(_) => "import_completed",
            SessionEvent::SwitchView(_) => "switch_view",
            SessionEvent::SetMode(_) => "set_mode",
            SessionEvent::SetRetention(_) => "set_retention",
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// Event plus the time it was queued
#[derive(Debug)]
pub struct EventEnvelope {
    pub event: SessionEvent,
    pub arrived_at: DateTime<Utc>,
}

/// Unbounded FIFO of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<EventEnvelope>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SessionEvent) {
        self.pending.push_back(EventEnvelope {
            event,
            arrived_at: Utc::now(),
        });
    }

    pub fn pop(&mut self) -> Option<EventEnvelope> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
