//! Events published while a dialogue runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Actor, MoveKind, Statement, StatementId};
use crate::session::EndReason;

/// Everything observers can learn about a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueEvent {
    /// Root claim loaded, opponent to move.
    SessionStarted {
        session_id: Uuid,
        topic: String,
        root: StatementId,
        timestamp: DateTime<Utc>,
    },

    /// A move entered the history log.
    MoveAccepted {
        session_id: Uuid,
        actor: Actor,
        kind: MoveKind,
        content: String,
        generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// A statement was appended to the path.
    StatementAdded {
        session_id: Uuid,
        statement: Statement,
        timestamp: DateTime<Utc>,
    },

    /// A turn passed without a statement, explicitly or on timeout.
    TurnSkipped {
        session_id: Uuid,
        actor: Actor,
        timed_out: bool,
        timestamp: DateTime<Utc>,
    },

    /// The session reached its terminal state.
    SessionEnded {
        session_id: Uuid,
        reason: EndReason,
        timestamp: DateTime<Utc>,
    },
}

impl DialogueEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionStarted { timestamp, .. }
            | Self::MoveAccepted { timestamp, .. }
            | Self::StatementAdded { timestamp, .. }
            | Self::TurnSkipped { timestamp, .. }
            | Self::SessionEnded { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::MoveAccepted { .. } => "move_accepted",
            Self::StatementAdded { .. } => "statement_added",
            Self::TurnSkipped { .. } => "turn_skipped",
            Self::SessionEnded { .. } => "session_ended",
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            Self::SessionStarted { session_id, .. }
            | Self::MoveAccepted { session_id, .. }
            | Self::StatementAdded { session_id, .. }
            | Self::TurnSkipped { session_id, .. }
            | Self::SessionEnded { session_id, .. } => *session_id,
        }
    }
}

impl std::fmt::Display for DialogueEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionStarted { topic, root, .. } => {
                write!(f, "session started on '{}' (root {})", topic, root)
            }
            Self::MoveAccepted {
                actor,
                kind,
                content,
                ..
            } if content.is_empty() => write!(f, "{} {}", actor, kind),
            Self::MoveAccepted {
                actor,
                kind,
                content,
                ..
            } => write!(f, "{} {}: {}", actor, kind, content),
            Self::StatementAdded { statement, .. } => {
                write!(f, "statement {} added", statement.id)
            }
            Self::TurnSkipped {
                actor,
                timed_out: true,
                ..
            } => write!(f, "{} ran out of time; turn skipped", actor),
            Self::TurnSkipped { actor, .. } => write!(f, "{} skipped", actor),
            Self::SessionEnded { reason, .. } => write!(f, "session ended: {}", reason),
        }
    }
}
