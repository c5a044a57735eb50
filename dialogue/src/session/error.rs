//! Errors surfaced by the dialogue controller.
//!
//! No error is fatal: every rejection leaves the session exactly as it was
//! before the call, so the caller can correct the command or retry it.

use crate::model::{Actor, MoveKind, MoveSet, StatementId};
use crate::path::PathError;
use crate::store::StoreError;

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    #[error("{kind} is not permitted now (allowed: {})", format_moves(.allowed))]
    NotPermitted { kind: MoveKind, allowed: MoveSet },

    #[error("{actor} has no {kind} moves left")]
    QuotaExhausted { actor: Actor, kind: MoveKind },

    #[error("{0} has used all of its turns")]
    TurnsExhausted(Actor),

    #[error("statement {0} has already been challenged")]
    AlreadyChallenged(StatementId),

    #[error("statement {0} is your own")]
    OwnStatement(StatementId),

    #[error("statement {0} is not on the dialogue path")]
    UnknownStatement(StatementId),

    #[error("the root claim cannot be rebutted")]
    RootNotRebuttable,

    #[error("nothing to rebut yet")]
    NothingToRebut,

    #[error("a rebuttal against statement {0} is already pending")]
    TargetAlreadyPending(StatementId),

    #[error("no rebuttal target selected")]
    NoPendingTarget,

    #[error("select at least one justification, or skip")]
    EmptyJustification,

    #[error("statement {0} is not one of the offered justifications")]
    UnknownCandidate(StatementId),

    #[error("statement {0} is already on the dialogue path")]
    DuplicateStatement(StatementId),

    #[error("rebuttal text is empty")]
    EmptyRebuttal,

    #[error("cannot {command} while {phase}")]
    WrongPhase {
        command: &'static str,
        phase: &'static str,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}

fn format_moves(moves: &MoveSet) -> String {
    moves
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned by the dialogue controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogueError {
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("content store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("dialogue has ended")]
    SessionEnded,

    #[error("stale command for generation {expected} (session is at {current})")]
    Stale { expected: u64, current: u64 },
}

/// Coarse class of a [`DialogueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    IllegalMove,
    NotFound,
    StoreUnavailable,
    SessionEnded,
    Stale,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalMove => write!(f, "illegal_move"),
            Self::NotFound => write!(f, "not_found"),
            Self::StoreUnavailable => write!(f, "store_unavailable"),
            Self::SessionEnded => write!(f, "session_ended"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

impl DialogueError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IllegalMove(_) => ErrorCategory::IllegalMove,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::StoreUnavailable(_) => ErrorCategory::StoreUnavailable,
            Self::SessionEnded => ErrorCategory::SessionEnded,
            Self::Stale { .. } => ErrorCategory::Stale,
        }
    }

    /// Whether resubmitting the same command may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Stale { .. })
    }
}

impl From<StoreError> for DialogueError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Decode(msg) => Self::StoreUnavailable(format!("bad response: {}", msg)),
        }
    }
}

impl From<PathError> for DialogueError {
    fn from(err: PathError) -> Self {
        let illegal = match err {
            PathError::Duplicate(id) => IllegalMove::DuplicateStatement(id),
            PathError::UnknownParent { parent, .. } => IllegalMove::UnknownStatement(parent),
            other => IllegalMove::Path(other),
        };
        Self::IllegalMove(illegal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_retry() {
        let illegal: DialogueError = IllegalMove::EmptyRebuttal.into();
        assert_eq!(illegal.category(), ErrorCategory::IllegalMove);
        assert!(!illegal.is_retryable());

        let down: DialogueError = StoreError::Unavailable("timeout".into()).into();
        assert_eq!(down.category(), ErrorCategory::StoreUnavailable);
        assert!(down.is_retryable());

        let missing: DialogueError = StoreError::NotFound("argument 3".into()).into();
        assert_eq!(missing.category(), ErrorCategory::NotFound);
        assert!(!missing.is_retryable());

        assert!(DialogueError::Stale {
            expected: 1,
            current: 2
        }
        .is_retryable());
        assert!(!DialogueError::SessionEnded.is_retryable());
    }

    #[test]
    fn test_not_permitted_lists_allowed() {
        let err = IllegalMove::NotPermitted {
            kind: MoveKind::Skip,
            allowed: [MoveKind::Challenge, MoveKind::Accept].into_iter().collect(),
        };
        assert_eq!(
            err.to_string(),
            "skip is not permitted now (allowed: challenge, accept)"
        );
    }

    #[test]
    fn test_path_duplicate_maps_to_illegal_move() {
        let err: DialogueError = PathError::Duplicate(StatementId(4)).into();
        assert_eq!(
            err,
            DialogueError::IllegalMove(IllegalMove::DuplicateStatement(StatementId(4)))
        );
    }
}
