//! Session state — everything one dialogue owns, as a single value.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::MoveHistory;
use crate::model::{Actor, Candidate, MoveKind, MoveSet, Rebuttal, StatementId};
use crate::path::DialoguePath;
use crate::quota::QuotaTracker;
use crate::rules::{self, RuleContext};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EndReason {
    /// One side accepted the other's position.
    Accepted { by: Actor },
    /// Both sides used all of their turns.
    TurnsExhausted,
    /// Ended from outside the dialogue.
    Abandoned,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted { by } => write!(f, "accepted by {}", by),
            Self::TurnsExhausted => write!(f, "turns exhausted"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Move whose target is still to be picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Challenge,
    Rebut,
}

impl TargetKind {
    pub fn move_kind(self) -> MoveKind {
        match self {
            Self::Challenge => MoveKind::Challenge,
            Self::Rebut => MoveKind::Rebuttal,
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Challenge => write!(f, "challenge"),
            Self::Rebut => write!(f, "rebut"),
        }
    }
}

/// Where the controller is in the move cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// The actor to move picks a move kind.
    AwaitingMove,
    /// A challenge or rebuttal was chosen; the target is still open.
    AwaitingMoveTarget { kind: TargetKind },
    /// A rebuttal target is chosen and its text is being written.
    ComposingRebuttal { target: StatementId },
    /// A challenge was issued; the other side picks justifications.
    AwaitingJustificationSelection {
        challenged: StatementId,
        candidates: Vec<Candidate>,
    },
    /// Terminal.
    Ended { reason: EndReason },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingMove => "awaiting a move",
            Self::AwaitingMoveTarget { .. } => "awaiting a target",
            Self::ComposingRebuttal { .. } => "composing a rebuttal",
            Self::AwaitingJustificationSelection { .. } => "awaiting justifications",
            Self::Ended { .. } => "ended",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended { .. })
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingMoveTarget { kind } => write!(f, "awaiting a {} target", kind),
            Self::ComposingRebuttal { target } => {
                write!(f, "composing a rebuttal to {}", target)
            }
            Self::AwaitingJustificationSelection { challenged, .. } => {
                write!(f, "awaiting justifications for {}", challenged)
            }
            Self::Ended { reason } => write!(f, "ended ({})", reason),
            Self::AwaitingMove => write!(f, "{}", self.name()),
        }
    }
}

/// The complete state of one dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub topic: String,
    pub phase: Phase,
    /// Actor to move.
    pub turn: Actor,
    /// Bumped on every committed turn change and when the session ends.
    pub generation: u64,
    pub path: DialoguePath,
    pub history: MoveHistory,
    pub quota: QuotaTracker,
    /// Statements that have been the target of a challenge.
    pub challenged: BTreeSet<StatementId>,
    /// Rebuttals per target, oldest first.
    pub rebuttals: BTreeMap<StatementId, Vec<Rebuttal>>,
}

impl SessionState {
    pub fn rule_context(&self) -> RuleContext<'_> {
        RuleContext::derive(
            self.turn,
            self.history.as_slice(),
            &self.challenged,
            self.path.len(),
        )
    }

    /// Move kinds offered to the actor to move; empty once ended.
    pub fn allowed_moves(&self) -> MoveSet {
        if self.is_ended() {
            return MoveSet::new();
        }
        rules::allowed_moves(&self.rule_context())
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.phase {
            Phase::Ended { reason } => Some(reason),
            _ => None,
        }
    }

    /// Statement currently under challenge, if any.
    pub fn challenged_pointer(&self) -> Option<StatementId> {
        match self.phase {
            Phase::AwaitingJustificationSelection { challenged, .. } => Some(challenged),
            _ => None,
        }
    }

    /// Rebuttal target currently open, if any.
    pub fn pending_rebuttal_target(&self) -> Option<StatementId> {
        match self.phase {
            Phase::ComposingRebuttal { target } => Some(target),
            _ => None,
        }
    }

    /// Rebuttals recorded against `target`.
    pub fn rebuttals_for(&self, target: StatementId) -> &[Rebuttal] {
        self.rebuttals
            .get(&target)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serializes_tagged() {
        let phase = Phase::Ended {
            reason: EndReason::Accepted {
                by: Actor::Opponent,
            },
        };
        let json = serde_json::to_value(&phase).unwrap();
        assert_eq!(json["phase"], "ended");
        assert_eq!(json["reason"]["reason"], "accepted");
        assert_eq!(json["reason"]["by"], "Opponent");
    }

    #[test]
    fn test_phase_display() {
        let phase = Phase::AwaitingMoveTarget {
            kind: TargetKind::Rebut,
        };
        assert_eq!(phase.to_string(), "awaiting a rebut target");
        assert_eq!(
            EndReason::Accepted {
                by: Actor::Proponent
            }
            .to_string(),
            "accepted by Proponent"
        );
    }
}
