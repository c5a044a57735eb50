//! Commands the controller accepts and the outcomes it reports.

use serde::{Deserialize, Serialize};

use super::state::{EndReason, TargetKind};
use crate::model::{Actor, Candidate, MoveKind, Rebuttal, Statement, StatementId};

/// A move submitted on behalf of the actor whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Accept,
    Skip,
    /// Challenge `target`, or arm a challenge and pick the target later.
    Challenge { target: Option<StatementId> },
    /// Open a rebuttal against `target`, or arm one and pick the target later.
    Rebut { target: Option<StatementId> },
    /// Complete an armed challenge or rebuttal.
    SelectTarget { target: StatementId },
    /// Answer the open challenge with one or more offered justifications.
    Justify { selection: Vec<StatementId> },
    /// Send the text of the pending rebuttal.
    SubmitRebuttal { text: String },
}

impl Command {
    /// Short verb used in error messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Skip => "skip",
            Self::Challenge { .. } => "challenge",
            Self::Rebut { .. } => "rebut",
            Self::SelectTarget { .. } => "select a target",
            Self::Justify { .. } => "justify",
            Self::SubmitRebuttal { .. } => "submit a rebuttal",
        }
    }

    /// Move kind checked against the legality rules. `SelectTarget` takes
    /// the kind of whatever was armed, so it has none of its own.
    pub fn move_kind(&self) -> Option<MoveKind> {
        match self {
            Self::Accept => Some(MoveKind::Accept),
            Self::Skip => Some(MoveKind::Skip),
            Self::Challenge { .. } => Some(MoveKind::Challenge),
            Self::Rebut { .. } | Self::SubmitRebuttal { .. } => Some(MoveKind::Rebuttal),
            Self::Justify { .. } => Some(MoveKind::Justify),
            Self::SelectTarget { .. } => None,
        }
    }
}

/// What an accepted command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Move kind chosen; waiting for a target.
    Armed { kind: TargetKind },
    /// Challenge issued; the other side now picks from `candidates`.
    ChallengeOpened {
        target: StatementId,
        candidates: Vec<Candidate>,
    },
    /// Rebuttal target chosen; `existing` are the rebuttals already on record.
    RebuttalTargetSelected {
        target: StatementId,
        existing: Vec<Rebuttal>,
    },
    /// Justifications appended to the path.
    Justified { added: Vec<Statement> },
    /// Rebuttal persisted and appended to the path.
    Rebutted { rebuttal: Rebuttal },
    /// Turn passed without a statement.
    Skipped { actor: Actor, timed_out: bool },
    Ended { reason: EndReason },
}

impl Outcome {
    /// Whether the turn passed to the other side.
    pub fn flips_turn(&self) -> bool {
        matches!(
            self,
            Self::ChallengeOpened { .. }
                | Self::Justified { .. }
                | Self::Rebutted { .. }
                | Self::Skipped { .. }
        )
    }
}
