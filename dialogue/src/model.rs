//! Dialogue data model — actors, move kinds, statements, and store records.
//!
//! Everything here is a closed type: a move or statement is one of a fixed
//! set of variants, so every transition in the controller matches
//! exhaustively instead of probing optional fields.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two dialogue participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Actor {
    /// Defends the root claim.
    Proponent,
    /// Challenges the root claim.
    Opponent,
}

impl Actor {
    /// The opposite participant.
    pub fn other(self) -> Self {
        match self {
            Self::Proponent => Self::Opponent,
            Self::Opponent => Self::Proponent,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proponent => write!(f, "Proponent"),
            Self::Opponent => write!(f, "Opponent"),
        }
    }
}

/// Kind of a logged move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoveKind {
    Claim,
    Challenge,
    Justify,
    Rebuttal,
    Accept,
    Skip,
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claim => write!(f, "claim"),
            Self::Challenge => write!(f, "challenge"),
            Self::Justify => write!(f, "justify"),
            Self::Rebuttal => write!(f, "rebuttal"),
            Self::Accept => write!(f, "accept"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Ordered set of move kinds, as returned by the legality rules.
pub type MoveSet = BTreeSet<MoveKind>;

/// Kind of a statement recorded in the dialogue path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Claim,
    Challenge,
    Justify,
    Rebuttal,
    Accept,
}

/// Identifier of a statement (claim, premise, or rebuttal) in the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementId(pub i64);

impl std::fmt::Display for StatementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an argument container (a claim plus its premises).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentId(pub i64);

impl std::fmt::Display for ArgumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the dialogue tree. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    pub text: String,
    /// `None` only for the root claim.
    pub parent_id: Option<StatementId>,
    pub stance: Actor,
    pub kind: StatementKind,
    pub is_rebuttal: bool,
    /// Citation name, when the store supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Statement {
    /// The opening claim of a topic, defended by the Proponent.
    pub fn root(claim: &RootClaim) -> Self {
        Self {
            id: claim.id,
            text: claim.text.clone(),
            parent_id: None,
            stance: Actor::Proponent,
            kind: StatementKind::Claim,
            is_rebuttal: false,
            source: claim.source.clone(),
        }
    }

    /// A justification chosen in answer to a challenge on `parent`.
    pub fn justification(candidate: &Candidate, parent: StatementId, stance: Actor) -> Self {
        Self {
            id: candidate.id,
            text: candidate.text.clone(),
            parent_id: Some(parent),
            stance,
            kind: StatementKind::Claim,
            is_rebuttal: false,
            source: candidate.source.clone(),
        }
    }

    /// A rebuttal persisted by the sink, attached under `target`.
    pub fn rebuttal(rebuttal: &Rebuttal, target: StatementId, stance: Actor) -> Self {
        Self {
            id: rebuttal.id,
            text: rebuttal.text.clone(),
            parent_id: Some(target),
            stance,
            kind: StatementKind::Rebuttal,
            is_rebuttal: true,
            source: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// One accepted move in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub actor: Actor,
    pub kind: MoveKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Move {
    /// Build a move stamped with the current time.
    pub fn now(actor: Actor, kind: MoveKind, content: impl Into<String>) -> Self {
        Self {
            actor,
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A debate topic listed by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub topic: String,
}

/// The root claim the store holds for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootClaim {
    pub id: StatementId,
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// A justification the store offers for a challenged statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: StatementId,
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Node of the topic-wide justification tree used for root-claim challenges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JustificationNode {
    pub id: StatementId,
    pub text: String,
    #[serde(default)]
    pub children: Vec<JustificationNode>,
}

impl JustificationNode {
    /// Descendants in depth-first pre-order, excluding this node.
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut stack: Vec<&JustificationNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(Candidate {
                id: node.id,
                text: node.text.clone(),
                source: None,
            });
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// A persisted rebuttal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rebuttal {
    pub id: StatementId,
    #[serde(alias = "targetClaimId")]
    pub target_id: StatementId,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Payload handed to the rebuttal sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRebuttal {
    pub target_claim_id: StatementId,
    pub text: String,
    pub author: String,
}
