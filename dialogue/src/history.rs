//! Move history log — every accepted move, oldest first.

use serde::{Deserialize, Serialize};

use crate::model::{Actor, Move, MoveKind};

/// Append-only move log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveHistory {
    moves: Vec<Move>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move stamped now and return a reference to it.
    pub fn record(&mut self, actor: Actor, kind: MoveKind, content: impl Into<String>) -> &Move {
        self.moves.push(Move::now(actor, kind, content));
        &self.moves[self.moves.len() - 1]
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Moves made by one actor.
    pub fn by_actor(&self, actor: Actor) -> impl Iterator<Item = &Move> {
        self.moves.iter().filter(move |m| m.actor == actor)
    }

    /// Number of moves of `kind`, across both actors.
    pub fn count(&self, kind: MoveKind) -> usize {
        self.moves.iter().filter(|m| m.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order() {
        let mut history = MoveHistory::new();
        history.record(Actor::Proponent, MoveKind::Claim, "TV is harmful");
        history.record(Actor::Opponent, MoveKind::Challenge, "why?");

        assert_eq!(history.len(), 2);
        assert_eq!(history.as_slice()[0].kind, MoveKind::Claim);
        assert_eq!(history.last().unwrap().actor, Actor::Opponent);
        assert!(history.as_slice()[0].timestamp <= history.as_slice()[1].timestamp);
    }

    #[test]
    fn test_filters() {
        let mut history = MoveHistory::new();
        history.record(Actor::Proponent, MoveKind::Claim, "c");
        history.record(Actor::Opponent, MoveKind::Skip, "");
        history.record(Actor::Proponent, MoveKind::Skip, "");

        assert_eq!(history.by_actor(Actor::Proponent).count(), 2);
        assert_eq!(history.count(MoveKind::Skip), 2);
        assert_eq!(history.count(MoveKind::Accept), 0);
    }
}
