//! Move legality rules.
//!
//! A pure function of the dialogue context: no counters, no caching, no I/O.
//! The first matching rule wins:
//!
//! ```text
//! 1. opponent's first reply to the root claim  → {challenge, accept}
//! 2. a justification awaits a response         → {challenge, rebuttal, accept}
//! 3. proponent facing an opponent rebuttal     → {accept, challenge}
//! 4. otherwise                                 → {challenge, rebuttal, accept, skip}
//! ```
//!
//! Duplicate challenges and a second open rebuttal target are not rules
//! here; the controller guards them when a target is chosen.

use std::collections::BTreeSet;

use crate::model::{Actor, Move, MoveKind, MoveSet, StatementId};

/// Inputs the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Whose turn it is.
    pub turn: Actor,
    /// Accepted moves, oldest first.
    pub history: &'a [Move],
    /// Statements already challenged.
    pub challenged: &'a BTreeSet<StatementId>,
    /// Opponent to move and only the root claim on the path.
    pub is_initial_opponent_turn: bool,
    /// See [`has_pending_justification_response`].
    pub has_pending_justification_response: bool,
}

impl<'a> RuleContext<'a> {
    /// Derive the context from the raw session facts.
    pub fn derive(
        turn: Actor,
        history: &'a [Move],
        challenged: &'a BTreeSet<StatementId>,
        path_len: usize,
    ) -> Self {
        Self {
            turn,
            history,
            challenged,
            is_initial_opponent_turn: turn == Actor::Opponent && path_len == 1,
            has_pending_justification_response: has_pending_justification_response(history, turn),
        }
    }
}

/// True when the last two moves are a challenge followed by a justification
/// from the other side, and the justifier is not the actor now to move.
///
/// Only the final two history entries are inspected, and the comparison is
/// against the actor whose turn it currently is. The result therefore depends
/// on the turn having flipped after the justification was logged, which the
/// controller guarantees by committing both in one step.
pub fn has_pending_justification_response(history: &[Move], turn: Actor) -> bool {
    let [.., challenge, justify] = history else {
        return false;
    };

    challenge.kind == MoveKind::Challenge
        && justify.kind == MoveKind::Justify
        && challenge.actor != justify.actor
        && justify.actor != turn
}

/// Move kinds currently offered to the actor to move.
pub fn allowed_moves(ctx: &RuleContext<'_>) -> MoveSet {
    use MoveKind::*;

    // Rule 1
    if ctx.is_initial_opponent_turn {
        return [Challenge, Accept].into_iter().collect();
    }

    // Rule 2
    if ctx.has_pending_justification_response {
        return [Challenge, Rebuttal, Accept].into_iter().collect();
    }

    // Rule 3
    if let Some(last) = ctx.history.last() {
        if ctx.turn == Actor::Proponent
            && last.kind == Rebuttal
            && last.actor == Actor::Opponent
        {
            return [Accept, Challenge].into_iter().collect();
        }
    }

    [Challenge, Rebuttal, Accept, Skip].into_iter().collect()
}
