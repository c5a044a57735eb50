//! Turn and move quotas per actor.
//!
//! Allowances are fixed at session start and never replenished. Checking
//! is separate from consuming so the controller can validate a whole move
//! before mutating anything.

use serde::{Deserialize, Serialize};

use crate::config::DialogueConfig;
use crate::model::{Actor, MoveKind};

/// Remaining allowance for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorQuota {
    pub turns_used: u32,
    pub challenges_remaining: u32,
    pub rebuttals_remaining: u32,
}

/// Per-actor counters plus the shared turn limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaTracker {
    max_turns: u32,
    proponent: ActorQuota,
    opponent: ActorQuota,
}

impl QuotaTracker {
    pub fn new(max_turns: u32, challenges: u32, rebuttals: u32) -> Self {
        let fresh = ActorQuota {
            turns_used: 0,
            challenges_remaining: challenges,
            rebuttals_remaining: rebuttals,
        };
        Self {
            max_turns,
            proponent: fresh,
            opponent: fresh,
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(config.max_turns, config.challenges, config.rebuttals)
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn get(&self, actor: Actor) -> &ActorQuota {
        match actor {
            Actor::Proponent => &self.proponent,
            Actor::Opponent => &self.opponent,
        }
    }

    fn get_mut(&mut self, actor: Actor) -> &mut ActorQuota {
        match actor {
            Actor::Proponent => &mut self.proponent,
            Actor::Opponent => &mut self.opponent,
        }
    }

    /// Remaining uses of `kind`; `None` for kinds without a quota.
    pub fn remaining(&self, actor: Actor, kind: MoveKind) -> Option<u32> {
        let quota = self.get(actor);
        match kind {
            MoveKind::Challenge => Some(quota.challenges_remaining),
            MoveKind::Rebuttal => Some(quota.rebuttals_remaining),
            MoveKind::Claim | MoveKind::Justify | MoveKind::Accept | MoveKind::Skip => None,
        }
    }

    /// Whether `actor` could make a move of `kind` without exceeding its quota.
    pub fn can_consume(&self, actor: Actor, kind: MoveKind) -> bool {
        self.remaining(actor, kind).map_or(true, |n| n > 0)
    }

    /// Spend one use of `kind`. Returns false, without mutating, if exhausted.
    pub fn consume(&mut self, actor: Actor, kind: MoveKind) -> bool {
        if !self.can_consume(actor, kind) {
            return false;
        }
        let quota = self.get_mut(actor);
        match kind {
            MoveKind::Challenge => quota.challenges_remaining -= 1,
            MoveKind::Rebuttal => quota.rebuttals_remaining -= 1,
            MoveKind::Claim | MoveKind::Justify | MoveKind::Accept | MoveKind::Skip => {}
        }
        true
    }

    pub fn turns_exhausted(&self, actor: Actor) -> bool {
        self.get(actor).turns_used >= self.max_turns
    }

    pub fn all_turns_exhausted(&self) -> bool {
        self.turns_exhausted(Actor::Proponent) && self.turns_exhausted(Actor::Opponent)
    }

    /// Count a completed turn. Returns false, without mutating, at the limit.
    pub fn use_turn(&mut self, actor: Actor) -> bool {
        if self.turns_exhausted(actor) {
            return false;
        }
        self.get_mut(actor).turns_used += 1;
        true
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}
