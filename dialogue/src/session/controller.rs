//! Dialogue controller — validates moves, fetches content, commits state.
//!
//! Every command follows the same shape:
//!
//! ```text
//! ended? → turns left? → phase + rules + quota checks → store I/O → commit
//! ```
//!
//! Nothing is mutated until the store calls a move depends on have returned.
//! A rejected command or a failed fetch leaves the session untouched, so the
//! same command can be retried.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::command::{Command, Outcome};
use super::error::{DialogueError, IllegalMove};
use super::state::{EndReason, Phase, SessionState, TargetKind};
use crate::config::DialogueConfig;
use crate::events::{DialogueEvent, SharedEventBus};
use crate::history::MoveHistory;
use crate::model::{
    Actor, Candidate, MoveKind, MoveSet, NewRebuttal, Rebuttal, Statement, StatementId,
};
use crate::path::DialoguePath;
use crate::quota::QuotaTracker;
use crate::store::{ContentStore, RebuttalSink};
use crate::timer::TurnTimer;

type Result<T> = std::result::Result<T, DialogueError>;

/// Runs one dialogue session.
pub struct DialogueController {
    state: SessionState,
    timer: TurnTimer,
    store: Arc<dyn ContentStore>,
    sink: Arc<dyn RebuttalSink>,
    events: Option<SharedEventBus>,
}

impl DialogueController {
    /// Load the root claim of `topic` and open the session.
    ///
    /// The opening claim is logged for the Proponent, the Opponent moves
    /// first and the turn timer starts.
    pub async fn start(
        topic: &str,
        store: Arc<dyn ContentStore>,
        sink: Arc<dyn RebuttalSink>,
        config: &DialogueConfig,
    ) -> Result<Self> {
        Self::start_with_events(topic, store, sink, config, None).await
    }

    pub async fn start_with_events(
        topic: &str,
        store: Arc<dyn ContentStore>,
        sink: Arc<dyn RebuttalSink>,
        config: &DialogueConfig,
        events: Option<SharedEventBus>,
    ) -> Result<Self> {
        let claim = store
            .root_claim(topic)
            .await
            .map_err(|e| {
                warn!(topic, error = %e, "Failed to load root claim");
                DialogueError::from(e)
            })?
            .ok_or_else(|| DialogueError::NotFound(format!("no root claim for topic '{}'", topic)))?;

        let root = Statement::root(&claim);
        let path = DialoguePath::with_root(root.clone())?;
        let mut history = MoveHistory::new();
        history.record(Actor::Proponent, MoveKind::Claim, claim.text.clone());

        let state = SessionState {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            phase: Phase::AwaitingMove,
            turn: Actor::Opponent,
            generation: 0,
            path,
            history,
            quota: QuotaTracker::from_config(config),
            challenged: Default::default(),
            rebuttals: Default::default(),
        };

        let mut timer = TurnTimer::new(config.turn_timeout());
        timer.restart(state.generation, Instant::now());

        let controller = Self {
            state,
            timer,
            store,
            sink,
            events,
        };

        info!(
            session_id = %controller.state.id,
            topic,
            root = %claim.id,
            "Dialogue started"
        );
        controller.publish(DialogueEvent::SessionStarted {
            session_id: controller.state.id,
            topic: topic.to_string(),
            root: claim.id,
            timestamp: Utc::now(),
        });
        controller.publish_last_move();
        controller.publish_statement(&root);

        Ok(controller)
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn turn(&self) -> Actor {
        self.state.turn
    }

    pub fn phase(&self) -> &Phase {
        &self.state.phase
    }

    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    pub fn allowed_moves(&self) -> MoveSet {
        let allowed = self.state.allowed_moves();
        debug!(turn = %self.state.turn, ?allowed, "Evaluated move rules");
        allowed
    }

    /// Time left in the current turn.
    pub fn time_remaining(&self) -> Option<std::time::Duration> {
        self.timer.remaining(Instant::now())
    }

    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    // ── Commands ───────────────────────────────────────────────────────

    /// Apply `command` only if the session is still at `expected` generation.
    pub async fn apply_at(&mut self, expected: u64, command: Command) -> Result<Outcome> {
        if self.is_ended() {
            return Err(DialogueError::SessionEnded);
        }
        if expected != self.state.generation {
            debug!(
                expected,
                current = self.state.generation,
                command = command.name(),
                "Discarding stale command"
            );
            return Err(DialogueError::Stale {
                expected,
                current: self.state.generation,
            });
        }
        self.apply(command).await
    }

    /// Apply a command for the actor whose turn it is.
    pub async fn apply(&mut self, command: Command) -> Result<Outcome> {
        let result = self.dispatch(command.clone()).await;
        if let Err(ref e) = result {
            debug!(
                session_id = %self.state.id,
                actor = %self.state.turn,
                command = command.name(),
                error = %e,
                "Command rejected"
            );
        }
        result
    }

    async fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        if self.is_ended() {
            return Err(DialogueError::SessionEnded);
        }
        let actor = self.state.turn;
        if self.state.quota.turns_exhausted(actor) {
            return Err(IllegalMove::TurnsExhausted(actor).into());
        }

        match (self.state.phase.clone(), command) {
            (Phase::Ended { .. }, _) => Err(DialogueError::SessionEnded),

            (_, Command::Accept) => {
                self.ensure_allowed(MoveKind::Accept)?;
                Ok(self.accept(actor))
            }

            (Phase::AwaitingJustificationSelection { challenged, candidates }, cmd) => match cmd {
                Command::Justify { selection } => {
                    self.justify(actor, challenged, &candidates, &selection)
                }
                Command::Skip => {
                    self.ensure_allowed(MoveKind::Skip)?;
                    Ok(self.skip(actor, false))
                }
                other => Err(self.wrong_phase(&other)),
            },

            (_, Command::Skip) => {
                self.ensure_allowed(MoveKind::Skip)?;
                Ok(self.skip(actor, false))
            }

            (_, cmd @ Command::Justify { .. }) => Err(self.wrong_phase(&cmd)),

            (Phase::ComposingRebuttal { target }, Command::SubmitRebuttal { text }) => {
                self.ensure_allowed(MoveKind::Rebuttal)?;
                self.ensure_quota(actor, MoveKind::Rebuttal)?;
                self.submit_rebuttal(actor, target, &text).await
            }

            (Phase::ComposingRebuttal { target }, _) => {
                Err(IllegalMove::TargetAlreadyPending(target).into())
            }

            (_, Command::SubmitRebuttal { .. }) => Err(IllegalMove::NoPendingTarget.into()),

            (Phase::AwaitingMoveTarget { kind }, Command::SelectTarget { target }) => {
                self.ensure_allowed(kind.move_kind())?;
                self.ensure_quota(actor, kind.move_kind())?;
                match kind {
                    TargetKind::Challenge => self.challenge(actor, target).await,
                    TargetKind::Rebut => self.select_rebuttal_target(target).await,
                }
            }

            (_, cmd @ Command::SelectTarget { .. }) => Err(self.wrong_phase(&cmd)),

            (_, Command::Challenge { target }) => {
                self.ensure_allowed(MoveKind::Challenge)?;
                self.ensure_quota(actor, MoveKind::Challenge)?;
                match target {
                    Some(target) => self.challenge(actor, target).await,
                    None => Ok(self.arm(TargetKind::Challenge)),
                }
            }

            (_, Command::Rebut { target }) => {
                self.ensure_allowed(MoveKind::Rebuttal)?;
                self.ensure_quota(actor, MoveKind::Rebuttal)?;
                if self.state.path.len() <= 1 {
                    return Err(IllegalMove::NothingToRebut.into());
                }
                match target {
                    Some(target) => self.select_rebuttal_target(target).await,
                    None => Ok(self.arm(TargetKind::Rebut)),
                }
            }
        }
    }

    /// End the session from outside. No-op if it has already ended.
    pub fn abandon(&mut self) -> Option<Outcome> {
        if self.is_ended() {
            return None;
        }
        Some(self.end(EndReason::Abandoned))
    }

    /// Drive the turn timer. Skips the current turn if its countdown expired.
    ///
    /// An expiry armed for an earlier generation is discarded.
    pub fn tick(&mut self, now: Instant) -> Option<Outcome> {
        if self.is_ended() {
            return None;
        }
        let fired = self.timer.poll(now)?;
        if fired != self.state.generation {
            debug!(
                fired,
                current = self.state.generation,
                "Ignoring expiry from an earlier turn"
            );
            return None;
        }

        let actor = self.state.turn;
        info!(session_id = %self.state.id, actor = %actor, "Turn timed out");
        Some(self.skip(actor, true))
    }

    // ── Checks ─────────────────────────────────────────────────────────

    fn ensure_allowed(&self, kind: MoveKind) -> Result<()> {
        let allowed = self.allowed_moves();
        if allowed.contains(&kind) {
            Ok(())
        } else {
            Err(IllegalMove::NotPermitted { kind, allowed }.into())
        }
    }

    fn ensure_quota(&self, actor: Actor, kind: MoveKind) -> Result<()> {
        if self.state.quota.can_consume(actor, kind) {
            Ok(())
        } else {
            Err(IllegalMove::QuotaExhausted { actor, kind }.into())
        }
    }

    fn wrong_phase(&self, command: &Command) -> DialogueError {
        IllegalMove::WrongPhase {
            command: command.name(),
            phase: self.state.phase.name(),
        }
        .into()
    }

    fn statement(&self, id: StatementId) -> Result<&Statement> {
        self.state
            .path
            .get(id)
            .ok_or_else(|| IllegalMove::UnknownStatement(id).into())
    }

    // ── Transitions ────────────────────────────────────────────────────

    fn arm(&mut self, kind: TargetKind) -> Outcome {
        debug!(actor = %self.state.turn, %kind, "Awaiting target");
        self.state.phase = Phase::AwaitingMoveTarget { kind };
        Outcome::Armed { kind }
    }

    fn accept(&mut self, actor: Actor) -> Outcome {
        self.state
            .history
            .record(actor, MoveKind::Accept, "");
        self.publish_last_move();
        self.end(EndReason::Accepted { by: actor })
    }

    fn skip(&mut self, actor: Actor, timed_out: bool) -> Outcome {
        let content = if timed_out { "turn timed out" } else { "" };
        self.state.history.record(actor, MoveKind::Skip, content);
        self.state.quota.use_turn(actor);
        self.state.phase = Phase::AwaitingMove;
        self.publish_last_move();
        self.publish(DialogueEvent::TurnSkipped {
            session_id: self.state.id,
            actor,
            timed_out,
            timestamp: Utc::now(),
        });
        self.pass_turn();
        Outcome::Skipped { actor, timed_out }
    }

    async fn challenge(&mut self, actor: Actor, target: StatementId) -> Result<Outcome> {
        if self.state.challenged.contains(&target) {
            return Err(IllegalMove::AlreadyChallenged(target).into());
        }
        let statement = self.statement(target)?;
        if statement.stance == actor {
            return Err(IllegalMove::OwnStatement(target).into());
        }
        let content = statement.text.clone();

        let candidates = if statement.is_root() {
            self.root_candidates().await?
        } else {
            self.claim_candidates(target).await?
        };
        let candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| !self.state.path.contains(c.id))
            .collect();
        if candidates.is_empty() {
            return Err(DialogueError::NotFound(format!(
                "no justifications offered for statement {}",
                target
            )));
        }

        // Commit.
        self.state.quota.consume(actor, MoveKind::Challenge);
        self.state.challenged.insert(target);
        self.state
            .history
            .record(actor, MoveKind::Challenge, content);
        self.state.quota.use_turn(actor);
        self.state.phase = Phase::AwaitingJustificationSelection {
            challenged: target,
            candidates: candidates.clone(),
        };
        info!(
            session_id = %self.state.id,
            actor = %actor,
            target = %target,
            candidates = candidates.len(),
            "Challenge accepted"
        );
        self.publish_last_move();
        self.pass_turn();

        Ok(Outcome::ChallengeOpened { target, candidates })
    }

    async fn root_candidates(&self) -> Result<Vec<Candidate>> {
        let tree = self
            .store
            .justification_tree(&self.state.topic)
            .await
            .map_err(|e| self.store_failure("justification tree", e))?;
        Ok(tree.candidates())
    }

    async fn claim_candidates(&self, claim: StatementId) -> Result<Vec<Candidate>> {
        let argument = self
            .store
            .argument_for_claim(claim)
            .await
            .map_err(|e| self.store_failure("argument lookup", e))?
            .ok_or_else(|| {
                DialogueError::NotFound(format!("no argument backs statement {}", claim))
            })?;

        self.store
            .justifications(argument)
            .await
            .map_err(|e| self.store_failure("justifications", e))
    }

    fn justify(
        &mut self,
        actor: Actor,
        challenged: StatementId,
        candidates: &[Candidate],
        selection: &[StatementId],
    ) -> Result<Outcome> {
        if selection.is_empty() {
            return Err(IllegalMove::EmptyJustification.into());
        }

        let mut added = Vec::with_capacity(selection.len());
        for id in selection {
            let candidate = candidates
                .iter()
                .find(|c| c.id == *id)
                .ok_or(IllegalMove::UnknownCandidate(*id))?;
            added.push(Statement::justification(candidate, challenged, actor));
        }
        self.state.path.check_append(&added)?;

        // Commit.
        let summary = added
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        self.state.path.extend(added.clone())?;
        self.state
            .history
            .record(actor, MoveKind::Justify, summary);
        self.state.quota.use_turn(actor);
        self.state.phase = Phase::AwaitingMove;
        info!(
            session_id = %self.state.id,
            actor = %actor,
            challenged = %challenged,
            added = added.len(),
            "Justification accepted"
        );
        self.publish_last_move();
        for statement in &added {
            self.publish_statement(statement);
        }
        self.pass_turn();

        Ok(Outcome::Justified { added })
    }

    async fn select_rebuttal_target(&mut self, target: StatementId) -> Result<Outcome> {
        if self.state.path.len() <= 1 {
            return Err(IllegalMove::NothingToRebut.into());
        }
        if self.statement(target)?.is_root() {
            return Err(IllegalMove::RootNotRebuttable.into());
        }

        let fetched = self
            .store
            .rebuttals_for(target)
            .await
            .map_err(|e| self.store_failure("rebuttal history", e))?;

        // Commit. Keep locally accepted rebuttals the store has not caught up on.
        let local = self.state.rebuttals.remove(&target).unwrap_or_default();
        let mut existing = fetched;
        for rebuttal in local {
            if !existing.iter().any(|r| r.id == rebuttal.id) {
                existing.push(rebuttal);
            }
        }
        existing.sort_by_key(|r| r.created_at);
        self.state.rebuttals.insert(target, existing.clone());
        self.state.phase = Phase::ComposingRebuttal { target };
        debug!(target = %target, existing = existing.len(), "Rebuttal target selected");

        Ok(Outcome::RebuttalTargetSelected { target, existing })
    }

    async fn submit_rebuttal(
        &mut self,
        actor: Actor,
        target: StatementId,
        text: &str,
    ) -> Result<Outcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IllegalMove::EmptyRebuttal.into());
        }

        let request = NewRebuttal {
            target_claim_id: target,
            text: text.to_string(),
            author: actor.to_string(),
        };
        let mut saved: Rebuttal = self
            .sink
            .create_rebuttal(request)
            .await
            .map_err(|e| self.store_failure("create rebuttal", e))?;
        if saved.target_id != target {
            warn!(
                session_id = %self.state.id,
                target = %target,
                echoed = %saved.target_id,
                "Sink echoed a different rebuttal target"
            );
            saved.target_id = target;
        }

        let statement = Statement::rebuttal(&saved, target, actor);
        self.state.path.check_append(std::slice::from_ref(&statement))?;

        // Commit.
        self.state.path.push(statement.clone())?;
        self.state
            .rebuttals
            .entry(target)
            .or_default()
            .push(saved.clone());
        self.state
            .history
            .record(actor, MoveKind::Rebuttal, text);
        self.state.quota.consume(actor, MoveKind::Rebuttal);
        self.state.quota.use_turn(actor);
        self.state.phase = Phase::AwaitingMove;
        info!(
            session_id = %self.state.id,
            actor = %actor,
            target = %target,
            rebuttal = %saved.id,
            "Rebuttal accepted"
        );
        self.publish_last_move();
        self.publish_statement(&statement);
        self.pass_turn();

        Ok(Outcome::Rebutted { rebuttal: saved })
    }

    /// Flip the turn and restart the clock, or end the session once
    /// neither side has turns left.
    fn pass_turn(&mut self) {
        self.state.turn = self.state.turn.other();
        self.state.generation += 1;

        if self.state.quota.all_turns_exhausted() {
            self.end(EndReason::TurnsExhausted);
            return;
        }
        self.timer.restart(self.state.generation, Instant::now());
    }

    fn end(&mut self, reason: EndReason) -> Outcome {
        self.state.phase = Phase::Ended { reason };
        self.state.generation += 1;
        self.timer.stop();
        info!(
            session_id = %self.state.id,
            %reason,
            moves = self.state.history.len(),
            statements = self.state.path.len(),
            "Dialogue ended"
        );
        self.publish(DialogueEvent::SessionEnded {
            session_id: self.state.id,
            reason,
            timestamp: Utc::now(),
        });
        Outcome::Ended { reason }
    }

    fn store_failure(&self, what: &str, err: crate::store::StoreError) -> DialogueError {
        warn!(session_id = %self.state.id, what, error = %err, "Store call failed");
        err.into()
    }

    // ── Events ─────────────────────────────────────────────────────────

    fn publish(&self, event: DialogueEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    fn publish_last_move(&self) {
        if let Some(last) = self.state.history.last() {
            self.publish(DialogueEvent::MoveAccepted {
                session_id: self.state.id,
                actor: last.actor,
                kind: last.kind,
                content: last.content.clone(),
                generation: self.state.generation,
                timestamp: last.timestamp,
            });
        }
    }

    fn publish_statement(&self, statement: &Statement) {
        self.publish(DialogueEvent::StatementAdded {
            session_id: self.state.id,
            statement: statement.clone(),
            timestamp: Utc::now(),
        });
    }
}
