//! Text views of a session for the terminal.
//!
//! Every function returns a `String` so the REPL decides where it goes and
//! tests can compare output directly.

use std::fmt::Write as _;
use std::time::Duration;

use dialogue::{
    Actor, Candidate, DialogueEvent, MoveSet, Outcome, Phase, Rebuttal, SessionState, Statement,
    StatementKind,
};

/// Argument tree, indented by depth. Challenged statements carry a `?`.
pub fn tree(state: &SessionState) -> String {
    let mut out = String::new();
    for (depth, statement) in state.path.tree().walk() {
        let marker = if state.challenged.contains(&statement.id) {
            "?"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "{}{}{}",
            "  ".repeat(depth),
            marker,
            statement_line(statement)
        );
    }
    out
}

fn statement_line(statement: &Statement) -> String {
    let tag = match (statement.kind, statement.is_rebuttal) {
        (_, true) | (StatementKind::Rebuttal, _) => " [rebuttal]",
        _ if statement.is_root() => " [root]",
        _ => "",
    };
    let source = statement
        .source
        .as_deref()
        .map(|s| format!(" ({})", s))
        .unwrap_or_default();
    format!(
        "#{} {}: {}{}{}",
        statement.id,
        stance_letter(statement.stance),
        statement.text,
        source,
        tag
    )
}

fn stance_letter(actor: Actor) -> char {
    match actor {
        Actor::Proponent => 'P',
        Actor::Opponent => 'O',
    }
}

/// Move log, one line per move.
pub fn history(state: &SessionState) -> String {
    let mut out = String::new();
    for (n, mv) in state.history.as_slice().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} {:<10} {:<9} {}",
            n + 1,
            mv.timestamp.format("%H:%M:%S"),
            mv.actor.to_string(),
            mv.kind.to_string(),
            mv.content
        );
    }
    out
}

/// Turn, phase, quotas and the remaining clock.
pub fn status(state: &SessionState, remaining: Option<Duration>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Topic: {}", state.topic);
    if let Phase::Ended { reason } = &state.phase {
        let _ = writeln!(out, "Dialogue over: {}", reason);
        return out;
    }

    let _ = writeln!(out, "Turn: {} ({})", state.turn, state.phase);
    for actor in [Actor::Proponent, Actor::Opponent] {
        let quota = state.quota.get(actor);
        let _ = writeln!(
            out,
            "  {:<10} turns {}/{}  challenges left {}  rebuttals left {}",
            actor.to_string(),
            quota.turns_used,
            state.quota.max_turns(),
            quota.challenges_remaining,
            quota.rebuttals_remaining
        );
    }
    if let Some(remaining) = remaining {
        let _ = writeln!(out, "Time left: {}s", remaining.as_secs());
    }
    out
}

/// Prompt shown before each line of input.
pub fn prompt(state: &SessionState, allowed: &MoveSet) -> String {
    let moves = allowed
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match &state.phase {
        Phase::AwaitingJustificationSelection { candidates, .. } => {
            format!("{} [justify {} | {}]> ", state.turn, ids(candidates), moves)
        }
        Phase::AwaitingMoveTarget { kind } => format!("{} [{} target]> ", state.turn, kind),
        Phase::ComposingRebuttal { target } => {
            format!("{} [rebuttal to #{}]> ", state.turn, target)
        }
        _ => format!("{} [{}]> ", state.turn, moves),
    }
}

fn ids(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Candidate justifications, one per line.
pub fn candidates(candidates: &[Candidate]) -> String {
    let mut out = String::new();
    for candidate in candidates {
        let _ = writeln!(out, "  #{} {}", candidate.id, candidate.text);
    }
    out
}

fn rebuttals(existing: &[Rebuttal]) -> String {
    let mut out = String::new();
    for rebuttal in existing {
        let _ = writeln!(
            out,
            "  #{} {} ({}, {})",
            rebuttal.id,
            rebuttal.text,
            rebuttal.author,
            rebuttal.created_at.format("%Y-%m-%d")
        );
    }
    out
}

/// What a successful command did, from the mover's point of view.
pub fn outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Armed { kind } => format!("Pick a statement to {} with 'target <id>'.\n", kind),
        Outcome::ChallengeOpened { target, candidates: offered } => format!(
            "Challenged #{}. Justifications on offer:\n{}",
            target,
            candidates(offered)
        ),
        Outcome::RebuttalTargetSelected { target, existing } if existing.is_empty() => format!(
            "Rebutting #{}. No rebuttals on record yet; write yours with 'rebuttal <text>'.\n",
            target
        ),
        Outcome::RebuttalTargetSelected { target, existing } => format!(
            "Rebutting #{}. Already on record:\n{}Write yours with 'rebuttal <text>'.\n",
            target,
            rebuttals(existing)
        ),
        Outcome::Justified { added } => {
            let mut out = String::from("Justified with:\n");
            for statement in added {
                let _ = writeln!(out, "  #{} {}", statement.id, statement.text);
            }
            out
        }
        Outcome::Rebutted { rebuttal } => {
            format!("Rebuttal #{} recorded against #{}.\n", rebuttal.id, rebuttal.target_id)
        }
        Outcome::Skipped { actor, timed_out: true } => {
            format!("{} ran out of time; turn skipped.\n", actor)
        }
        Outcome::Skipped { actor, .. } => format!("{} skipped.\n", actor),
        Outcome::Ended { reason } => format!("Dialogue over: {}.\n", reason),
    }
}

/// Notices for events the player did not cause directly.
pub fn notice(event: &DialogueEvent) -> Option<String> {
    match event {
        DialogueEvent::TurnSkipped {
            timed_out: true, ..
        }
        | DialogueEvent::SessionEnded { .. } => Some(format!("\n*** {}", event)),
        _ => None,
    }
}
