//! Turn timeouts and the timeout-versus-move race, on a paused clock.

mod common;

use std::time::Duration;

use common::{id, start, store};
use dialogue::{
    Actor, Command, DialogueError, IllegalMove, LiveSession, MoveKind, Outcome, Phase,
};
use tokio::time::{advance, sleep, Instant};

const TURN: Duration = Duration::from_secs(90);
const TICK: Duration = Duration::from_secs(1);

#[tokio::test(start_paused = true)]
async fn test_idle_proponent_is_skipped_after_ninety_seconds() {
    let store = store();
    let mut session = start(&store).await;
    session
        .apply(Command::Challenge {
            target: Some(id(1)),
        })
        .await
        .unwrap();
    assert_eq!(session.turn(), Actor::Proponent);

    advance(TURN - TICK).await;
    assert_eq!(session.tick(Instant::now()), None);

    advance(TICK).await;
    let outcome = session.tick(Instant::now());
    assert_eq!(
        outcome,
        Some(Outcome::Skipped {
            actor: Actor::Proponent,
            timed_out: true
        })
    );

    let state = session.state();
    let last = state.history.last().unwrap();
    assert_eq!((last.actor, last.kind), (Actor::Proponent, MoveKind::Skip));
    assert_eq!(state.quota.get(Actor::Proponent).turns_used, 1);
    assert_eq!(state.turn, Actor::Opponent);
    assert_eq!(state.phase, Phase::AwaitingMove);
    assert_eq!(session.time_remaining(), Some(TURN));

    // Fires once per turn.
    assert_eq!(session.tick(Instant::now()), None);
}

#[tokio::test(start_paused = true)]
async fn test_opening_timeout_hands_turn_to_proponent() {
    let store = store();
    let mut session = start(&store).await;

    advance(TURN).await;
    assert!(session.tick(Instant::now()).is_some());
    assert_eq!(session.turn(), Actor::Proponent);
    assert_eq!(session.state().quota.get(Actor::Opponent).turns_used, 1);

    // Only the root is on the path and it belongs to the proponent.
    let result = session.apply(Command::Rebut { target: None }).await;
    assert_eq!(
        result,
        Err(DialogueError::IllegalMove(IllegalMove::NothingToRebut))
    );
    let result = session
        .apply(Command::Challenge {
            target: Some(id(1)),
        })
        .await;
    assert_eq!(
        result,
        Err(DialogueError::IllegalMove(IllegalMove::OwnStatement(id(1))))
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_drops_pending_rebuttal_target() {
    let store = store();
    let mut session = start(&store).await;
    session
        .apply(Command::Challenge {
            target: Some(id(1)),
        })
        .await
        .unwrap();
    session
        .apply(Command::Justify {
            selection: vec![id(2)],
        })
        .await
        .unwrap();
    session
        .apply(Command::Rebut {
            target: Some(id(2)),
        })
        .await
        .unwrap();
    assert_eq!(session.state().pending_rebuttal_target(), Some(id(2)));

    advance(TURN).await;
    session.tick(Instant::now());

    assert_eq!(session.state().pending_rebuttal_target(), None);
    assert_eq!(session.turn(), Actor::Proponent);
    assert!(store.created_rebuttals().is_empty());
    assert_eq!(
        session
            .state()
            .quota
            .get(Actor::Opponent)
            .rebuttals_remaining,
        5
    );
}

#[tokio::test(start_paused = true)]
async fn test_move_resets_the_clock() {
    let store = store();
    let mut session = start(&store).await;

    advance(Duration::from_secs(80)).await;
    session
        .apply(Command::Challenge {
            target: Some(id(1)),
        })
        .await
        .unwrap();

    advance(Duration::from_secs(20)).await;
    assert_eq!(session.tick(Instant::now()), None);
    assert_eq!(session.time_remaining(), Some(Duration::from_secs(70)));
}

#[tokio::test(start_paused = true)]
async fn test_ended_session_never_times_out() {
    let store = store();
    let mut session = start(&store).await;
    session.apply(Command::Accept).await.unwrap();

    advance(TURN * 3).await;
    assert_eq!(session.tick(Instant::now()), None);
    assert_eq!(session.state().history.len(), 2);
}

// ── Live session ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_live_timeout_wins_race_and_move_is_stale() {
    let store = store();
    let live = LiveSession::spawn(start(&store).await, TICK);
    let seen = live.generation().await;

    sleep(TURN + TICK).await;

    let state = live.snapshot().await;
    assert_eq!(state.turn, Actor::Proponent);
    assert_eq!(state.history.last().unwrap().kind, MoveKind::Skip);

    // The opponent's challenge was composed against the expired turn.
    let result = live
        .submit(
            seen,
            Command::Challenge {
                target: Some(id(1)),
            },
        )
        .await;
    assert_eq!(
        result,
        Err(DialogueError::Stale {
            expected: seen,
            current: seen + 1
        })
    );
    assert!(live.snapshot().await.challenged.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_live_move_wins_race() {
    let store = store();
    let live = LiveSession::spawn(start(&store).await, TICK);
    let seen = live.generation().await;

    sleep(TURN - TICK).await;
    live.submit(
        seen,
        Command::Challenge {
            target: Some(id(1)),
        },
    )
    .await
    .unwrap();

    sleep(Duration::from_secs(10)).await;
    let state = live.snapshot().await;
    assert_eq!(state.turn, Actor::Proponent);
    assert_eq!(state.history.count(MoveKind::Skip), 0);
    assert!(live.time_remaining().await.unwrap() > Duration::from_secs(75));
}

#[tokio::test(start_paused = true)]
async fn test_live_session_keeps_skipping_idle_turns() {
    let store = store();
    let live = LiveSession::spawn(start(&store).await, TICK);

    sleep(TURN * 3 + TICK).await;

    let state = live.snapshot().await;
    assert_eq!(state.history.count(MoveKind::Skip), 3);
    assert_eq!(state.quota.get(Actor::Opponent).turns_used, 2);
    assert_eq!(state.quota.get(Actor::Proponent).turns_used, 1);
    assert_eq!(state.generation, 3);
}

#[tokio::test(start_paused = true)]
async fn test_live_session_stops_after_accept() {
    let store = store();
    let live = LiveSession::spawn(start(&store).await, TICK);

    live.apply(Command::Accept).await.unwrap();
    sleep(TURN * 2).await;

    assert!(live.is_ended().await);
    assert_eq!(live.snapshot().await.history.len(), 2);
    assert_eq!(
        live.apply(Command::Skip).await,
        Err(DialogueError::SessionEnded)
    );
}
