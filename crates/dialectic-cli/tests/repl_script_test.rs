//! Plays scripted REPL lines against the demo topics, the way the binary
//! does, and checks what the views show.

use std::sync::Arc;

use dialectic_cli::input::{parse_line, Input};
use dialectic_cli::{demo, render};
use dialogue::{
    Actor, Command, DialogueConfig, DialogueController, EndReason, Outcome, StatementId,
};

async fn start() -> DialogueController {
    let store = Arc::new(demo::store());
    DialogueController::start("Television", store.clone(), store, &DialogueConfig::default())
        .await
        .unwrap()
}

fn command(line: &str) -> Command {
    match parse_line(line).unwrap() {
        Input::Command(command) => command,
        other => panic!("'{}' parsed to {:?}", line, other),
    }
}

#[tokio::test]
async fn test_scripted_dialogue_until_accept() {
    let mut session = start().await;

    let outcome = session.apply(command("challenge 1")).await.unwrap();
    let Outcome::ChallengeOpened { candidates, .. } = &outcome else {
        panic!("expected a challenge, got {:?}", outcome);
    };
    assert_eq!(candidates.len(), 5);
    assert!(render::outcome(&outcome).contains("#6 Ads during cartoons push sugary food"));
    assert_eq!(session.turn(), Actor::Proponent);

    session.apply(command("justify 2, 3")).await.unwrap();
    assert_eq!(session.turn(), Actor::Opponent);

    assert!(matches!(
        session.apply(command("rebut")).await.unwrap(),
        Outcome::Armed { .. }
    ));
    session.apply(command("target 2")).await.unwrap();
    let outcome = session
        .apply(command("rebuttal Kids also watch documentaries"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Rebutted { .. }));

    let tree = render::tree(session.state());
    assert!(tree.contains("?#1 P: Television does more harm than good [root]"));
    assert!(tree.contains("O: Kids also watch documentaries [rebuttal]"));

    let outcome = session.apply(command("accept")).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Ended {
            reason: EndReason::Accepted {
                by: Actor::Proponent
            }
        }
    );
    let status = render::status(session.state(), None);
    assert!(status.contains("Dialogue over: accepted by Proponent"));
}

#[tokio::test]
async fn test_illegal_line_leaves_prompt_unchanged() {
    let mut session = start().await;
    let before = render::prompt(session.state(), &session.allowed_moves());

    // Justify is not a legal opening move.
    assert!(session.apply(command("justify 2")).await.is_err());
    assert_eq!(
        render::prompt(session.state(), &session.allowed_moves()),
        before
    );
    assert!(before.starts_with("Opponent ["));
}

#[tokio::test]
async fn test_history_view_after_skip() {
    let mut session = start().await;
    // The opening turn offers only challenge and accept.
    assert!(session.apply(command("skip")).await.is_err());

    session.apply(command("challenge 1")).await.unwrap();
    session.apply(command("skip")).await.unwrap();

    let history = render::history(session.state());
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("Proponent"));
    assert!(lines[1].contains("Opponent"));
    assert!(lines[2].contains("Proponent"));
    assert!(lines[2].contains("skip"));
    assert_eq!(session.state().path.root().map(|s| s.id), Some(StatementId(1)));
}
