//! Shared fixture: the "Television" topic seeded into an in-memory store.
//!
//! ```text
//! 1  Television does more harm than good            (root, argument 100)
//! ├─ 2  It replaces active play with passive viewing (argument 101)
//! │  ├─ 4  Children watch four hours a day
//! │  └─ 5  Screen time correlates with obesity
//! └─ 3  Advertising targets children                 (argument 102)
//!    └─ 7  Ads during cartoons push sugary food
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use dialogue::{
    ArgumentId, Candidate, DialogueConfig, DialogueController, InMemoryStore, RootClaim,
    StatementId,
};

pub const TOPIC: &str = "Television";

pub fn id(n: i64) -> StatementId {
    StatementId(n)
}

fn candidate(n: i64, text: &str) -> Candidate {
    Candidate {
        id: StatementId(n),
        text: text.to_string(),
        source: Some("fixture".to_string()),
    }
}

pub fn store() -> Arc<InMemoryStore> {
    Arc::new(
        InMemoryStore::new()
            .with_topic(
                TOPIC,
                RootClaim {
                    id: id(1),
                    text: "Television does more harm than good".into(),
                    source: None,
                },
            )
            .with_topic(
                "Empty",
                RootClaim {
                    id: id(90),
                    text: "Nobody has argued about this yet".into(),
                    source: None,
                },
            )
            .with_argument(
                id(1),
                ArgumentId(100),
                vec![
                    candidate(2, "It replaces active play with passive viewing"),
                    candidate(3, "Advertising targets children"),
                ],
            )
            .with_argument(
                id(2),
                ArgumentId(101),
                vec![
                    candidate(4, "Children watch four hours a day"),
                    candidate(5, "Screen time correlates with obesity"),
                ],
            )
            .with_argument(
                id(3),
                ArgumentId(102),
                vec![candidate(7, "Ads during cartoons push sugary food")],
            )
            .with_next_id(500),
    )
}

pub async fn start(store: &Arc<InMemoryStore>) -> DialogueController {
    start_with(store, &DialogueConfig::default()).await
}

/// Route engine logs through the test harness; `RUST_LOG` raises the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

pub async fn start_with(store: &Arc<InMemoryStore>, config: &DialogueConfig) -> DialogueController {
    init_tracing();
    DialogueController::start(TOPIC, store.clone(), store.clone(), config)
        .await
        .expect("fixture topic should start")
}
