//! Dialogue engine for two-party structured argumentation
//!
//! A Proponent defends a topic's root claim and an Opponent attacks it. The
//! engine decides which moves are legal, applies them to the shared argument
//! path, enforces turn and move quotas, times out idle turns, and ends the
//! dialogue when one side accepts.
//!
//! # Components
//!
//! - [`rules`]: pure move-legality function
//! - [`path`]: append-only statement path and its derived tree view
//! - [`history`]: append-only move log
//! - [`quota`]: per-actor turn, challenge and rebuttal allowances
//! - [`timer`]: per-turn countdown, tagged with the turn generation
//! - [`session`]: the controller state machine and the live driver
//! - [`store`]: content store and rebuttal sink, in memory or over HTTP
//! - [`events`]: broadcast bus for observers
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use dialogue::{Command, DialogueConfig, DialogueController, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::new() /* seeded */);
//! let mut session =
//!     DialogueController::start("Television", store.clone(), store, &DialogueConfig::default())
//!         .await?;
//!
//! let root = session.state().path.root().unwrap().id;
//! session.apply(Command::Challenge { target: Some(root) }).await?;
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod events;
pub mod history;
pub mod model;
pub mod path;
pub mod quota;
pub mod rules;
pub mod session;
pub mod store;
pub mod timer;

pub use config::{ConfigError, DialogueConfig, HttpStoreConfig};
pub use events::{DialogueEvent, EventBus, SharedEventBus};
pub use history::MoveHistory;
pub use model::{
    Actor, ArgumentId, Candidate, JustificationNode, Move, MoveKind, MoveSet, NewRebuttal,
    Rebuttal, RootClaim, Statement, StatementId, StatementKind, Topic,
};
pub use path::{DialoguePath, PathError, TreeIndex};
pub use quota::{ActorQuota, QuotaTracker};
pub use rules::{allowed_moves, RuleContext};
pub use session::{
    Command, DialogueController, DialogueError, EndReason, ErrorCategory, IllegalMove,
    LiveSession, Outcome, Phase, SessionState, TargetKind,
};
pub use store::{
    ContentStore, HttpContentStore, InMemoryStore, RebuttalSink, StoreError, StoreResult,
};
pub use timer::TurnTimer;
