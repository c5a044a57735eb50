//! External collaborators — the content store and the rebuttal sink.
//!
//! The engine only reads topics, claims and justifications; the one thing it
//! writes is a new rebuttal. Both sides are async traits so the controller
//! can run against the HTTP backend, the in-memory store, or a test double.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::model::{
    ArgumentId, Candidate, JustificationNode, NewRebuttal, Rebuttal, RootClaim, StatementId, Topic,
};

pub use http::HttpContentStore;
pub use memory::InMemoryStore;

/// Error from a store or sink call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed store response: {0}")]
    Decode(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only source of dialogue content.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All topic names.
    async fn topics(&self) -> StoreResult<Vec<Topic>>;

    /// Root claim for a topic, `None` if the topic is unknown.
    async fn root_claim(&self, topic: &str) -> StoreResult<Option<RootClaim>>;

    /// Argument container whose claim is `claim`.
    async fn argument_for_claim(&self, claim: StatementId) -> StoreResult<Option<ArgumentId>>;

    /// Candidate justifications (premises) of an argument, in store order.
    async fn justifications(&self, argument: ArgumentId) -> StoreResult<Vec<Candidate>>;

    /// Full justification tree of a topic, rooted at its root claim.
    async fn justification_tree(&self, topic: &str) -> StoreResult<JustificationNode>;

    /// Previously recorded rebuttals against `target`, oldest first.
    async fn rebuttals_for(&self, target: StatementId) -> StoreResult<Vec<Rebuttal>>;
}

/// Write side: persists new rebuttals.
#[async_trait]
pub trait RebuttalSink: Send + Sync {
    /// Persist a rebuttal. The returned id and timestamp are authoritative.
    async fn create_rebuttal(&self, request: NewRebuttal) -> StoreResult<Rebuttal>;
}
