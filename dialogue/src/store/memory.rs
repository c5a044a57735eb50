//! In-process content store and rebuttal sink.
//!
//! Holds topics, arguments and rebuttals in memory. Used by the CLI demo and
//! by tests; it can be switched offline to simulate a backend outage.
//!
//! A store can also be seeded from a directory of JSON files laid out like
//! the backend's offline mock data:
//!
//! ```text
//! topics.json                        [{"topic": "..."}]
//! structured-by-topic-name.json      {"<topic>": {"id", "text", "source"}}
//! argument-id-by-claim-id.json       {"<claim id>": <argument id>}
//! justifications-by-argument-id.json {"<argument id>": [{"id", "text", "source"}]}
//! rebuttals.json                     [{"id", "targetClaimId", "text", "author", "createdAt"}]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{ContentStore, RebuttalSink, StoreError, StoreResult};
use crate::model::{
    ArgumentId, Candidate, JustificationNode, NewRebuttal, Rebuttal, RootClaim, StatementId, Topic,
};

/// First id handed to rebuttals created through the sink.
const FIRST_REBUTTAL_ID: i64 = 10_000;

/// In-memory store; every lookup is synchronous under the hood.
pub struct InMemoryStore {
    topics: Vec<String>,
    roots: HashMap<String, RootClaim>,
    arguments: HashMap<StatementId, ArgumentId>,
    premises: HashMap<ArgumentId, Vec<Candidate>>,
    rebuttals: Mutex<HashMap<StatementId, Vec<Rebuttal>>>,
    created: Mutex<Vec<NewRebuttal>>,
    next_id: AtomicI64,
    online: AtomicBool,
    /// Where created rebuttals are written back, if anywhere.
    rebuttal_file: Option<PathBuf>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            topics: Vec::new(),
            roots: HashMap::new(),
            arguments: HashMap::new(),
            premises: HashMap::new(),
            rebuttals: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(FIRST_REBUTTAL_ID),
            online: AtomicBool::new(true),
            rebuttal_file: None,
        }
    }

    /// Load a seed directory. `rebuttals.json` is optional; when present,
    /// new rebuttals are appended to it.
    pub fn load_dir(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        let topics: Vec<Topic> = read_json(&dir.join("topics.json"))?;
        let roots: HashMap<String, RootClaim> =
            read_json(&dir.join("structured-by-topic-name.json"))?;
        let arguments: HashMap<i64, i64> = read_json(&dir.join("argument-id-by-claim-id.json"))?;
        let premises: HashMap<i64, Vec<Candidate>> =
            read_json(&dir.join("justifications-by-argument-id.json"))?;

        let rebuttal_file = dir.join("rebuttals.json");
        let rebuttals: Vec<Rebuttal> = if rebuttal_file.exists() {
            read_json(&rebuttal_file)?
        } else {
            Vec::new()
        };

        let mut store = Self::new();
        for topic in topics {
            match roots.get(&topic.topic) {
                Some(root) => store = store.with_topic(topic.topic, root.clone()),
                None => store.topics.push(topic.topic),
            }
        }
        for (claim, argument) in arguments {
            let candidates = premises.get(&argument).cloned().unwrap_or_default();
            store = store.with_argument(StatementId(claim), ArgumentId(argument), candidates);
        }

        // New ids continue after the highest seeded rebuttal, like the backend.
        let next = rebuttals.iter().map(|r| r.id.0 + 1).max();
        for rebuttal in rebuttals {
            store = store.with_rebuttal(rebuttal);
        }
        if let Some(next) = next {
            store = store.with_next_id(next.max(FIRST_REBUTTAL_ID));
        }

        info!(
            dir = %dir.display(),
            topics = store.topics.len(),
            arguments = store.arguments.len(),
            "Loaded seed data"
        );
        store.rebuttal_file = Some(rebuttal_file);
        Ok(store)
    }

    /// Register a topic and its root claim.
    pub fn with_topic(mut self, name: impl Into<String>, claim: RootClaim) -> Self {
        let name = name.into();
        if !self.topics.contains(&name) {
            self.topics.push(name.clone());
        }
        self.roots.insert(name, claim);
        self
    }

    /// Register the argument whose claim is `claim`, with its premises.
    pub fn with_argument(
        mut self,
        claim: StatementId,
        argument: ArgumentId,
        premises: Vec<Candidate>,
    ) -> Self {
        self.arguments.insert(claim, argument);
        self.premises.insert(argument, premises);
        self
    }

    /// Seed a previously recorded rebuttal.
    pub fn with_rebuttal(self, rebuttal: Rebuttal) -> Self {
        if let Ok(mut map) = self.rebuttals.lock() {
            map.entry(rebuttal.target_id).or_default().push(rebuttal);
        }
        self
    }

    /// Id the next created rebuttal will receive.
    pub fn with_next_id(self, id: i64) -> Self {
        self.next_id.store(id, Ordering::SeqCst);
        self
    }

    /// Simulate the backend going down or coming back.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Requests the sink has accepted, in order.
    pub fn created_rebuttals(&self) -> Vec<NewRebuttal> {
        self.created
            .lock()
            .map(|created| created.clone())
            .unwrap_or_default()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
        mutex
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    /// Expand the premises of `claim` recursively into tree nodes.
    fn subtree(&self, claim: StatementId, seen: &mut HashSet<StatementId>) -> Vec<JustificationNode> {
        if !seen.insert(claim) {
            return Vec::new();
        }
        let Some(argument) = self.arguments.get(&claim) else {
            return Vec::new();
        };
        self.premises
            .get(argument)
            .map(|premises| {
                premises
                    .iter()
                    .map(|p| JustificationNode {
                        id: p.id,
                        text: p.text.clone(),
                        children: self.subtree(p.id, seen),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write every known rebuttal plus `pending` back to the seed file,
    /// oldest id first. Nothing in memory changes.
    async fn persist_rebuttals(&self, pending: &Rebuttal) -> StoreResult<()> {
        let Some(path) = &self.rebuttal_file else {
            return Ok(());
        };
        let json = {
            let map = Self::lock(&self.rebuttals)?;
            let mut all: Vec<&Rebuttal> = map.values().flatten().collect();
            all.push(pending);
            all.sort_by_key(|r| r.id);
            serde_json::to_vec_pretty(&all).map_err(|e| StoreError::Decode(e.to_string()))?
        };
        tokio::fs::write(path, json).await.map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to persist rebuttals");
            StoreError::Unavailable(format!("{}: {}", path.display(), e))
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let bytes = std::fs::read(path)
        .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(format!("{}: {}", path.display(), e)))
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn topics(&self) -> StoreResult<Vec<Topic>> {
        self.check_online()?;
        Ok(self
            .topics
            .iter()
            .map(|name| Topic {
                topic: name.clone(),
            })
            .collect())
    }

    async fn root_claim(&self, topic: &str) -> StoreResult<Option<RootClaim>> {
        self.check_online()?;
        Ok(self.roots.get(topic).cloned())
    }

    async fn argument_for_claim(&self, claim: StatementId) -> StoreResult<Option<ArgumentId>> {
        self.check_online()?;
        Ok(self.arguments.get(&claim).copied())
    }

    async fn justifications(&self, argument: ArgumentId) -> StoreResult<Vec<Candidate>> {
        self.check_online()?;
        self.premises
            .get(&argument)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("argument {}", argument)))
    }

    async fn justification_tree(&self, topic: &str) -> StoreResult<JustificationNode> {
        self.check_online()?;
        let root = self
            .roots
            .get(topic)
            .ok_or_else(|| StoreError::NotFound(format!("topic {}", topic)))?;

        let mut seen = HashSet::new();
        Ok(JustificationNode {
            id: root.id,
            text: root.text.clone(),
            children: self.subtree(root.id, &mut seen),
        })
    }

    async fn rebuttals_for(&self, target: StatementId) -> StoreResult<Vec<Rebuttal>> {
        self.check_online()?;
        let map = Self::lock(&self.rebuttals)?;
        Ok(map.get(&target).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl RebuttalSink for InMemoryStore {
    async fn create_rebuttal(&self, request: NewRebuttal) -> StoreResult<Rebuttal> {
        self.check_online()?;
        let id = self.next_id.load(Ordering::SeqCst);
        let rebuttal = Rebuttal {
            id: StatementId(id),
            target_id: request.target_claim_id,
            text: request.text.trim().to_string(),
            author: request.author.clone(),
            created_at: Utc::now(),
        };

        // Write first so a failed write leaves no trace.
        self.persist_rebuttals(&rebuttal).await?;

        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
        Self::lock(&self.rebuttals)?
            .entry(rebuttal.target_id)
            .or_default()
            .push(rebuttal.clone());
        Self::lock(&self.created)?.push(request);

        debug!(id = %rebuttal.id, target = %rebuttal.target_id, "Rebuttal stored");
        Ok(rebuttal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, text: &str) -> Candidate {
        Candidate {
            id: StatementId(id),
            text: text.into(),
            source: None,
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_topic(
                "Television",
                RootClaim {
                    id: StatementId(1),
                    text: "Television does more harm than good".into(),
                    source: None,
                },
            )
            .with_argument(
                StatementId(1),
                ArgumentId(100),
                vec![candidate(2, "passive viewing"), candidate(3, "ads")],
            )
            .with_argument(StatementId(2), ArgumentId(101), vec![candidate(4, "studies")])
            // Cycle back to the root must not recurse forever.
            .with_argument(StatementId(4), ArgumentId(102), vec![candidate(1, "loop")])
    }

    #[tokio::test]
    async fn test_lookup_root_claim() {
        let store = store();
        let claim = store.root_claim("Television").await.unwrap().unwrap();
        assert_eq!(claim.id, StatementId(1));
        assert!(store.root_claim("Radio").await.unwrap().is_none());
        assert_eq!(store.topics().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tree_is_built_from_arguments() {
        let store = store();
        let tree = store.justification_tree("Television").await.unwrap();
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].children[0].id, StatementId(4));

        let ids: Vec<i64> = tree.candidates().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[tokio::test]
    async fn test_create_rebuttal_assigns_id_and_indexes() {
        let store = store().with_next_id(500);
        let saved = store
            .create_rebuttal(NewRebuttal {
                target_claim_id: StatementId(2),
                text: "  not always  ".into(),
                author: "Opponent".into(),
            })
            .await
            .unwrap();

        assert_eq!(saved.id, StatementId(500));
        assert_eq!(saved.text, "not always");
        assert_eq!(store.rebuttals_for(StatementId(2)).await.unwrap().len(), 1);
        assert_eq!(store.created_rebuttals().len(), 1);
    }

    #[tokio::test]
    async fn test_load_dir_and_persist_rebuttals() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();
        write("topics.json", r#"[{"topic": "Television"}, {"topic": "Draft"}]"#);
        write(
            "structured-by-topic-name.json",
            r#"{"Television": {"id": 1, "text": "TV is harmful", "source": null}}"#,
        );
        write("argument-id-by-claim-id.json", r#"{"1": 100}"#);
        write(
            "justifications-by-argument-id.json",
            r#"{"100": [{"id": 2, "text": "passive", "source": "study"}]}"#,
        );
        write(
            "rebuttals.json",
            r#"[{"id": 41, "targetClaimId": 2, "text": "not always", "author": "Opponent", "createdAt": "2024-03-01T10:00:00Z"}]"#,
        );

        let store = InMemoryStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.topics().await.unwrap().len(), 2);
        assert!(store.root_claim("Draft").await.unwrap().is_none());
        assert_eq!(
            store.argument_for_claim(StatementId(1)).await.unwrap(),
            Some(ArgumentId(100))
        );
        assert_eq!(store.rebuttals_for(StatementId(2)).await.unwrap().len(), 1);

        let saved = store
            .create_rebuttal(NewRebuttal {
                target_claim_id: StatementId(2),
                text: "sometimes".into(),
                author: "Proponent".into(),
            })
            .await
            .unwrap();
        assert_eq!(saved.id, StatementId(FIRST_REBUTTAL_ID));

        let written: Vec<Rebuttal> = serde_json::from_slice(
            &std::fs::read(dir.path().join("rebuttals.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[1].text, "sometimes");
    }

    #[tokio::test]
    async fn test_failed_write_records_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();
        write("topics.json", r#"[{"topic": "Television"}]"#);
        write(
            "structured-by-topic-name.json",
            r#"{"Television": {"id": 1, "text": "TV is harmful", "source": null}}"#,
        );
        write("argument-id-by-claim-id.json", "{}");
        write("justifications-by-argument-id.json", "{}");

        let store = InMemoryStore::load_dir(dir.path()).unwrap();
        let seed_dir = dir.path().to_path_buf();
        drop(dir);
        assert!(!seed_dir.exists());

        let request = NewRebuttal {
            target_claim_id: StatementId(2),
            text: "not always".into(),
            author: "Opponent".into(),
        };
        for _ in 0..2 {
            assert!(matches!(
                store.create_rebuttal(request.clone()).await,
                Err(StoreError::Unavailable(_))
            ));
        }
        assert!(store.rebuttals_for(StatementId(2)).await.unwrap().is_empty());
        assert!(store.created_rebuttals().is_empty());

        // Once writes work again the id sequence has not moved.
        std::fs::create_dir_all(&seed_dir).unwrap();
        let saved = store.create_rebuttal(request).await.unwrap();
        assert_eq!(saved.id, StatementId(FIRST_REBUTTAL_ID));
        std::fs::remove_dir_all(&seed_dir).unwrap();
    }

    #[test]
    fn test_load_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            InMemoryStore::load_dir(dir.path()),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_store_is_unavailable() {
        let store = store();
        store.set_online(false);
        assert!(matches!(
            store.topics().await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_online(true);
        assert!(store.topics().await.is_ok());
    }
}
