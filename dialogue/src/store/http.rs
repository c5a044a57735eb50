//! HTTP adapter for the argument backend's REST API.
//!
//! Every request is bounded by the configured timeout. A 404 is reported as
//! "not found"; connection failures, timeouts and any other non-success
//! status are reported as unavailable so the caller can retry the move.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ContentStore, RebuttalSink, StoreError, StoreResult};
use crate::config::HttpStoreConfig;
use crate::model::{
    ArgumentId, Candidate, JustificationNode, NewRebuttal, Rebuttal, RootClaim, StatementId, Topic,
};

/// Rebuttal record as the backend returns it. The backend names the id
/// `statementId`, omits the timestamp, and also sends the `argumentId` of
/// the container it created, which is not a statement id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RebuttalRecord {
    #[serde(alias = "statementId")]
    id: StatementId,
    #[serde(default)]
    #[allow(dead_code)]
    argument_id: Option<ArgumentId>,
    #[serde(default)]
    target_claim_id: Option<StatementId>,
    text: String,
    #[serde(default, alias = "source")]
    author: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl RebuttalRecord {
    fn into_rebuttal(self, target: StatementId, fallback_author: &str) -> Rebuttal {
        Rebuttal {
            id: self.id,
            target_id: self.target_claim_id.unwrap_or(target),
            text: self.text,
            author: self.author.unwrap_or_else(|| fallback_author.to_string()),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Error text the backend returns with its 500 for an unknown topic.
const UNKNOWN_TOPIC: &str = "Topic not found";

/// Content store and rebuttal sink backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: Client,
    base_url: String,
}

impl HttpContentStore {
    pub fn new(config: &HttpStoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Unavailable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Send a request and decode a JSON body. A 404 yields `Ok(None)`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        what: &str,
        request: RequestBuilder,
    ) -> StoreResult<Option<T>> {
        let response = request.send().await.map_err(|e| {
            warn!(what, error = %e, "Store request failed");
            StoreError::Unavailable(format!("{}: {}", what, e))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(what, "Store returned 404");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(what, %status, "Store returned error status");
            return Err(StoreError::Unavailable(format!(
                "{} ({}): {}",
                what, status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", what, e)))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Decode(format!("{}: {}", what, e)))
    }

    async fn fetch_required<T: DeserializeOwned>(
        &self,
        what: &str,
        request: RequestBuilder,
    ) -> StoreResult<T> {
        self.fetch(what, request)
            .await?
            .ok_or_else(|| StoreError::NotFound(what.to_string()))
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn topics(&self) -> StoreResult<Vec<Topic>> {
        let request = self.client.get(self.url("topics"));
        self.fetch_required("topics", request).await
    }

    async fn root_claim(&self, topic: &str) -> StoreResult<Option<RootClaim>> {
        let request = self
            .client
            .get(self.url("structured-arguments/by-topic-name"))
            .query(&[("name", topic)]);
        match self.fetch("root claim", request).await {
            // The backend reports an unknown topic as a 500.
            Err(StoreError::Unavailable(msg)) if msg.contains(UNKNOWN_TOPIC) => {
                debug!(topic, "Backend does not know the topic");
                Ok(None)
            }
            other => other,
        }
    }

    async fn argument_for_claim(&self, claim: StatementId) -> StoreResult<Option<ArgumentId>> {
        let request = self
            .client
            .get(self.url("structured-arguments/argument-by-claim"))
            .query(&[("claimId", claim.0)]);
        self.fetch("argument by claim", request).await
    }

    async fn justifications(&self, argument: ArgumentId) -> StoreResult<Vec<Candidate>> {
        let request = self
            .client
            .get(self.url("structured-arguments/justifications"))
            .query(&[("argumentId", argument.0)]);
        self.fetch_required("justifications", request).await
    }

    async fn justification_tree(&self, topic: &str) -> StoreResult<JustificationNode> {
        let request = self
            .client
            .get(self.url("structured-arguments/tree"))
            .query(&[("topic", topic)]);
        self.fetch_required("justification tree", request).await
    }

    async fn rebuttals_for(&self, target: StatementId) -> StoreResult<Vec<Rebuttal>> {
        let request = self
            .client
            .get(self.url("rebuttals"))
            .query(&[("targetClaimId", target.0)]);
        let records: Vec<RebuttalRecord> = self
            .fetch("rebuttals", request)
            .await?
            .unwrap_or_default();

        let mut rebuttals: Vec<Rebuttal> = records
            .into_iter()
            .map(|r| r.into_rebuttal(target, "unknown"))
            .collect();
        rebuttals.sort_by_key(|r| r.created_at);
        Ok(rebuttals)
    }
}

#[async_trait]
impl RebuttalSink for HttpContentStore {
    async fn create_rebuttal(&self, request: NewRebuttal) -> StoreResult<Rebuttal> {
        let http = self.client.post(self.url("rebuttals")).json(&request);
        let record: RebuttalRecord = self.fetch_required("create rebuttal", http).await?;
        Ok(record.into_rebuttal(request.target_claim_id, &request.author))
    }
}
