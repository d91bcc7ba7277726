//! Fan-out discovery across enabled `ExternalClient`s, content-hash dedup,
//! and breaker accounting. Grounded on
//! `src/services/content_discovery_service.py`'s `discover_content`.

use crate::error::ClientCallOutcome;
use futures::future::join_all;
use research_contracts::{
    content_hash, now, AuditEvent, ContentSource, CoreError, EventLevel, EventType, ExternalClient,
    RawItem, ResearchRunId, UnavailableReason,
};
use research_resilience::CircuitBreakerRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Content-hash-based dedup across everything a discovery round returned.
pub struct Deduper;

impl Deduper {
    /// Keeps the first item seen for each `content_hash`, preserving order.
    pub fn dedupe(items: Vec<RawItem>) -> Vec<RawItem> {
        let mut seen = HashMap::new();
        let mut out = Vec::new();
        for item in items {
            let hash = content_hash(&item.canonical_identifier);
            if seen.insert(hash, ()).is_none() {
                out.push(item);
            }
        }
        out
    }
}

pub struct DiscoveryOutcome {
    pub sources: Vec<ContentSource>,
    pub audit_events: Vec<AuditEvent>,
}

/// Fans the configured clients out in parallel, subject to per-client
/// breaker admission, dedupes by content hash, and builds persisted-shape
/// `ContentSource`s.
pub struct ContentDiscoveryService {
    clients: Vec<Arc<dyn ExternalClient>>,
    breakers: Arc<CircuitBreakerRegistry>,
    per_client_deadline: Duration,
}

impl ContentDiscoveryService {
    pub fn new(
        clients: Vec<Arc<dyn ExternalClient>>,
        breakers: Arc<CircuitBreakerRegistry>,
        per_client_deadline: Duration,
    ) -> Self {
        Self { clients, breakers, per_client_deadline }
    }

    /// Runs one discovery round for `run_id`. Fails only if every client is
    /// unavailable (breaker-closed and rejected, or the call itself failed).
    pub async fn discover(
        &self,
        run_id: ResearchRunId,
        topic: &str,
        limit_per_client: usize,
        created_by: &str,
    ) -> Result<DiscoveryOutcome, CoreError> {
        let calls = self.clients.iter().map(|client| self.call_one(client.clone(), topic, limit_per_client));
        let outcomes = join_all(calls).await;

        let mut all_items = Vec::new();
        let mut audit_events = Vec::new();
        let mut any_succeeded = false;

        for outcome in outcomes {
            match outcome {
                ClientCallOutcome::Succeeded { client_name, items } => {
                    any_succeeded = true;
                    let mut payload = research_contracts::Bag::new();
                    payload.insert("client".to_string(), serde_json::json!(client_name));
                    payload.insert("count".to_string(), serde_json::json!(items.len()));
                    audit_events.push(AuditEvent::new(
                        run_id,
                        EventType::ContentDiscovery,
                        EventLevel::Info,
                        payload,
                    ));
                    all_items.extend(items);
                }
                ClientCallOutcome::Rejected { client_name } => {
                    let mut payload = research_contracts::Bag::new();
                    payload.insert("client".to_string(), serde_json::json!(client_name));
                    payload.insert("reason".to_string(), serde_json::json!("breaker_open"));
                    audit_events.push(AuditEvent::new(run_id, EventType::SystemEvent, EventLevel::Warning, payload));
                }
                ClientCallOutcome::Failed { client_name, message } => {
                    warn!(client = %client_name, error = %message, "external client failed during discovery");
                    let mut payload = research_contracts::Bag::new();
                    payload.insert("client".to_string(), serde_json::json!(client_name));
                    payload.insert("error".to_string(), serde_json::json!(message));
                    audit_events.push(AuditEvent::new(run_id, EventType::Error, EventLevel::Warning, payload));
                }
            }
        }

        if !any_succeeded && !self.clients.is_empty() {
            return Err(CoreError::unavailable(
                "discovery",
                UnavailableReason::DependencyFailure,
                "every external client was unavailable",
            ));
        }

        let deduped = Deduper::dedupe(all_items);
        let sources = deduped
            .into_iter()
            .map(|item| self.to_content_source(run_id, item, created_by))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DiscoveryOutcome { sources, audit_events })
    }

    /// Second-stage DISCOVER recovery: iterate clients one at a time,
    /// skipping any whose breaker is OPEN, and stop at the first one that
    /// returns at least one item. Grounded on
    /// `src/services/content_discovery_service.py`'s degraded-mode fallback.
    pub async fn discover_sequential(
        &self,
        run_id: ResearchRunId,
        topic: &str,
        limit_per_client: usize,
        created_by: &str,
    ) -> Result<DiscoveryOutcome, CoreError> {
        for client in &self.clients {
            let breaker = self.breakers.get(client.name()).await;
            if !breaker.can_admit().await {
                continue;
            }
            match client.search(topic, limit_per_client, self.per_client_deadline).await {
                Ok(items) if !items.is_empty() => {
                    breaker.record_success().await;
                    let mut payload = research_contracts::Bag::new();
                    payload.insert("client".to_string(), serde_json::json!(client.name()));
                    payload.insert("count".to_string(), serde_json::json!(items.len()));
                    let audit_events = vec![AuditEvent::new(run_id, EventType::ContentDiscovery, EventLevel::Info, payload)];
                    let sources = Deduper::dedupe(items)
                        .into_iter()
                        .map(|item| self.to_content_source(run_id, item, created_by))
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(DiscoveryOutcome { sources, audit_events });
                }
                Ok(_) => {
                    breaker.record_success().await;
                }
                Err(_) => {
                    breaker.record_failure().await;
                }
            }
        }
        Ok(DiscoveryOutcome { sources: Vec::new(), audit_events: Vec::new() })
    }

    async fn call_one(&self, client: Arc<dyn ExternalClient>, topic: &str, limit: usize) -> ClientCallOutcome {
        let breaker = self.breakers.get(client.name()).await;
        if !breaker.can_admit().await {
            return ClientCallOutcome::Rejected { client_name: client.name().to_string() };
        }
        match client.search(topic, limit, self.per_client_deadline).await {
            Ok(items) => {
                breaker.record_success().await;
                ClientCallOutcome::Succeeded { client_name: client.name().to_string(), items }
            }
            Err(err) => {
                breaker.record_failure().await;
                ClientCallOutcome::Failed { client_name: client.name().to_string(), message: err.to_string() }
            }
        }
    }

    fn to_content_source(
        &self,
        run_id: ResearchRunId,
        item: RawItem,
        created_by: &str,
    ) -> Result<ContentSource, CoreError> {
        let mut source = ContentSource::new(
            run_id,
            item.source_type,
            item.title,
            &item.canonical_identifier,
            "external_client".to_string(),
            created_by,
        )?;
        source.url = item.url;
        source.description = item.description;
        source.content = item.content;
        source.source_metadata = item.metadata;
        if let Some(published_at) = item.published_at {
            source.source_metadata.insert("published_at".to_string(), serde_json::json!(published_at));
        }
        source.retrieval_timestamp = now();
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockExternalClient;
    use research_contracts::CoreConfig;
    use std::time::Duration;

    fn item(identifier: &str, title: &str) -> RawItem {
        RawItem {
            source_type: research_contracts::SourceType::Web,
            canonical_identifier: identifier.to_string(),
            url: Some(identifier.to_string()),
            title: title.to_string(),
            description: None,
            content: None,
            published_at: None,
            metadata: research_contracts::Bag::new(),
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence_by_content_hash() {
        let items = vec![
            item("https://example.org/x", "first"),
            item("https://example.org/x", "duplicate"),
            item("https://example.org/y", "distinct"),
        ];
        let deduped = Deduper::dedupe(items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "first");
    }

    #[tokio::test]
    async fn discover_succeeds_if_at_least_one_client_succeeds() {
        let registry = Arc::new(CircuitBreakerRegistry::new(CoreConfig::default()));
        let ok_client: Arc<dyn ExternalClient> =
            Arc::new(MockExternalClient::succeeding("ok", vec![item("https://example.org/a", "a")]));
        let failing_client: Arc<dyn ExternalClient> = Arc::new(MockExternalClient::failing("bad"));
        let service =
            ContentDiscoveryService::new(vec![ok_client, failing_client], registry, Duration::from_secs(5));

        let outcome = service.discover(ResearchRunId::new(), "topic", 10, "tester").await.unwrap();
        assert_eq!(outcome.sources.len(), 1);
        assert!(outcome.audit_events.iter().any(|e| e.level == EventLevel::Warning));
    }

    #[tokio::test]
    async fn discover_fails_when_every_client_fails() {
        let registry = Arc::new(CircuitBreakerRegistry::new(CoreConfig::default()));
        let failing_client: Arc<dyn ExternalClient> = Arc::new(MockExternalClient::failing("bad"));
        let service = ContentDiscoveryService::new(vec![failing_client], registry, Duration::from_secs(5));

        let result = service.discover(ResearchRunId::new(), "topic", 10, "tester").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn discover_sequential_stops_at_the_first_client_with_items() {
        let registry = Arc::new(CircuitBreakerRegistry::new(CoreConfig::default()));
        let empty_client: Arc<dyn ExternalClient> = Arc::new(MockExternalClient::succeeding("empty", vec![]));
        let ok_client: Arc<dyn ExternalClient> =
            Arc::new(MockExternalClient::succeeding("ok", vec![item("https://example.org/a", "a")]));
        let service = ContentDiscoveryService::new(vec![empty_client, ok_client], registry, Duration::from_secs(5));

        let outcome = service.discover_sequential(ResearchRunId::new(), "topic", 10, "tester").await.unwrap();
        assert_eq!(outcome.sources.len(), 1);
    }

    #[tokio::test]
    async fn discover_sequential_returns_empty_when_all_clients_are_empty() {
        let registry = Arc::new(CircuitBreakerRegistry::new(CoreConfig::default()));
        let empty_client: Arc<dyn ExternalClient> = Arc::new(MockExternalClient::succeeding("empty", vec![]));
        let service = ContentDiscoveryService::new(vec![empty_client], registry, Duration::from_secs(5));

        let outcome = service.discover_sequential(ResearchRunId::new(), "topic", 10, "tester").await.unwrap();
        assert!(outcome.sources.is_empty());
    }
}
