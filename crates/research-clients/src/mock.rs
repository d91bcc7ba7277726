//! Test double for `ExternalClient` that never touches the network.

use async_trait::async_trait;
use research_contracts::{CoreError, ExternalClient, RawItem, UnavailableReason};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub struct MockExternalClient {
    name: String,
    items: Mutex<Vec<RawItem>>,
    fail_always: bool,
    call_count: AtomicUsize,
}

impl MockExternalClient {
    pub fn succeeding(name: impl Into<String>, items: Vec<RawItem>) -> Self {
        Self { name: name.into(), items: Mutex::new(items), fail_always: false, call_count: AtomicUsize::new(0) }
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self { name: name.into(), items: Mutex::new(Vec::new()), fail_always: true, call_count: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ExternalClient for MockExternalClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str, limit: usize, _deadline: Duration) -> Result<Vec<RawItem>, CoreError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_always {
            return Err(CoreError::unavailable(
                self.name.clone(),
                UnavailableReason::DependencyFailure,
                "mock client configured to fail",
            ));
        }
        let items = self.items.lock().await;
        Ok(items.iter().take(limit).cloned().collect())
    }
}
