//! Persistence boundary for propagated policies

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use trellis_authorization::AuthorizationPolicy;
use trellis_core::{AuthorizationConfig, PolicyId, Result};

/// Where propagated policies are saved
///
/// `persist_batch` must be all-or-nothing: when it returns an error, none of
/// the batch may be visible to later reads.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Save every policy of a propagation pass
    async fn persist_batch(&self, policies: Vec<AuthorizationPolicy>) -> Result<()>;

    /// Forget policies whose owning nodes were deleted
    async fn remove(&self, ids: &[PolicyId]) -> Result<()>;

    /// Load a single policy
    async fn load(&self, id: &PolicyId) -> Result<Option<AuthorizationPolicy>>;
}

/// Policy store kept in process memory
#[derive(Debug, Clone)]
pub struct InMemoryPolicyStore {
    policies: Arc<RwLock<HashMap<PolicyId, AuthorizationPolicy>>>,
    save_chunk_size: usize,
    large_batch_warning: usize,
}

impl InMemoryPolicyStore {
    pub fn new(config: &AuthorizationConfig) -> Self {
        Self {
            policies: Arc::new(RwLock::new(HashMap::new())),
            save_chunk_size: config.save_chunk_size.max(1) as usize,
            large_batch_warning: config.large_batch_warning as usize,
        }
    }

    pub async fn len(&self) -> usize {
        self.policies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.policies.read().await.is_empty()
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new(&AuthorizationConfig::default())
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn persist_batch(&self, policies: Vec<AuthorizationPolicy>) -> Result<()> {
        if policies.len() > self.large_batch_warning {
            warn!(
                count = policies.len(),
                threshold = self.large_batch_warning,
                "Persisting a large authorization policy batch"
            );
        }

        // One write guard for the whole batch: readers never observe a partial batch
        let mut stored = self.policies.write().await;
        let total = policies.len();
        let mut written = 0;
        for chunk in policies.chunks(self.save_chunk_size) {
            for policy in chunk {
                stored.insert(policy.id(), policy.clone());
            }
            written += chunk.len();
            debug!(written, total, "Persisted policy chunk");
        }
        Ok(())
    }

    async fn remove(&self, ids: &[PolicyId]) -> Result<()> {
        let mut stored = self.policies.write().await;
        for id in ids {
            stored.remove(id);
        }
        debug!(count = ids.len(), "Removed policies");
        Ok(())
    }

    async fn load(&self, id: &PolicyId) -> Result<Option<AuthorizationPolicy>> {
        Ok(self.policies.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_authorization::ResourceKind;

    #[tokio::test]
    async fn persists_batches_larger_than_a_chunk() {
        let config = AuthorizationConfig {
            save_chunk_size: 2,
            large_batch_warning: 3,
            ..AuthorizationConfig::default()
        };
        let store = InMemoryPolicyStore::new(&config);
        let batch: Vec<_> = (0..5)
            .map(|_| AuthorizationPolicy::new(ResourceKind::Post))
            .collect();

        store.persist_batch(batch.clone()).await.unwrap();
        assert_eq!(store.len().await, 5);
        for policy in &batch {
            assert_eq!(store.load(&policy.id()).await.unwrap().as_ref(), Some(policy));
        }

        store.remove(&[batch[0].id()]).await.unwrap();
        assert!(store.load(&batch[0].id()).await.unwrap().is_none());
    }
}
