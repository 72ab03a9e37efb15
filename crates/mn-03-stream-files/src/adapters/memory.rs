//! In-memory provider for tests and replay tooling.

use crate::domain::errors::ProviderError;
use crate::domain::stream_file::StreamFileData;
use crate::ports::outbound::{artifact_path, select_signatures, StreamFileProvider};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{EntityId, StreamFilename, StreamType};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Serves artifacts from a map; individual nodes can be made unreachable
/// or slow.
#[derive(Debug, Default)]
pub struct InMemoryStreamFileProvider {
    files: RwLock<HashMap<(EntityId, StreamFilename), Vec<u8>>>,
    offline: RwLock<HashSet<EntityId>>,
    delays: RwLock<HashMap<EntityId, Duration>>,
}

impl InMemoryStreamFileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, node: EntityId, filename: StreamFilename, bytes: Vec<u8>) {
        self.files.write().insert((node, filename), bytes);
    }

    pub fn remove(&self, node: EntityId, filename: &StreamFilename) {
        self.files.write().remove(&(node, filename.clone()));
    }

    /// Makes every request for `node` fail with an I/O error.
    pub fn set_offline(&self, node: EntityId, offline: bool) {
        let mut set = self.offline.write();
        if offline {
            set.insert(node);
        } else {
            set.remove(&node);
        }
    }

    /// Delays every response for `node`.
    pub fn set_delay(&self, node: EntityId, delay: Duration) {
        self.delays.write().insert(node, delay);
    }

    async fn before_request(&self, node: EntityId) -> Result<(), ProviderError> {
        let delay = self.delays.read().get(&node).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.read().contains(&node) {
            return Err(ProviderError::Io {
                path: node.to_string(),
                reason: "node unreachable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StreamFileProvider for InMemoryStreamFileProvider {
    async fn get(
        &self,
        node: EntityId,
        filename: &StreamFilename,
    ) -> Result<StreamFileData, ProviderError> {
        self.before_request(node).await?;
        let bytes = self
            .files
            .read()
            .get(&(node, filename.clone()))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                path: artifact_path(node, filename),
            })?;
        Ok(StreamFileData::new(filename.clone(), bytes)?)
    }

    async fn list(
        &self,
        node: EntityId,
        stream_type: StreamType,
        start_after: Option<&StreamFilename>,
        limit: usize,
    ) -> Result<Vec<StreamFilename>, ProviderError> {
        self.before_request(node).await?;
        let names = self
            .files
            .read()
            .keys()
            .filter(|(owner, name)| *owner == node && name.stream_type == stream_type)
            .map(|(_, name)| name.clone())
            .collect();
        Ok(select_signatures(names, start_after, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_list() {
        let provider = InMemoryStreamFileProvider::new();
        let node = EntityId::encode(0, 0, 3).unwrap();
        let data = StreamFilename::data(StreamType::Record, 5);
        provider.put(node, data.clone(), b"body".to_vec());
        provider.put(node, data.to_signature(), b"sig".to_vec());

        assert_eq!(provider.get(node, &data).await.unwrap().bytes(), b"body");
        assert_eq!(
            provider.list(node, StreamType::Record, None, 5).await.unwrap(),
            vec![data.to_signature()]
        );
        assert!(provider
            .list(node, StreamType::Balance, None, 5)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_offline_node() {
        let provider = InMemoryStreamFileProvider::new();
        let node = EntityId::encode(0, 0, 3).unwrap();
        let data = StreamFilename::data(StreamType::Record, 5);
        provider.put(node, data.clone(), b"body".to_vec());
        provider.set_offline(node, true);

        assert!(matches!(
            provider.get(node, &data).await,
            Err(ProviderError::Io { .. })
        ));
        provider.set_offline(node, false);
        assert!(provider.get(node, &data).await.is_ok());
    }
}
