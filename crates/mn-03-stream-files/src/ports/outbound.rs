//! # Outbound Ports (Driven Ports)
//!
//! Read-only access to the artifacts consensus nodes publish.
//!
//! Production: `LocalStreamFileProvider` over a mirrored bucket directory.
//! Testing: `InMemoryStreamFileProvider`.

use crate::domain::errors::ProviderError;
use crate::domain::stream_file::StreamFileData;
use async_trait::async_trait;
use shared_types::{EntityId, StreamFilename, StreamType};

/// Fetches stream artifacts for one node.
///
/// Artifacts live at
/// `{root}/{stream_type.path}/{stream_type.node_prefix}{shard.realm.num}/{filename}`.
#[async_trait]
pub trait StreamFileProvider: Send + Sync {
    /// Fetches one artifact. Compressed artifacts are returned inflated.
    async fn get(
        &self,
        node: EntityId,
        filename: &StreamFilename,
    ) -> Result<StreamFileData, ProviderError>;

    /// Lists up to `limit` signature files of `stream_type` published by
    /// `node` strictly after `start_after`, oldest first.
    async fn list(
        &self,
        node: EntityId,
        stream_type: StreamType,
        start_after: Option<&StreamFilename>,
        limit: usize,
    ) -> Result<Vec<StreamFilename>, ProviderError>;
}

/// Relative path of an artifact under the provider root.
pub fn artifact_path(node: EntityId, filename: &StreamFilename) -> String {
    format!("{}/{}", node_directory(node, filename.stream_type), filename)
}

/// Relative directory holding one node's artifacts of a stream type.
pub fn node_directory(node: EntityId, stream_type: StreamType) -> String {
    format!(
        "{}/{}{}",
        stream_type.path(),
        stream_type.node_prefix(),
        node
    )
}

/// Keeps signature names after `start_after`, sorted, capped at `limit`.
pub(crate) fn select_signatures(
    mut names: Vec<StreamFilename>,
    start_after: Option<&StreamFilename>,
    limit: usize,
) -> Vec<StreamFilename> {
    names.retain(|name| {
        name.signature && start_after.map_or(true, |after| name.instant > after.instant)
    });
    names.sort();
    names.dedup();
    names.truncate(limit);
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path() {
        let node = EntityId::encode(0, 0, 3).unwrap();
        let name = StreamFilename::parse("2024-03-01T12_00_02.000000123Z.rcd_sig").unwrap();
        assert_eq!(
            artifact_path(node, &name),
            "recordstreams/record0.0.3/2024-03-01T12_00_02.000000123Z.rcd_sig"
        );
    }

    #[test]
    fn test_select_signatures() {
        let sig = |instant| StreamFilename::data(StreamType::Record, instant).to_signature();
        let names = vec![sig(3), sig(1), StreamFilename::data(StreamType::Record, 2), sig(2)];

        let selected = select_signatures(names.clone(), Some(&sig(1)), 10);
        assert_eq!(selected, vec![sig(2), sig(3)]);
        assert_eq!(select_signatures(names, None, 1), vec![sig(1)]);
    }
}
