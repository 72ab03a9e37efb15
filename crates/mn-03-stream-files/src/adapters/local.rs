//! Filesystem provider over a mirrored bucket directory.

use crate::domain::errors::ProviderError;
use crate::domain::stream_file::StreamFileData;
use crate::ports::outbound::{artifact_path, node_directory, select_signatures, StreamFileProvider};
use async_trait::async_trait;
use shared_types::{EntityId, StreamFilename, StreamType};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Upper bound on a single artifact, guarding against runaway reads.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 512 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct LocalStreamFileProvider {
    root: PathBuf,
    max_file_size: u64,
}

impl LocalStreamFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn io_error(path: &Path, error: std::io::Error) -> ProviderError {
    let path = path.display().to_string();
    if error.kind() == ErrorKind::NotFound {
        ProviderError::NotFound { path }
    } else {
        ProviderError::Io {
            path,
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl StreamFileProvider for LocalStreamFileProvider {
    async fn get(
        &self,
        node: EntityId,
        filename: &StreamFilename,
    ) -> Result<StreamFileData, ProviderError> {
        let path = self.root.join(artifact_path(node, filename));
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        if metadata.len() > self.max_file_size {
            return Err(ProviderError::TooLarge {
                path: path.display().to_string(),
                max: self.max_file_size,
            });
        }

        let bytes = tokio::fs::read(&path).await.map_err(|e| io_error(&path, e))?;
        trace!(path = %path.display(), len = bytes.len(), "Fetched stream artifact");
        Ok(StreamFileData::new(filename.clone(), bytes)?)
    }

    async fn list(
        &self,
        node: EntityId,
        stream_type: StreamType,
        start_after: Option<&StreamFilename>,
        limit: usize,
    ) -> Result<Vec<StreamFilename>, ProviderError> {
        let dir = self.root.join(node_directory(node, stream_type));
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&dir, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match StreamFilename::parse(name) {
                Ok(parsed) if parsed.stream_type == stream_type => names.push(parsed),
                Ok(_) => {}
                Err(e) => debug!(path = %dir.display(), error = %e, "Skipping unrecognized file"),
            }
        }
        Ok(select_signatures(names, start_after, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, node: EntityId, name: &StreamFilename, bytes: &[u8]) {
        let path = root.join(artifact_path(node, name));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let dir = TempDir::new().unwrap();
        let node = EntityId::encode(0, 0, 3).unwrap();
        let data = StreamFilename::data(StreamType::Record, 1_000);
        write(dir.path(), node, &data, b"body");
        write(dir.path(), node, &data.to_signature(), b"sig");
        std::fs::write(
            dir.path()
                .join(node_directory(node, StreamType::Record))
                .join("README"),
            b"x",
        )
        .unwrap();

        let provider = LocalStreamFileProvider::new(dir.path());
        let fetched = provider.get(node, &data).await.unwrap();
        assert_eq!(fetched.bytes(), b"body");

        let listed = provider
            .list(node, StreamType::Record, None, 10)
            .await
            .unwrap();
        assert_eq!(listed, vec![data.to_signature()]);

        let after = provider
            .list(node, StreamType::Record, Some(&data), 10)
            .await
            .unwrap();
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn test_missing_artifacts() {
        let dir = TempDir::new().unwrap();
        let node = EntityId::encode(0, 0, 4).unwrap();
        let provider = LocalStreamFileProvider::new(dir.path());

        let err = provider
            .get(node, &StreamFilename::data(StreamType::Record, 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(provider
            .list(node, StreamType::Balance, None, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_oversized_file_rejected() {
        let dir = TempDir::new().unwrap();
        let node = EntityId::encode(0, 0, 3).unwrap();
        let data = StreamFilename::data(StreamType::Record, 1);
        write(dir.path(), node, &data, &[0u8; 64]);

        let provider = LocalStreamFileProvider::new(dir.path()).with_max_file_size(16);
        let err = provider.get(node, &data).await.unwrap_err();
        assert!(matches!(err, ProviderError::TooLarge { max: 16, .. }));
    }
}
