//! # Outbound Ports (Driven Ports)
//!
//! - [`StreamFileConsumer`] parses and persists a verified file, and owns
//!   the last committed cursor
//! - [`StreamFileNotifier`] announces committed files

use crate::domain::chain::StreamCursor;
use crate::domain::errors::DownloaderError;
use async_trait::async_trait;
use mn_03_stream_files::StreamFile;

#[async_trait]
pub trait StreamFileConsumer<F: StreamFile>: Send + Sync {
    /// The cursor committed together with the last consumed file.
    async fn last_committed(&self) -> Result<Option<StreamCursor>, DownloaderError>;

    /// Parses and persists `file`, advancing the cursor in the same commit.
    /// Nothing is persisted when this fails.
    async fn consume(&self, file: F) -> Result<(), DownloaderError>;
}

#[async_trait]
pub trait StreamFileNotifier: Send + Sync {
    async fn committed(&self, stream_type: shared_types::StreamType, cursor: &StreamCursor);
}
