//! In-memory stream file consumer.

use crate::domain::chain::StreamCursor;
use crate::domain::errors::DownloaderError;
use crate::ports::outbound::StreamFileConsumer;
use async_trait::async_trait;
use mn_03_stream_files::StreamFile;
use parking_lot::Mutex;
use shared_types::StreamFilename;

/// Keeps consumed files in memory. `fail_next` makes the next `consume`
/// fail without recording anything.
pub struct InMemoryStreamFileConsumer<F> {
    files: Mutex<Vec<F>>,
    cursor: Mutex<Option<StreamCursor>>,
    fail_next: Mutex<usize>,
}

impl<F> Default for InMemoryStreamFileConsumer<F> {
    fn default() -> Self {
        Self {
            files: Mutex::new(Vec::new()),
            cursor: Mutex::new(None),
            fail_next: Mutex::new(0),
        }
    }
}

impl<F: StreamFile + Clone> InMemoryStreamFileConsumer<F> {
    pub fn with_cursor(cursor: StreamCursor) -> Self {
        let consumer = Self::default();
        *consumer.cursor.lock() = Some(cursor);
        consumer
    }

    pub fn files(&self) -> Vec<F> {
        self.files.lock().clone()
    }

    pub fn fail_next(&self, count: usize) {
        *self.fail_next.lock() = count;
    }
}

#[async_trait]
impl<F: StreamFile + Clone> StreamFileConsumer<F> for InMemoryStreamFileConsumer<F> {
    async fn last_committed(&self) -> Result<Option<StreamCursor>, DownloaderError> {
        Ok(self.cursor.lock().clone())
    }

    async fn consume(&self, file: F) -> Result<(), DownloaderError> {
        {
            let mut fail_next = self.fail_next.lock();
            if *fail_next > 0 {
                *fail_next -= 1;
                return Err(DownloaderError::Consumer(format!(
                    "injected failure for {}",
                    file.name()
                )));
            }
        }
        let filename = StreamFilename::parse(file.name())
            .map_err(|e| DownloaderError::Consumer(e.to_string()))?;
        *self.cursor.lock() = Some(StreamCursor::new(&filename, &file));
        self.files.lock().push(file);
        Ok(())
    }
}
