//! Committed-file notifications.

use crate::domain::chain::StreamCursor;
use crate::ports::outbound::StreamFileNotifier;
use async_trait::async_trait;
use shared_bus::{EventPublisher, MirrorEvent};
use shared_types::StreamType;
use std::sync::Arc;
use tracing::debug;

/// Publishes `StreamFileParsed` for every committed file.
pub struct BusNotifier {
    bus: Arc<dyn EventPublisher>,
}

impl BusNotifier {
    pub fn new(bus: Arc<dyn EventPublisher>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl StreamFileNotifier for BusNotifier {
    async fn committed(&self, stream_type: StreamType, cursor: &StreamCursor) {
        let receivers = self
            .bus
            .publish(MirrorEvent::StreamFileParsed {
                stream_type,
                filename: cursor.filename.to_string(),
                consensus_start: cursor.consensus_start,
                consensus_end: cursor.consensus_end,
                count: cursor.count,
                hash: cursor.hash,
                index: cursor.index,
            })
            .await;
        debug!(filename = %cursor.filename, receivers, "Published stream file");
    }
}

pub struct NoopNotifier;

#[async_trait]
impl StreamFileNotifier for NoopNotifier {
    async fn committed(&self, _stream_type: StreamType, _cursor: &StreamCursor) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventFilter, InMemoryEventBus};
    use shared_types::{Sha384Hash, StreamFilename};

    #[tokio::test]
    async fn test_publishes_stream_file_parsed() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut subscription = bus.subscribe(EventFilter::all());
        let notifier = BusNotifier::new(bus.clone());
        let cursor = StreamCursor {
            filename: StreamFilename::data(StreamType::Record, 5),
            consensus_start: 5,
            consensus_end: 9,
            hash: Sha384Hash::ZERO,
            index: Some(3),
            count: 2,
        };

        notifier.committed(StreamType::Record, &cursor).await;

        match subscription.recv().await {
            Some(MirrorEvent::StreamFileParsed {
                consensus_end,
                index,
                count,
                ..
            }) => {
                assert_eq!(consensus_end, 9);
                assert_eq!(index, Some(3));
                assert_eq!(count, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
