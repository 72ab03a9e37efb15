//! # Downloader Service
//!
//! One [`Downloader`] per stream kind. A round lists new signature files,
//! then handles them strictly in order:
//!
//! 1. fetch the signature file from every node of the effective address
//!    book, in parallel and bounded by `max_concurrent_fetches`, verifying
//!    each as it arrives
//! 2. decide quorum, stopping early once the outcome can no longer change
//! 3. download a body whose SHA-384 equals the agreed hash, trying voters in
//!    ascending node id order
//! 4. read it, check the metadata hash and continuity with the last file
//! 5. hand it to the consumer, which parses and commits it with the cursor

use crate::domain::chain::{verify_continuity, StreamCursor};
use crate::domain::config::DownloaderConfig;
use crate::domain::date_range::{DateRange, DateRangeCalculator};
use crate::domain::errors::DownloaderError;
use crate::domain::state::{RoundState, RoundTracker};
use crate::ports::inbound::{DownloaderApi, RoundSummary};
use crate::ports::outbound::{StreamFileConsumer, StreamFileNotifier};
use async_trait::async_trait;
use mirror_telemetry::{log_file_event, log_node_event, metrics};
use mn_01_address_book::{AddressBook, AddressBookApi};
use mn_02_signature_verification::{NodeSignature, QuorumResult, SignatureVerificationApi};
use mn_03_stream_files::{StreamFile, StreamFileData, StreamFileProvider, StreamFileReader};
use shared_types::{EntityId, StreamFilename, StreamType};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Collaborators of a downloader.
pub struct DownloaderPorts<F: StreamFile> {
    pub provider: Arc<dyn StreamFileProvider>,
    pub address_book: Arc<dyn AddressBookApi>,
    pub verifier: Arc<dyn SignatureVerificationApi>,
    pub consumer: Arc<dyn StreamFileConsumer<F>>,
    pub notifier: Arc<dyn StreamFileNotifier>,
}

pub struct Downloader<R: StreamFileReader> {
    stream_type: StreamType,
    config: DownloaderConfig,
    date_range: DateRangeCalculator,
    reader: R,
    ports: DownloaderPorts<R::File>,
    /// Held for the duration of a round.
    round: Mutex<RoundTracker>,
}

impl<R: StreamFileReader> Downloader<R> {
    pub fn new(
        stream_type: StreamType,
        config: DownloaderConfig,
        date_range: DateRangeCalculator,
        reader: R,
        ports: DownloaderPorts<R::File>,
    ) -> Self {
        Self {
            stream_type,
            config,
            date_range,
            reader,
            ports,
            round: Mutex::new(RoundTracker::default()),
        }
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Disabled balance downloads still run until a first file exists.
    fn should_download(&self, last: Option<&StreamCursor>) -> bool {
        self.config.enabled || (self.stream_type == StreamType::Balance && last.is_none())
    }

    // =========================================================================
    // LISTING
    // =========================================================================

    async fn list_signatures(
        &self,
        range: &DateRange,
    ) -> Result<Vec<StreamFilename>, DownloaderError> {
        let at = range.start_after.unwrap_or(0).max(0);
        let book = match self.ports.address_book.nodes_effective_at(at) {
            Ok(book) => book,
            Err(_) => self.ports.address_book.current(),
        };
        let start_after = range.start_after_filename(self.stream_type);
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let mut tasks = JoinSet::new();

        for node in book.nodes() {
            let provider = Arc::clone(&self.ports.provider);
            let semaphore = Arc::clone(&semaphore);
            let start_after = start_after.clone();
            let account = node.node_account_id;
            let node_id = node.node_id;
            let stream_type = self.stream_type;
            let limit = self.config.batch_size;
            let node_timeout = self.config.node_timeout;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let listed = timeout(
                    node_timeout,
                    provider.list(account, stream_type, start_after.as_ref(), limit),
                )
                .await;
                (node_id, listed)
            });
        }

        let mut names = BTreeSet::new();
        let mut responded = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Ok(listed)))) => {
                    responded += 1;
                    names.extend(
                        listed
                            .into_iter()
                            .filter(|name| range.contains(name.instant))
                            .map(|name| name.to_signature()),
                    );
                }
                Ok((node_id, Ok(Err(e)))) => {
                    log_node_event!(warn, self.stream_type, node_id, "Listing failed", error = %e)
                }
                Ok((node_id, Err(_))) => {
                    log_node_event!(warn, self.stream_type, node_id, "Listing timed out")
                }
                Err(e) => warn!(error = %e, "Listing task failed"),
            }
        }

        if responded == 0 && !book.is_empty() {
            return Err(DownloaderError::Timeout {
                stage: "listing on every node",
            });
        }
        Ok(names.into_iter().take(self.config.batch_size).collect())
    }

    // =========================================================================
    // ONE FILE
    // =========================================================================

    async fn process_file(
        &self,
        tracker: &mut RoundTracker,
        name: &StreamFilename,
        last: Option<&StreamCursor>,
    ) -> Result<StreamCursor, DownloaderError> {
        let book = self.ports.address_book.nodes_effective_at(name.instant)?;
        let file = match timeout(
            self.config.round_timeout,
            self.verified_file(tracker, name, &book, last),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(DownloaderError::Timeout { stage: "round" }),
        };

        let cursor = StreamCursor::new(name, &file);
        let _timer = metrics::ParseTimer::start(self.stream_type.as_str());
        self.ports.consumer.consume(file).await?;
        tracker.advance(RoundState::Committed)?;
        Ok(cursor)
    }

    async fn verified_file(
        &self,
        tracker: &mut RoundTracker,
        name: &StreamFilename,
        book: &Arc<AddressBook>,
        last: Option<&StreamCursor>,
    ) -> Result<R::File, DownloaderError> {
        let mut signatures = self.fetch_signatures(name, book).await;

        tracker.advance(RoundState::Verifying)?;
        let quorum = self.ports.verifier.reach_quorum(&mut signatures, book)?;
        tracker.advance(RoundState::QuorumReached)?;
        log_file_event!(
            debug,
            self.stream_type,
            name,
            "Quorum reached",
            weight = quorum.weight as u64,
            total = quorum.total as u64,
            signatures = signatures.len()
        );

        tracker.advance(RoundState::Parsing)?;
        let (data, node) = self.download_body(name, &quorum, book).await?;
        let mut file = self.reader.read_verified(&data, &quorum.file_hash)?;
        if let Some(actual) = file.metadata_hash() {
            if actual != quorum.metadata_hash {
                return Err(DownloaderError::MetadataHashMismatch {
                    filename: file.name().to_string(),
                    expected: quorum.metadata_hash,
                    actual,
                });
            }
        }
        verify_continuity(last, &file)?;
        file.set_node(node);
        Ok(file)
    }

    async fn fetch_signatures(
        &self,
        name: &StreamFilename,
        book: &Arc<AddressBook>,
    ) -> Vec<NodeSignature> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let fetch = SignatureFetch {
            provider: Arc::clone(&self.ports.provider),
            verifier: Arc::clone(&self.ports.verifier),
            book: Arc::clone(book),
            filename: name.to_signature(),
            node_timeout: self.config.node_timeout,
        };
        let mut tasks = JoinSet::new();
        for node in book.nodes() {
            let fetch = fetch.clone();
            let semaphore = Arc::clone(&semaphore);
            let node_id = node.node_id;
            let account = node.node_account_id;
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (node_id, fetch.run(node_id, account).await)
            });
        }

        let mut signatures = Vec::with_capacity(book.len());
        while let Some(joined) = tasks.join_next().await {
            let (node_id, result) = match joined {
                Ok(joined) => joined,
                Err(e) => {
                    warn!(error = %e, "Signature task failed");
                    continue;
                }
            };
            match result {
                Ok(signature) => {
                    let outcome = if signature.is_verified() {
                        "ok"
                    } else {
                        "not_verified"
                    };
                    metrics::record_node_fetch(self.stream_type.as_str(), outcome);
                    signatures.push(signature);
                    if self.is_decided(&signatures, book) {
                        log_file_event!(
                            debug,
                            self.stream_type,
                            name,
                            "Quorum decided early",
                            pending = tasks.len()
                        );
                        tasks.abort_all();
                        break;
                    }
                }
                Err(e) => {
                    let outcome = match &e {
                        DownloaderError::Provider(p) if p.is_not_found() => "not_found",
                        DownloaderError::Timeout { .. } => "timeout",
                        _ => "error",
                    };
                    metrics::record_node_fetch(self.stream_type.as_str(), outcome);
                    log_node_event!(
                        debug,
                        self.stream_type,
                        node_id,
                        "No signature from node",
                        filename = %name,
                        error = %e
                    );
                }
            }
        }
        signatures
    }

    /// Whether the votes so far already settle quorum.
    fn is_decided(&self, signatures: &[NodeSignature], book: &AddressBook) -> bool {
        if !self.ports.verifier.is_final() {
            return false;
        }
        let mut trial: Vec<NodeSignature> = signatures
            .iter()
            .filter(|s| s.is_verified())
            .cloned()
            .collect();
        self.ports.verifier.reach_quorum(&mut trial, book).is_ok()
    }

    async fn download_body(
        &self,
        name: &StreamFilename,
        quorum: &QuorumResult,
        book: &AddressBook,
    ) -> Result<(StreamFileData, EntityId), DownloaderError> {
        for node_id in &quorum.nodes {
            let Some(node) = book.node(*node_id) else {
                continue;
            };
            match self.fetch_body(node.node_account_id, name).await {
                Ok(data) if data.hash() == quorum.file_hash => {
                    return Ok((data, node.node_account_id));
                }
                Ok(data) => {
                    log_node_event!(
                        warn,
                        self.stream_type,
                        *node_id,
                        "Body does not match agreed hash",
                        filename = %name,
                        actual = %data.hash()
                    );
                }
                Err(e) => {
                    log_node_event!(
                        warn,
                        self.stream_type,
                        *node_id,
                        "Body download failed",
                        filename = %name,
                        error = %e
                    );
                }
            }
        }
        Err(DownloaderError::NoMatchingBody {
            filename: name.to_data(false).to_string(),
            hash: quorum.file_hash,
        })
    }

    /// Uncompressed name first, then the `.zst` variant.
    async fn fetch_body(
        &self,
        account: EntityId,
        name: &StreamFilename,
    ) -> Result<StreamFileData, DownloaderError> {
        match self.get(account, &name.to_data(false)).await {
            Err(DownloaderError::Provider(e)) if e.is_not_found() => {
                self.get(account, &name.to_data(true)).await
            }
            other => other,
        }
    }

    async fn get(
        &self,
        account: EntityId,
        name: &StreamFilename,
    ) -> Result<StreamFileData, DownloaderError> {
        timeout(self.config.node_timeout, self.ports.provider.get(account, name))
            .await
            .map_err(|_| DownloaderError::Timeout { stage: "body fetch" })?
            .map_err(DownloaderError::from)
    }
}

#[async_trait]
impl<R: StreamFileReader + 'static> DownloaderApi for Downloader<R> {
    fn stream_type(&self) -> StreamType {
        self.stream_type
    }

    async fn download_round(&self) -> Result<RoundSummary, DownloaderError> {
        let Ok(mut tracker) = self.round.try_lock() else {
            debug!(stream_type = %self.stream_type, "Round already in flight");
            return Ok(RoundSummary::skipped());
        };
        let stream_type = self.stream_type.as_str();

        let mut last = self.ports.consumer.last_committed().await?;
        if !self.should_download(last.as_ref()) {
            metrics::record_round(stream_type, "skipped");
            return Ok(RoundSummary::skipped());
        }
        let Some(range) = self.date_range.range(last.as_ref()) else {
            debug!(stream_type, "End date reached");
            return Ok(RoundSummary::default());
        };

        tracker.advance(RoundState::Fetching)?;
        let listed = match timeout(self.config.round_timeout, self.list_signatures(&range)).await
        {
            Ok(listed) => listed,
            Err(_) => Err(DownloaderError::Timeout { stage: "listing" }),
        };
        let names = match listed {
            Ok(names) => names,
            Err(e) => {
                tracker.fail();
                metrics::record_round(stream_type, "error");
                warn!(stream_type, error = %e, "Listing failed");
                return Err(e);
            }
        };
        if names.is_empty() {
            tracker.advance(RoundState::Idle)?;
            metrics::record_round(stream_type, "empty");
            return Ok(RoundSummary::default());
        }

        let mut summary = RoundSummary::default();
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                tracker.advance(RoundState::Fetching)?;
            }
            match self.process_file(&mut tracker, name, last.as_ref()).await {
                Ok(cursor) => {
                    tracker.finish()?;
                    metrics::record_round(stream_type, "committed");
                    metrics::record_last_committed(stream_type, cursor.consensus_end);
                    log_file_event!(
                        info,
                        self.stream_type,
                        cursor.filename,
                        "Committed stream file",
                        count = cursor.count,
                        consensus_end = cursor.consensus_end
                    );
                    self.ports
                        .notifier
                        .committed(self.stream_type, &cursor)
                        .await;
                    last = Some(cursor.clone());
                    summary.committed.push(cursor);
                }
                Err(e) => {
                    let failed = tracker.fail();
                    let outcome = match failed {
                        RoundState::QuorumFailed => "quorum_failed",
                        RoundState::ParseFailed => "parse_failed",
                        _ => "error",
                    };
                    metrics::record_round(stream_type, outcome);
                    log_file_event!(
                        error,
                        self.stream_type,
                        name,
                        "Stream file round failed",
                        state = ?failed,
                        committed = summary.committed.len(),
                        error = %e
                    );
                    return Err(e);
                }
            }
        }
        Ok(summary)
    }
}

/// Everything a per-node signature task needs.
#[derive(Clone)]
struct SignatureFetch {
    provider: Arc<dyn StreamFileProvider>,
    verifier: Arc<dyn SignatureVerificationApi>,
    book: Arc<AddressBook>,
    filename: StreamFilename,
    node_timeout: Duration,
}

impl SignatureFetch {
    /// Fetches and reads the node's signature file and verifies it. A
    /// signature that fails verification is still returned, marked
    /// `NotVerified`.
    async fn run(&self, node_id: i64, account: EntityId) -> Result<NodeSignature, DownloaderError> {
        let data = timeout(self.node_timeout, self.provider.get(account, &self.filename))
            .await
            .map_err(|_| DownloaderError::Timeout {
                stage: "signature fetch",
            })??;
        let mut signature = self.verifier.read_signature(&data, node_id)?;
        let _ = self.verifier.verify_signature(&mut signature, &self.book);
        Ok(signature)
    }
}
