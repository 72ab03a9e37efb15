//! # Stream Types and Filenames
//!
//! Each consensus node publishes one directory per stream type. Files are
//! named after the consensus instant they start at:
//!
//! ```text
//! 2024-03-01T12_00_02.000000123Z.rcd        record file
//! 2024-03-01T12_00_02.000000123Z.rcd.zst    zstd compressed record file
//! 2024-03-01T12_00_02.000000123Z.rcd_sig    detached signature
//! ```

use crate::errors::FilenameError;
use crate::timestamp::{self, ConsensusTimestamp};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const SIGNATURE_SUFFIX: &str = "_sig";
pub const COMPRESSED_SUFFIX: &str = ".zst";

const INSTANT_PARSE_FORMAT: &str = "%Y-%m-%dT%H_%M_%S%.fZ";
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H_%M_%S%.9fZ";

/// Kind of stream published by consensus nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamType {
    Record,
    Balance,
}

impl StreamType {
    pub const ALL: [StreamType; 2] = [StreamType::Record, StreamType::Balance];

    /// Bucket directory holding every node's folder.
    pub fn path(&self) -> &'static str {
        match self {
            StreamType::Record => "recordstreams",
            StreamType::Balance => "accountBalances",
        }
    }

    /// Prefix of each node folder, followed by the node account id.
    pub fn node_prefix(&self) -> &'static str {
        match self {
            StreamType::Record => "record",
            StreamType::Balance => "balance",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            StreamType::Record => "rcd",
            StreamType::Balance => "pb",
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Record => "record",
            StreamType::Balance => "balance",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.extension() == ext)
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed stream filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamFilename {
    pub stream_type: StreamType,
    /// Consensus instant the file starts at.
    pub instant: ConsensusTimestamp,
    pub signature: bool,
    pub compressed: bool,
}

impl StreamFilename {
    /// Uncompressed data file starting at `instant`.
    pub fn data(stream_type: StreamType, instant: ConsensusTimestamp) -> Self {
        Self {
            stream_type,
            instant,
            signature: false,
            compressed: false,
        }
    }

    pub fn parse(filename: &str) -> Result<Self, FilenameError> {
        let (rest, signature) = match filename.strip_suffix(SIGNATURE_SUFFIX) {
            Some(rest) => (rest, true),
            None => (filename, false),
        };
        let (rest, compressed) = match rest.strip_suffix(COMPRESSED_SUFFIX) {
            Some(rest) => (rest, true),
            None => (rest, false),
        };
        let (instant, ext) = rest
            .rsplit_once('.')
            .ok_or_else(|| FilenameError::UnknownExtension(filename.to_string()))?;
        let stream_type = StreamType::from_extension(ext)
            .ok_or_else(|| FilenameError::UnknownExtension(filename.to_string()))?;
        let instant = parse_instant(instant)
            .ok_or_else(|| FilenameError::InvalidInstant(filename.to_string()))?;

        Ok(Self {
            stream_type,
            instant,
            signature,
            compressed,
        })
    }

    /// Signature companion of this file.
    pub fn to_signature(&self) -> Self {
        Self {
            signature: true,
            compressed: false,
            ..self.clone()
        }
    }

    /// Data file this signature belongs to.
    pub fn to_data(&self, compressed: bool) -> Self {
        Self {
            signature: false,
            compressed,
            ..self.clone()
        }
    }

    pub fn filename(&self) -> String {
        let mut name = format!(
            "{}.{}",
            format_instant(self.instant),
            self.stream_type.extension()
        );
        if self.compressed {
            name.push_str(COMPRESSED_SUFFIX);
        }
        if self.signature {
            name.push_str(SIGNATURE_SUFFIX);
        }
        name
    }
}

impl fmt::Display for StreamFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename())
    }
}

impl PartialOrd for StreamFilename {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StreamFilename {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then(self.stream_type.cmp(&other.stream_type))
            .then(self.signature.cmp(&other.signature))
            .then(self.compressed.cmp(&other.compressed))
    }
}

fn parse_instant(s: &str) -> Option<ConsensusTimestamp> {
    let naive = NaiveDateTime::parse_from_str(s, INSTANT_PARSE_FORMAT).ok()?;
    naive.and_utc().timestamp_nanos_opt()
}

fn format_instant(ts: ConsensusTimestamp) -> String {
    let (seconds, nanos) = timestamp::to_seconds_nanos(ts);
    match DateTime::from_timestamp(seconds, nanos as u32) {
        Some(dt) => dt.format(INSTANT_FORMAT).to_string(),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "2024-03-01T12_00_02.000000123Z.rcd";

    #[test]
    fn test_parse_data_file() {
        let parsed = StreamFilename::parse(NAME).unwrap();
        assert_eq!(parsed.stream_type, StreamType::Record);
        assert!(!parsed.signature);
        assert!(!parsed.compressed);
        assert_eq!(parsed.instant % 1_000_000_000, 123);
        assert_eq!(parsed.filename(), NAME);
    }

    #[test]
    fn test_parse_signature_and_compressed() {
        let sig = StreamFilename::parse("2024-03-01T12_00_02.000000123Z.rcd_sig").unwrap();
        assert!(sig.signature);
        let zst = StreamFilename::parse("2024-03-01T12_00_02.000000123Z.rcd.zst").unwrap();
        assert!(zst.compressed);
        assert_eq!(zst.to_signature(), sig);
        assert_eq!(sig.to_data(true).filename(), "2024-03-01T12_00_02.000000123Z.rcd.zst");
    }

    #[test]
    fn test_balance_and_short_fraction() {
        let parsed = StreamFilename::parse("2019-08-30T18_15_00.016002001Z.pb").unwrap();
        assert_eq!(parsed.stream_type, StreamType::Balance);
        let short = StreamFilename::parse("2019-08-30T18_10_00.419072Z.rcd").unwrap();
        assert_eq!(short.filename(), "2019-08-30T18_10_00.419072000Z.rcd");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            StreamFilename::parse("2024-03-01T12_00_02Z.txt"),
            Err(FilenameError::UnknownExtension(_))
        ));
        assert!(matches!(
            StreamFilename::parse("yesterday.rcd"),
            Err(FilenameError::InvalidInstant(_))
        ));
        assert!(StreamFilename::parse("rcd").is_err());
    }

    #[test]
    fn test_ordering_by_instant() {
        let a = StreamFilename::data(StreamType::Record, 1_000);
        let b = StreamFilename::data(StreamType::Record, 2_000);
        assert!(a < b);
        assert!(a.filename() < b.filename());
    }

    #[test]
    fn test_layout_names() {
        assert_eq!(StreamType::Record.path(), "recordstreams");
        assert_eq!(StreamType::Balance.path(), "accountBalances");
        assert_eq!(StreamType::Balance.node_prefix(), "balance");
        assert_eq!(StreamType::from_extension("pb"), Some(StreamType::Balance));
    }
}
