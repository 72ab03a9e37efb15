//! # Leader Lease
//!
//! Keeps at most one importer instance downloading a stream kind. The lease
//! file records an owner and an expiry; an `fs2` exclusive lock is held only
//! while the record is read and rewritten. A holder renews by acquiring
//! again before the expiry. An expired lease is taken over by whoever asks
//! next.

use crate::domain::errors::DownloaderError;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct LeaseRecord {
    owner: String,
    expires_at_ms: u64,
}

#[derive(Debug)]
pub struct LeaderLease {
    path: PathBuf,
    owner: String,
    duration: Duration,
    expires_at_ms: Option<u64>,
}

impl LeaderLease {
    pub fn new(dir: &Path, name: &str, duration: Duration) -> Self {
        let owner = format!("{}-{}", std::process::id(), now_ms());
        Self::with_owner(dir, name, duration, owner)
    }

    pub fn with_owner(dir: &Path, name: &str, duration: Duration, owner: String) -> Self {
        Self {
            path: dir.join(format!("{name}.lease")),
            owner,
            duration,
            expires_at_ms: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Whether this instance holds an unexpired lease.
    pub fn is_held(&self) -> bool {
        self.expires_at_ms.map_or(false, |expiry| expiry > now_ms())
    }

    /// Acquires or renews the lease. Returns `false` while another owner
    /// holds an unexpired lease.
    pub fn try_acquire(&mut self) -> Result<bool, DownloaderError> {
        let file = self.open()?;
        FileExt::lock_exclusive(&file).map_err(|e| self.error(e))?;
        let result = self.acquire_locked(&file);
        let _ = FileExt::unlock(&file);
        result
    }

    /// Gives the lease up if this instance holds it.
    pub fn release(&mut self) -> Result<(), DownloaderError> {
        if self.expires_at_ms.take().is_none() {
            return Ok(());
        }
        let file = self.open()?;
        FileExt::lock_exclusive(&file).map_err(|e| self.error(e))?;
        let result = match read_record(&file) {
            Some(record) if record.owner == self.owner => {
                file.set_len(0).map_err(|e| self.error(e))
            }
            _ => Ok(()),
        };
        let _ = FileExt::unlock(&file);
        info!(path = %self.path.display(), "Released leader lease");
        result
    }

    fn acquire_locked(&mut self, file: &File) -> Result<bool, DownloaderError> {
        let now = now_ms();
        if let Some(record) = read_record(file) {
            if record.owner != self.owner && record.expires_at_ms > now {
                debug!(
                    path = %self.path.display(),
                    holder = %record.owner,
                    "Leader lease held elsewhere"
                );
                self.expires_at_ms = None;
                return Ok(false);
            }
        }

        let renewing = self.expires_at_ms.is_some();
        let record = LeaseRecord {
            owner: self.owner.clone(),
            expires_at_ms: now.saturating_add(self.duration.as_millis() as u64),
        };
        let bytes = serde_json::to_vec(&record).map_err(|e| self.error(e))?;
        let mut writer = file;
        writer.set_len(0).map_err(|e| self.error(e))?;
        writer.seek(SeekFrom::Start(0)).map_err(|e| self.error(e))?;
        writer.write_all(&bytes).map_err(|e| self.error(e))?;
        writer.sync_all().map_err(|e| self.error(e))?;

        self.expires_at_ms = Some(record.expires_at_ms);
        if !renewing {
            info!(path = %self.path.display(), owner = %self.owner, "Acquired leader lease");
        }
        Ok(true)
    }

    fn open(&self) -> Result<File, DownloaderError> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.error(e))
    }

    fn error(&self, e: impl std::fmt::Display) -> DownloaderError {
        DownloaderError::Lease {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

impl Drop for LeaderLease {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

fn read_record(file: &File) -> Option<LeaseRecord> {
    let mut reader = file;
    let mut contents = String::new();
    reader.seek(SeekFrom::Start(0)).ok()?;
    reader.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lease(dir: &Path, owner: &str, duration: Duration) -> LeaderLease {
        LeaderLease::with_owner(dir, "record", duration, owner.to_string())
    }

    #[test]
    fn test_single_holder() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = lease(dir.path(), "a", Duration::from_secs(60));
        let mut b = lease(dir.path(), "b", Duration::from_secs(60));

        assert!(a.try_acquire().unwrap());
        assert!(a.is_held());
        assert!(!b.try_acquire().unwrap());
        assert!(!b.is_held());

        // Renewal by the holder.
        assert!(a.try_acquire().unwrap());
    }

    #[test]
    fn test_expired_lease_taken_over() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = lease(dir.path(), "a", Duration::from_millis(1));
        let mut b = lease(dir.path(), "b", Duration::from_secs(60));

        assert!(a.try_acquire().unwrap());
        std::thread::sleep(Duration::from_millis(20));
        assert!(!a.is_held());
        assert!(b.try_acquire().unwrap());
        assert!(!a.try_acquire().unwrap());
    }

    #[test]
    fn test_release_hands_over() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = lease(dir.path(), "a", Duration::from_secs(60));
        let mut b = lease(dir.path(), "b", Duration::from_secs(60));

        assert!(a.try_acquire().unwrap());
        a.release().unwrap();
        assert!(b.try_acquire().unwrap());
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut a = lease(dir.path(), "a", Duration::from_secs(60));
            assert!(a.try_acquire().unwrap());
        }
        let mut b = lease(dir.path(), "b", Duration::from_secs(60));
        assert!(b.try_acquire().unwrap());
    }
}
