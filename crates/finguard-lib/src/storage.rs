// ============================
// crates/finguard-lib/src/storage.rs
// ============================
//! Audit log persistence: a capacity-bounded, append-only log.
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use finguard_common::AuditLogEntry;
use parking_lot::Mutex;
use tokio::fs as tokio_fs;

use crate::error::AppError;

/// Default number of retained audit entries
pub const DEFAULT_AUDIT_CAPACITY: usize = 100;

/// Trait for audit log backends.
///
/// Implementations retain at most their configured capacity and evict the
/// oldest entries first.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one entry, evicting the oldest ones beyond capacity
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AppError>;

    /// Read up to `limit` of the most recent entries, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AppError>;
}

/// Newest-first view over a chronological slice
fn newest_first<'a, I>(entries: I, limit: usize) -> Vec<AuditLogEntry>
where
    I: DoubleEndedIterator<Item = &'a AuditLogEntry>,
{
    entries.rev().take(limit).cloned().collect()
}

/// In-memory ring of audit entries
#[derive(Debug)]
pub struct MemoryAuditStore {
    entries: Mutex<VecDeque<AuditLogEntry>>,
    capacity: usize,
}

impl MemoryAuditStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }
}

impl Default for MemoryAuditStore {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AppError> {
        let mut entries = self.entries.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AppError> {
        let entries = self.entries.lock();
        Ok(newest_first(entries.iter(), limit))
    }
}

/// Flat-file implementation: the whole log is one JSON array on disk
#[derive(Debug, Clone)]
pub struct FlatFileAuditStore {
    path: PathBuf,
    capacity: usize,
}

impl FlatFileAuditStore {
    pub fn new<P: AsRef<Path>>(path: P, capacity: usize) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path, capacity })
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<AuditLogEntry>, AppError> {
        if !tokio_fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }

        let content = tokio_fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_all(&self, entries: &[AuditLogEntry]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(entries)?;

        // write to a sibling file first so a crash never leaves half an array
        let tmp = self.path.with_extension("json.tmp");
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl AuditStore for FlatFileAuditStore {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AppError> {
        let mut entries = self.read_all().await?;
        entries.push(entry);
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        self.write_all(&entries).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AppError> {
        let entries = self.read_all().await?;
        Ok(newest_first(entries.iter(), limit))
    }
}
