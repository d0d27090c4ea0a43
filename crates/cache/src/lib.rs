// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persisted local validation cache.
//!
//! A per-device, write-through fast path used to short-circuit duplicate
//! scans before the remote round-trip completes. Entries are a possibly
//! stale projection of the authoritative ticket state, keyed by QR code.
//!
//! Persistence is a whole-file JSON rewrite of the key-to-entry map on
//! every mutation. There is no incremental log: ticket sets are event
//! scale (thousands, not millions) and writes are infrequent relative
//! to reads.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

use porteiro_domain::{CachedTicket, Ticket, TicketStatus};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from cache persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache contents could not be serialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The per-device validation cache.
///
/// Single-owner within a process; the validation engine serializes
/// access. Never shared across processes.
#[derive(Debug)]
pub struct LocalValidationCache {
    path: PathBuf,
    entries: HashMap<String, CachedTicket>,
}

impl LocalValidationCache {
    /// Opens the cache backed by `path`, loading any persisted entries.
    ///
    /// A missing file starts empty; a corrupt file is discarded with a
    /// warning rather than blocking startup.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let entries: HashMap<String, CachedTicket> = match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), %err, "Discarding corrupt cache file");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "Failed to read cache file");
                HashMap::new()
            }
        };

        info!(path = %path.display(), entries = entries.len(), "Opened validation cache");
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Looks up the cached entry for a QR code.
    #[must_use]
    pub fn get(&self, qr_code: &str) -> Option<&CachedTicket> {
        self.entries.get(qr_code)
    }

    /// Inserts or overwrites the entry for a ticket, stamping `last_sync`
    /// and persisting synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the cache file cannot be rewritten.
    pub fn put(&mut self, ticket: &Ticket) -> Result<(), CacheError> {
        self.entries
            .insert(ticket.qr_code.clone(), CachedTicket::from_ticket(ticket));
        self.persist()
    }

    /// Marks the entry for `qr_code` as used, if it is currently valid.
    ///
    /// Returns `true` only when the entry existed with status valid and
    /// was mutated; an unknown or already-used entry is left alone. This
    /// guard keeps the speculative write in the validation engine from
    /// fabricating entries for codes the store has never confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the cache file cannot be rewritten.
    pub fn mark_used(&mut self, qr_code: &str) -> Result<bool, CacheError> {
        let Some(entry) = self.entries.get_mut(qr_code) else {
            return Ok(false);
        };
        if entry.status != TicketStatus::Valid {
            return Ok(false);
        }
        entry.status = TicketStatus::Used;
        self.persist()?;
        Ok(true)
    }

    /// Reverts the entry for `qr_code` back to valid.
    ///
    /// The compensating action for a speculative [`mark_used`](Self::mark_used)
    /// whose store update failed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the cache file cannot be rewritten.
    pub fn revert_to_valid(&mut self, qr_code: &str) -> Result<(), CacheError> {
        if let Some(entry) = self.entries.get_mut(qr_code) {
            entry.status = TicketStatus::Valid;
            self.persist()?;
        }
        Ok(())
    }

    /// Replaces entries from the full ticket set after an import.
    ///
    /// Existing entries for the same keys are overwritten; entries for
    /// keys absent from `tickets` are dropped (imports replace the set).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the cache file cannot be rewritten.
    pub fn bulk_load(&mut self, tickets: &[Ticket]) -> Result<(), CacheError> {
        self.entries = tickets
            .iter()
            .map(|ticket| (ticket.qr_code.clone(), CachedTicket::from_ticket(ticket)))
            .collect();
        debug!(entries = self.entries.len(), "Bulk-loaded validation cache");
        self.persist()
    }

    /// Drops all entries and removes the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backing file cannot be removed.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.entries.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::Io(err)),
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites the whole cache file from the in-memory map.
    fn persist(&self) -> Result<(), CacheError> {
        let bytes: Vec<u8> = serde_json::to_vec(&self.entries)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
