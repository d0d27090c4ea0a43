// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use porteiro_cache::LocalValidationCache;
use porteiro_domain::{
    CanonicalTicketRow, Ticket, TicketStatus, ValidationHistoryEntry, ValidationResult,
    ValidationStats,
};
use porteiro_store::{MarkUsedOutcome, TicketStore, ValidationSubscription};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::scan::ScanOutcome;

/// The cache-augmented validation state machine.
///
/// Owns the authoritative store and the per-device cache. The cache
/// mutex is held for an entire `validate` call, so in-process
/// validations are strictly serialized; cross-client races are left to
/// the store's conditional update.
pub struct ValidationEngine<S: TicketStore> {
    store: S,
    cache: Mutex<LocalValidationCache>,
}

impl<S: TicketStore> ValidationEngine<S> {
    /// Creates an engine over `store` with the given cache.
    #[must_use]
    pub fn new(store: S, cache: LocalValidationCache) -> Self {
        Self {
            store,
            cache: Mutex::new(cache),
        }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validates a QR code, transitioning the ticket to used at most
    /// once.
    ///
    /// Duplicate scans of a code this device has already seen used are
    /// rejected from the cache without a store round-trip. Otherwise the
    /// store is consulted, with a speculative cache mark that is
    /// reverted if the store update fails or the ticket turns out to be
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyCode`] for blank input, and
    /// [`EngineError::Store`] / [`EngineError::Cache`] for
    /// infrastructure failures.
    pub async fn validate(&self, raw: &str) -> Result<ValidationResult, EngineError> {
        let qr_code: &str = raw.trim();
        if qr_code.is_empty() {
            return Err(EngineError::EmptyCode);
        }

        let mut cache = self.cache.lock().await;

        // Fast path: this device already saw the ticket used.
        if let Some(entry) = cache.get(qr_code)
            && entry.status == TicketStatus::Used
        {
            debug!(qr_code, "Duplicate scan rejected from local cache");
            return Ok(ValidationResult::already_used_cached(entry));
        }

        let Some(ticket) = self.store.fetch_ticket(qr_code).await? else {
            // No negative caching: an unknown code leaves the cache
            // untouched.
            debug!(qr_code, "Ticket not found");
            return Ok(ValidationResult::not_found());
        };

        if ticket.is_used() {
            // Another client used it; heal the local entry.
            cache.put(&ticket)?;
            return Ok(ValidationResult::already_used(ticket));
        }

        // Speculative local mark before the authoritative update. The
        // entry only exists if this device imported or validated the
        // ticket before, so the mark may legitimately be a no-op.
        let did_mark: bool = cache.mark_used(qr_code)?;

        match self.store.mark_used(qr_code).await {
            Ok(MarkUsedOutcome::Updated(updated)) => {
                cache.put(&updated)?;
                info!(qr_code, "Ticket validated");
                Ok(ValidationResult::validated(updated))
            }
            Ok(MarkUsedOutcome::AlreadyUsed(current)) => {
                // Lost the cross-client race between fetch and update.
                cache.put(&current)?;
                Ok(ValidationResult::already_used(current))
            }
            Ok(MarkUsedOutcome::Missing) => {
                if did_mark {
                    cache.revert_to_valid(qr_code)?;
                }
                Ok(ValidationResult::not_found())
            }
            Err(err) => {
                if did_mark {
                    // Compensating action: the store never confirmed the
                    // transition, so the cache must not remember it.
                    if let Err(revert_err) = cache.revert_to_valid(qr_code) {
                        warn!(qr_code, %revert_err, "Failed to revert speculative cache mark");
                    }
                }
                Err(EngineError::Store(err))
            }
        }
    }

    /// Validates the payload of a scan attempt.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scan`] when the scanner produced no
    /// usable content; the store is not contacted.
    pub async fn validate_scan(
        &self,
        outcome: ScanOutcome,
    ) -> Result<ValidationResult, EngineError> {
        let content: String = outcome.into_content()?;
        self.validate(&content).await
    }

    /// Imports canonical rows into the store and rebuilds the cache
    /// from the resulting ticket set. Returns the number of rows
    /// processed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] or [`EngineError::Cache`] on
    /// infrastructure failure.
    pub async fn import(&self, rows: Vec<CanonicalTicketRow>) -> Result<usize, EngineError> {
        let processed: usize = self.store.import_tickets(rows).await?;
        let tickets: Vec<Ticket> = self.store.list_tickets().await?;

        let mut cache = self.cache.lock().await;
        cache.bulk_load(&tickets)?;
        info!(rows = processed, tickets = tickets.len(), "Imported ticket set");
        Ok(processed)
    }

    /// Deletes all tickets, history, and cached entries.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] or [`EngineError::Cache`] on
    /// infrastructure failure.
    pub async fn clear(&self) -> Result<(), EngineError> {
        self.store.clear().await?;
        let mut cache = self.cache.lock().await;
        cache.clear()?;
        info!("Cleared ticket set and validation cache");
        Ok(())
    }

    /// Returns the validation history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the backend fails.
    pub async fn validation_history(&self) -> Result<Vec<ValidationHistoryEntry>, EngineError> {
        Ok(self.store.validation_history().await?)
    }

    /// Returns aggregate validation statistics.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the backend fails.
    pub async fn validation_stats(&self) -> Result<ValidationStats, EngineError> {
        Ok(self.store.validation_stats().await?)
    }

    /// Returns the number of tickets in the active set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the backend fails.
    pub async fn total_tickets(&self) -> Result<usize, EngineError> {
        Ok(self.store.total_tickets().await?)
    }

    /// Subscribes to validation change notifications.
    #[must_use]
    pub fn subscribe(&self) -> ValidationSubscription {
        self.store.subscribe_to_validations()
    }

    /// Number of entries in the local cache.
    #[must_use]
    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}
