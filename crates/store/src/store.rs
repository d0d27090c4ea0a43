// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use async_trait::async_trait;
use porteiro_domain::{
    CanonicalTicketRow, Ticket, ValidationHistoryEntry, ValidationResult, ValidationStats,
};
use std::collections::HashMap;

use crate::error::StoreError;
use crate::events::ValidationSubscription;

/// Outcome of the conditional valid-to-used update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkUsedOutcome {
    /// The ticket was valid and is now used; the history entry was
    /// appended as part of the same operation.
    Updated(Ticket),
    /// The ticket exists but was not valid anymore (e.g. another client
    /// won the race between our read and our write).
    AlreadyUsed(Ticket),
    /// No ticket with this QR code exists.
    Missing,
}

/// Operations on the shared ticket set and validation history.
///
/// Implemented identically in contract by [`crate::MemoryTicketStore`]
/// and [`crate::RemoteTicketStore`].
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Replaces the entire ticket set from canonical rows.
    ///
    /// Destructive: prior tickets are deleted first. Duplicate QR codes
    /// across rows dedup last-row-wins. Returns the number of rows
    /// processed (not the number of unique tickets persisted).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn import_tickets(&self, rows: Vec<CanonicalTicketRow>) -> Result<usize, StoreError>;

    /// Fetches a ticket by its QR code.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn fetch_ticket(&self, qr_code: &str) -> Result<Option<Ticket>, StoreError>;

    /// Conditionally transitions a ticket to used (update-if-valid) and
    /// appends the history entry on success.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn mark_used(&self, qr_code: &str) -> Result<MarkUsedOutcome, StoreError>;

    /// Lists the full active ticket set (used to pre-warm the cache).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Returns the validation history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn validation_history(&self) -> Result<Vec<ValidationHistoryEntry>, StoreError>;

    /// Returns the number of tickets in the active set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn total_tickets(&self) -> Result<usize, StoreError>;

    /// Returns aggregate validation statistics.
    ///
    /// `valid` is derived as `total - used`; `validation_count` is the
    /// size of the history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn validation_stats(&self) -> Result<ValidationStats, StoreError>;

    /// Deletes all tickets and all history. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Subscribes to validation change notifications.
    fn subscribe_to_validations(&self) -> ValidationSubscription;

    /// Validates a QR code: the authoritative state machine.
    ///
    /// Fetches the ticket, classifies `not_found`/`used`, and otherwise
    /// performs the conditional valid-to-used transition. The
    /// compare-and-set in [`mark_used`](Self::mark_used) absorbs the
    /// read-then-update race into an `AlreadyUsed` classification.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    async fn validate_ticket(&self, qr_code: &str) -> Result<ValidationResult, StoreError> {
        let Some(ticket) = self.fetch_ticket(qr_code).await? else {
            return Ok(ValidationResult::not_found());
        };

        if ticket.is_used() {
            return Ok(ValidationResult::already_used(ticket));
        }

        match self.mark_used(qr_code).await? {
            MarkUsedOutcome::Updated(updated) => Ok(ValidationResult::validated(updated)),
            MarkUsedOutcome::AlreadyUsed(current) => Ok(ValidationResult::already_used(current)),
            MarkUsedOutcome::Missing => Ok(ValidationResult::not_found()),
        }
    }
}

/// Derives the unique ticket set from canonical rows.
///
/// Keyed by QR code with last-row-wins dedup; first-occurrence order is
/// preserved. This is the documented import policy, shared by both
/// store implementations.
pub(crate) fn derive_tickets(rows: Vec<CanonicalTicketRow>) -> Vec<Ticket> {
    let mut order: Vec<String> = Vec::new();
    let mut by_qr: HashMap<String, Ticket> = HashMap::new();

    for (row_index, row) in rows.into_iter().enumerate() {
        let ticket: Ticket = row.into_ticket(row_index);
        if !by_qr.contains_key(&ticket.qr_code) {
            order.push(ticket.qr_code.clone());
        }
        by_qr.insert(ticket.qr_code.clone(), ticket);
    }

    order
        .into_iter()
        .filter_map(|qr_code| by_qr.remove(&qr_code))
        .collect()
}

/// Computes stats from a status listing and a history count.
pub(crate) fn stats_from_parts(
    statuses: &[porteiro_domain::TicketStatus],
    history_len: usize,
) -> ValidationStats {
    let total: usize = statuses.len();
    let used: usize = statuses
        .iter()
        .filter(|status| **status == porteiro_domain::TicketStatus::Used)
        .count();
    ValidationStats {
        total,
        valid: total - used,
        used,
        validation_count: history_len,
    }
}
