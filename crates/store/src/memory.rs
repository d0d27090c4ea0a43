// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure in-memory ticket store.
//!
//! Holds the active ticket set and validation history under one mutex,
//! which makes the valid-to-used transition naturally atomic within the
//! process. Used for single-process deployments and as the reference
//! implementation of the [`TicketStore`] contract in tests.

use async_trait::async_trait;
use porteiro_domain::{
    CanonicalTicketRow, Ticket, TicketStatus, VALIDATED_LABEL, ValidationHistoryEntry,
    ValidationStats, now_iso8601,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::events::{ValidationEvent, ValidationEvents, ValidationSubscription};
use crate::store::{MarkUsedOutcome, TicketStore, derive_tickets, stats_from_parts};

#[derive(Debug, Default)]
struct Inner {
    /// Active ticket set in first-import order.
    tickets: Vec<Ticket>,
    /// Append-only validation history in creation order.
    history: Vec<ValidationHistoryEntry>,
}

/// In-memory implementation of [`TicketStore`].
#[derive(Debug)]
pub struct MemoryTicketStore {
    inner: Mutex<Inner>,
    events: ValidationEvents,
    /// Monotonic source for history entry identifiers.
    history_counter: AtomicU64,
}

impl MemoryTicketStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            events: ValidationEvents::new(),
            history_counter: AtomicU64::new(0),
        }
    }

    fn next_history_id(&self) -> String {
        let id: u64 = self.history_counter.fetch_add(1, Ordering::Relaxed);
        format!("validation-{id}")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a holder panicked; the data is
        // plain and still usable, so recover the guard.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for MemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn import_tickets(&self, rows: Vec<CanonicalTicketRow>) -> Result<usize, StoreError> {
        let processed: usize = rows.len();
        let tickets: Vec<Ticket> = derive_tickets(rows);

        let mut inner = self.lock();
        inner.tickets = tickets;
        info!(
            rows = processed,
            tickets = inner.tickets.len(),
            "Imported ticket set"
        );
        Ok(processed)
    }

    async fn fetch_ticket(&self, qr_code: &str) -> Result<Option<Ticket>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .tickets
            .iter()
            .find(|ticket| ticket.qr_code == qr_code)
            .cloned())
    }

    async fn mark_used(&self, qr_code: &str) -> Result<MarkUsedOutcome, StoreError> {
        let entry_id: String = self.next_history_id();
        let mut inner = self.lock();

        let Some(ticket) = inner
            .tickets
            .iter_mut()
            .find(|ticket| ticket.qr_code == qr_code)
        else {
            return Ok(MarkUsedOutcome::Missing);
        };

        if ticket.status != TicketStatus::Valid {
            return Ok(MarkUsedOutcome::AlreadyUsed(ticket.clone()));
        }

        ticket.mark_used(now_iso8601());
        let updated: Ticket = ticket.clone();

        let entry: ValidationHistoryEntry = ValidationHistoryEntry {
            id: entry_id,
            ticket_id: updated.id.clone(),
            qr_code: updated.qr_code.clone(),
            name: updated.name.clone(),
            validation_date: updated
                .validation_date
                .clone()
                .unwrap_or_else(now_iso8601),
            event_name: updated.event_name_or_default().to_string(),
            status: String::from(VALIDATED_LABEL),
        };
        inner.history.push(entry);
        drop(inner);

        debug!(qr_code, "Ticket marked used");
        self.events.broadcast(&ValidationEvent::TicketUsed {
            qr_code: qr_code.to_string(),
        });
        self.events.broadcast(&ValidationEvent::HistoryInserted {
            qr_code: qr_code.to_string(),
        });

        Ok(MarkUsedOutcome::Updated(updated))
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.lock().tickets.clone())
    }

    async fn validation_history(&self) -> Result<Vec<ValidationHistoryEntry>, StoreError> {
        // Append-only, so creation-time-descending is reverse insertion.
        let mut entries: Vec<ValidationHistoryEntry> = self.lock().history.clone();
        entries.reverse();
        Ok(entries)
    }

    async fn total_tickets(&self) -> Result<usize, StoreError> {
        Ok(self.lock().tickets.len())
    }

    async fn validation_stats(&self) -> Result<ValidationStats, StoreError> {
        let inner = self.lock();
        let statuses: Vec<TicketStatus> =
            inner.tickets.iter().map(|ticket| ticket.status).collect();
        Ok(stats_from_parts(&statuses, inner.history.len()))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.tickets.clear();
        inner.history.clear();
        info!("Cleared all tickets and history");
        Ok(())
    }

    fn subscribe_to_validations(&self) -> ValidationSubscription {
        self.events.subscribe()
    }
}
