// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Remote-backed ticket store.
//!
//! [`RemoteClient`] is the contract required from the remote
//! collaborator's client library: request/response operations over two
//! logical tables plus a change-notification subscription. Transport
//! concerns (retries, connection pooling) belong to the client library,
//! not this crate.

use async_trait::async_trait;
use porteiro_domain::{
    CanonicalTicketRow, Ticket, TicketStatus, VALIDATED_LABEL, ValidationHistoryEntry,
    ValidationStats, now_iso8601,
};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::events::ValidationSubscription;
use crate::store::{MarkUsedOutcome, TicketStore, derive_tickets, stats_from_parts};

/// The request/response + subscription contract of the remote store.
///
/// Any operation may fail with [`StoreError::Unavailable`].
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetches one ticket by QR code.
    async fn get_ticket(&self, qr_code: &str) -> Result<Option<Ticket>, StoreError>;

    /// Deletes every row in the tickets table.
    async fn delete_all_tickets(&self) -> Result<(), StoreError>;

    /// Upserts tickets keyed by QR code.
    async fn upsert_tickets(&self, tickets: Vec<Ticket>) -> Result<(), StoreError>;

    /// Conditional update: sets status=used, stamps the validation date
    /// and advances the count, only where the current status is valid.
    ///
    /// Returns the updated ticket when the condition matched, `None`
    /// when no row was updated (missing or no longer valid).
    async fn update_ticket_if_valid(
        &self,
        qr_code: &str,
        validation_date: &str,
    ) -> Result<Option<Ticket>, StoreError>;

    /// Inserts a history row; the backend assigns the id.
    async fn insert_history(
        &self,
        entry: ValidationHistoryEntry,
    ) -> Result<ValidationHistoryEntry, StoreError>;

    /// Lists all history rows in unspecified order.
    async fn list_history(&self) -> Result<Vec<ValidationHistoryEntry>, StoreError>;

    /// Counts history rows.
    async fn count_history(&self) -> Result<usize, StoreError>;

    /// Deletes every history row.
    async fn delete_all_history(&self) -> Result<(), StoreError>;

    /// Lists the full ticket set.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Counts tickets.
    async fn count_tickets(&self) -> Result<usize, StoreError>;

    /// Lists only ticket statuses (cheap stats projection).
    async fn list_statuses(&self) -> Result<Vec<TicketStatus>, StoreError>;

    /// Subscribes to row-changed notifications (insert on history,
    /// used-update on tickets). At-least-once, eventually consistent.
    fn subscribe_changes(&self) -> ValidationSubscription;
}

/// [`TicketStore`] implementation backed by a [`RemoteClient`].
#[derive(Debug)]
pub struct RemoteTicketStore<C: RemoteClient> {
    client: C,
}

impl<C: RemoteClient> RemoteTicketStore<C> {
    /// Wraps a remote client.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: RemoteClient> TicketStore for RemoteTicketStore<C> {
    async fn import_tickets(&self, rows: Vec<CanonicalTicketRow>) -> Result<usize, StoreError> {
        let processed: usize = rows.len();
        let tickets: Vec<Ticket> = derive_tickets(rows);
        let unique: usize = tickets.len();

        // Delete-then-upsert: two network operations treated as logically
        // atomic for the single importing client. Concurrent validations
        // during an import race are an accepted edge case.
        self.client.delete_all_tickets().await?;
        self.client.upsert_tickets(tickets).await?;

        info!(rows = processed, tickets = unique, "Imported ticket set");
        Ok(processed)
    }

    async fn fetch_ticket(&self, qr_code: &str) -> Result<Option<Ticket>, StoreError> {
        self.client.get_ticket(qr_code).await
    }

    async fn mark_used(&self, qr_code: &str) -> Result<MarkUsedOutcome, StoreError> {
        let now: String = now_iso8601();

        let Some(updated) = self.client.update_ticket_if_valid(qr_code, &now).await? else {
            // No row matched the condition: distinguish a missing ticket
            // from one another client used first.
            return match self.client.get_ticket(qr_code).await? {
                Some(current) => {
                    debug!(qr_code, "Conditional update lost the race");
                    Ok(MarkUsedOutcome::AlreadyUsed(current))
                }
                None => Ok(MarkUsedOutcome::Missing),
            };
        };

        let entry: ValidationHistoryEntry = ValidationHistoryEntry {
            id: String::new(),
            ticket_id: updated.id.clone(),
            qr_code: updated.qr_code.clone(),
            name: updated.name.clone(),
            validation_date: now,
            event_name: updated.event_name_or_default().to_string(),
            status: String::from(VALIDATED_LABEL),
        };
        if let Err(err) = self.client.insert_history(entry).await {
            // The ticket is already used remotely; surface the failure so
            // the caller can compensate locally.
            warn!(qr_code, %err, "History insert failed after ticket update");
            return Err(err);
        }

        Ok(MarkUsedOutcome::Updated(updated))
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        self.client.list_tickets().await
    }

    async fn validation_history(&self) -> Result<Vec<ValidationHistoryEntry>, StoreError> {
        let mut entries: Vec<ValidationHistoryEntry> = self.client.list_history().await?;
        // RFC 3339 UTC timestamps order lexicographically.
        entries.sort_by(|a, b| b.validation_date.cmp(&a.validation_date));
        Ok(entries)
    }

    async fn total_tickets(&self) -> Result<usize, StoreError> {
        self.client.count_tickets().await
    }

    async fn validation_stats(&self) -> Result<ValidationStats, StoreError> {
        let statuses: Vec<TicketStatus> = self.client.list_statuses().await?;
        let history_len: usize = self.client.count_history().await?;
        Ok(stats_from_parts(&statuses, history_len))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.client.delete_all_tickets().await?;
        self.client.delete_all_history().await?;
        info!("Cleared all tickets and history");
        Ok(())
    }

    fn subscribe_to_validations(&self) -> ValidationSubscription {
        self.client.subscribe_changes()
    }
}
