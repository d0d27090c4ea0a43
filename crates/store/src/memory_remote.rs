// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-process [`RemoteClient`] implementation.
//!
//! Serves two purposes: the degraded local-only mode offered when no
//! real backend is configured, and a deterministic test double with
//! fault injection (`set_unreachable` fails every call,
//! `set_fail_updates` fails only the conditional update so the
//! speculative-write revert path can be exercised).

use async_trait::async_trait;
use porteiro_domain::{Ticket, TicketStatus, ValidationHistoryEntry};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::StoreError;
use crate::events::{ValidationEvent, ValidationEvents, ValidationSubscription};
use crate::remote::RemoteClient;

#[derive(Debug, Default)]
struct Tables {
    tickets: Vec<Ticket>,
    history: Vec<ValidationHistoryEntry>,
}

/// An in-memory remote backend with fault injection.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    tables: Mutex<Tables>,
    events: ValidationEvents,
    history_counter: AtomicU64,
    unreachable: AtomicBool,
    fail_updates: AtomicBool,
}

impl MemoryRemote {
    /// Creates an empty, healthy backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Makes only conditional updates fail, simulating a write failure
    /// after reads succeeded.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(String::from(
                "remote store unreachable",
            )));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl RemoteClient for MemoryRemote {
    async fn get_ticket(&self, qr_code: &str) -> Result<Option<Ticket>, StoreError> {
        self.check_reachable()?;
        Ok(self
            .lock()
            .tickets
            .iter()
            .find(|ticket| ticket.qr_code == qr_code)
            .cloned())
    }

    async fn delete_all_tickets(&self) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.lock().tickets.clear();
        Ok(())
    }

    async fn upsert_tickets(&self, tickets: Vec<Ticket>) -> Result<(), StoreError> {
        self.check_reachable()?;
        let mut tables = self.lock();
        for incoming in tickets {
            if let Some(existing) = tables
                .tickets
                .iter_mut()
                .find(|ticket| ticket.qr_code == incoming.qr_code)
            {
                *existing = incoming;
            } else {
                tables.tickets.push(incoming);
            }
        }
        Ok(())
    }

    async fn update_ticket_if_valid(
        &self,
        qr_code: &str,
        validation_date: &str,
    ) -> Result<Option<Ticket>, StoreError> {
        self.check_reachable()?;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(String::from(
                "remote update failed",
            )));
        }

        let updated: Option<Ticket> = {
            let mut tables = self.lock();
            tables
                .tickets
                .iter_mut()
                .find(|ticket| {
                    ticket.qr_code == qr_code && ticket.status == TicketStatus::Valid
                })
                .map(|ticket| {
                    ticket.mark_used(validation_date.to_string());
                    ticket.clone()
                })
        };

        if updated.is_some() {
            self.events.broadcast(&ValidationEvent::TicketUsed {
                qr_code: qr_code.to_string(),
            });
        }
        Ok(updated)
    }

    async fn insert_history(
        &self,
        mut entry: ValidationHistoryEntry,
    ) -> Result<ValidationHistoryEntry, StoreError> {
        self.check_reachable()?;
        if entry.id.is_empty() {
            let id: u64 = self.history_counter.fetch_add(1, Ordering::Relaxed);
            entry.id = format!("validation-{id}");
        }
        self.lock().history.push(entry.clone());
        self.events.broadcast(&ValidationEvent::HistoryInserted {
            qr_code: entry.qr_code.clone(),
        });
        Ok(entry)
    }

    async fn list_history(&self) -> Result<Vec<ValidationHistoryEntry>, StoreError> {
        self.check_reachable()?;
        Ok(self.lock().history.clone())
    }

    async fn count_history(&self) -> Result<usize, StoreError> {
        self.check_reachable()?;
        Ok(self.lock().history.len())
    }

    async fn delete_all_history(&self) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.lock().history.clear();
        Ok(())
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        self.check_reachable()?;
        Ok(self.lock().tickets.clone())
    }

    async fn count_tickets(&self) -> Result<usize, StoreError> {
        self.check_reachable()?;
        Ok(self.lock().tickets.len())
    }

    async fn list_statuses(&self) -> Result<Vec<TicketStatus>, StoreError> {
        self.check_reachable()?;
        Ok(self.lock().tickets.iter().map(|ticket| ticket.status).collect())
    }

    fn subscribe_changes(&self) -> ValidationSubscription {
        self.events.subscribe()
    }
}
