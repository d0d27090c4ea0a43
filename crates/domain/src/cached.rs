// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

use crate::ticket::{Ticket, TicketStatus};

/// A denormalized, possibly stale projection of a [`Ticket`], keyed by
/// QR code and held in the per-device validation cache.
///
/// Entries survive process restarts and are rebuilt wholesale on every
/// import. Staleness is accepted: a ticket validated concurrently on
/// another device may not yet be reflected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTicket {
    /// The QR code this entry is keyed by.
    pub qr_code: String,
    /// Last known status.
    pub status: TicketStatus,
    /// Holder name, if known.
    pub name: Option<String>,
    /// Holder email, if known.
    pub email: Option<String>,
    /// Holder phone, if known.
    pub phone: Option<String>,
    /// Event name, if known.
    pub event_name: Option<String>,
    /// Unix timestamp (seconds) of the last sync with the store.
    pub last_sync: i64,
}

impl CachedTicket {
    /// Projects a full ticket into a cache entry, stamping `last_sync`.
    #[must_use]
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            qr_code: ticket.qr_code.clone(),
            status: ticket.status,
            name: ticket.name.clone(),
            email: ticket.email.clone(),
            phone: ticket.phone.clone(),
            event_name: ticket.event_name.clone(),
            last_sync: time::OffsetDateTime::now_utc().unix_timestamp(),
        }
    }

    /// Reconstructs a best-effort [`Ticket`] from the cached fields.
    ///
    /// Fields the cache does not carry (id, security code, validation date
    /// and count) are filled with neutral values; callers use this only for
    /// display on the cache fast path.
    #[must_use]
    pub fn to_best_effort_ticket(&self) -> Ticket {
        Ticket {
            id: String::new(),
            qr_code: self.qr_code.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            security_code: None,
            status: self.status,
            validation_date: None,
            validation_count: u32::from(self.status == TicketStatus::Used),
            event_name: self.event_name.clone(),
        }
    }
}
