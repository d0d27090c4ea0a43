// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

use crate::ticket::{Ticket, TicketStatus};

/// A CSV row normalized into the fixed logical field set consumed by import.
///
/// All fields are plain strings exactly as the normalizer resolved them;
/// interpretation (status normalization, count parsing, defaults) happens
/// in [`CanonicalTicketRow::into_ticket`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CanonicalTicketRow {
    /// Opaque ticket identifier. May be empty; import assigns a fallback.
    pub id: String,
    /// The QR code value. Never empty for rows the normalizer emits.
    pub qr_code: String,
    /// Holder name, empty if absent.
    pub name: String,
    /// Holder email, empty if absent.
    pub email: String,
    /// Holder phone, empty if absent.
    pub phone: String,
    /// Security code, empty if absent.
    pub security_code: String,
    /// Free-text validation status. Defaults to "válido" upstream.
    pub status: String,
    /// Free-text validation date, empty if absent.
    pub validation_date: String,
    /// Free-text validation count. Defaults to "0" upstream.
    pub validation_count: String,
    /// Event name, empty if absent.
    pub event_name: String,
}

impl CanonicalTicketRow {
    /// Derives a [`Ticket`] from this canonical row.
    ///
    /// * `row_index` supplies the fallback identifier `ticket-{index}` when
    ///   the source row carried no id.
    /// * The status string is normalized via [`TicketStatus::normalize`].
    /// * An unparseable or missing count becomes 0; rows imported as already
    ///   used are coerced to a count of at least 1 so the used/count
    ///   invariant holds for system-visible state.
    #[must_use]
    pub fn into_ticket(self, row_index: usize) -> Ticket {
        let status: TicketStatus = TicketStatus::normalize(&self.status);
        let mut validation_count: u32 = self.validation_count.trim().parse().unwrap_or(0);
        if status == TicketStatus::Used && validation_count == 0 {
            validation_count = 1;
        }

        let id: String = if self.id.trim().is_empty() {
            format!("ticket-{row_index}")
        } else {
            self.id
        };

        Ticket {
            id,
            qr_code: self.qr_code,
            name: none_if_empty(self.name),
            email: none_if_empty(self.email),
            phone: none_if_empty(self.phone),
            security_code: none_if_empty(self.security_code),
            status,
            validation_date: none_if_empty(self.validation_date),
            validation_count,
            event_name: none_if_empty(self.event_name),
        }
    }
}

fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
