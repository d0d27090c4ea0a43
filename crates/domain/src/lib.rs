// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod cached;
mod canonical;
mod history;
mod result;
mod ticket;

#[cfg(test)]
mod tests;

pub use cached::CachedTicket;
pub use canonical::CanonicalTicketRow;
pub use history::{VALIDATED_LABEL, ValidationHistoryEntry, ValidationStats};
pub use result::{ValidationResult, ValidationStatus};
pub use ticket::{Ticket, TicketStatus};

/// The event name used when a ticket row carries none.
pub const DEFAULT_EVENT_NAME: &str = "Evento";

/// Returns the current UTC instant formatted as an ISO-8601 (RFC 3339) string.
///
/// All validation timestamps in the system are produced through this
/// single function so that stored dates sort and compare consistently.
#[must_use]
pub fn now_iso8601() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("unknown"))
}
