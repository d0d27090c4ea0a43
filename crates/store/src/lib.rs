// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket store abstraction.
//!
//! Defines the [`TicketStore`] contract shared by the pure in-memory
//! store and the remote-backed store, plus the [`RemoteClient`] trait
//! modeling the remote collaborator (two logical tables, `tickets`
//! keyed by QR code and insert-only `validation_history`, with a
//! change-notification subscription).
//!
//! ## Consistency guarantee
//!
//! The authoritative read-then-update in `validate_ticket` is not a
//! distributed transaction. The `mark_used` operation is a conditional
//! update-if-valid, so a cross-client race on the same ticket is
//! classified as `AlreadyUsed` when the compare-and-set detects it, but
//! two clients racing against a backend without that primitive may both
//! observe success. The tested guarantee is single-client idempotence.

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

mod error;
mod events;
mod memory;
mod memory_remote;
mod remote;
mod store;

#[cfg(test)]
mod tests;

pub use error::StoreError;
pub use events::{ValidationEvent, ValidationEvents, ValidationSubscription};
pub use memory::MemoryTicketStore;
pub use memory_remote::MemoryRemote;
pub use remote::{RemoteClient, RemoteTicketStore};
pub use store::{MarkUsedOutcome, TicketStore};
