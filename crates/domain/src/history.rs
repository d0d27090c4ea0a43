// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// The outcome label recorded for a successful validation.
pub const VALIDATED_LABEL: &str = "validated";

/// A single entry in the validation history.
///
/// Entries are append-only and owned by the store; they are never mutated
/// after creation. Display order is creation time descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationHistoryEntry {
    /// Store-assigned identifier.
    pub id: String,
    /// The id of the validated ticket.
    pub ticket_id: String,
    /// The validated QR code.
    pub qr_code: String,
    /// Holder name at validation time, if known.
    pub name: Option<String>,
    /// ISO-8601 timestamp of the validation.
    pub validation_date: String,
    /// The event the ticket belonged to.
    pub event_name: String,
    /// Free-text outcome label (see [`VALIDATED_LABEL`]).
    pub status: String,
}

/// Aggregate validation statistics over the active ticket set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationStats {
    /// Total tickets in the active set.
    pub total: usize,
    /// Tickets still validatable (`total - used`).
    pub valid: usize,
    /// Tickets already used.
    pub used: usize,
    /// Size of the validation history.
    pub validation_count: usize,
}
