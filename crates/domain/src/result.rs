// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

use crate::cached::CachedTicket;
use crate::ticket::Ticket;

/// Classification of a validation attempt.
///
/// `NotFound` is not a ticket state; it classifies codes absent from the
/// store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// The ticket was valid and has now been used.
    Valid,
    /// The ticket had already been used.
    Used,
    /// No ticket with this code exists in the store.
    NotFound,
}

/// The transient outcome of a single validation attempt.
///
/// Produced once per attempt, consumed by the caller, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the attempt transitioned a ticket to used.
    pub success: bool,
    /// The ticket involved, when one exists. Best-effort fields when the
    /// result was produced from the local cache.
    pub ticket: Option<Ticket>,
    /// Short user-facing message.
    pub message: String,
    /// Machine-readable classification.
    pub status: ValidationStatus,
}

impl ValidationResult {
    /// Result for a code absent from the store.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            success: false,
            ticket: None,
            message: String::from("Ingresso não encontrado"),
            status: ValidationStatus::NotFound,
        }
    }

    /// Result for a ticket that had already been used.
    ///
    /// The message includes the first validation date when known.
    #[must_use]
    pub fn already_used(ticket: Ticket) -> Self {
        let first: &str = ticket.validation_date.as_deref().unwrap_or("N/A");
        let message: String = format!("Ingresso já usado. Primeira validação: {first}");
        Self {
            success: false,
            ticket: Some(ticket),
            message,
            status: ValidationStatus::Used,
        }
    }

    /// Result for a duplicate scan rejected by the local cache without a
    /// store round-trip. Ticket fields are the cache's best effort.
    #[must_use]
    pub fn already_used_cached(entry: &CachedTicket) -> Self {
        Self::already_used(entry.to_best_effort_ticket())
    }

    /// Result for a successful valid-to-used transition.
    #[must_use]
    pub fn validated(ticket: Ticket) -> Self {
        Self {
            success: true,
            ticket: Some(ticket),
            message: String::from("Ingresso válido"),
            status: ValidationStatus::Valid,
        }
    }
}
