// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// The lifecycle status of a ticket.
///
/// A ticket starts `Valid` after import and transitions to `Used` at most
/// once. There is no transition out of `Used`. `Invalid` only arises from
/// imported data that explicitly carried an unusable status; the system
/// never produces it on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Ticket may still be validated.
    #[default]
    Valid,
    /// Ticket has been validated. Terminal.
    Used,
    /// Ticket was imported as unusable.
    Invalid,
}

impl TicketStatus {
    /// Converts this status to its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Used => "used",
            Self::Invalid => "invalid",
        }
    }

    /// Normalizes a free-text status string from heterogeneous CSV exports.
    ///
    /// Matching is case-insensitive and substring-based: anything containing
    /// "usado" or "used" is `Used`, anything containing "válido" or "valid"
    /// is `Valid`. Unrecognized strings default to `Valid` rather than
    /// `Invalid` — silently creating permanently unvalidatable tickets from
    /// minor CSV formatting differences is a usability hazard.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let lowered: String = raw.to_lowercase();
        if lowered.contains("usado") || lowered.contains("used") {
            Self::Used
        } else {
            // "válido"/"valid" and unrecognized strings both land here;
            // the unrecognized default is deliberate.
            Self::Valid
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ticket validated at most once, identified by its QR code.
///
/// `qr_code` is the unique natural key across the active ticket set.
/// A re-import replaces the entire set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Opaque identifier from the source export.
    pub id: String,
    /// The unique natural key.
    pub qr_code: String,
    /// Holder name, if the export carried one.
    pub name: Option<String>,
    /// Holder email, if the export carried one.
    pub email: Option<String>,
    /// Holder phone, if the export carried one.
    pub phone: Option<String>,
    /// Security code, if the export carried one.
    pub security_code: Option<String>,
    /// Current lifecycle status.
    pub status: TicketStatus,
    /// ISO-8601 timestamp of the first successful validation.
    pub validation_date: Option<String>,
    /// Number of validations performed. Starts at 0.
    pub validation_count: u32,
    /// The event this ticket belongs to.
    pub event_name: Option<String>,
}

impl Ticket {
    /// Returns whether this ticket has been used.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.status == TicketStatus::Used
    }

    /// Transitions the ticket to `Used`, stamping the validation date and
    /// advancing the validation count.
    ///
    /// The caller must have checked that the ticket is currently `Valid`;
    /// this method only records the transition.
    pub fn mark_used(&mut self, validation_date: String) {
        self.status = TicketStatus::Used;
        self.validation_date = Some(validation_date);
        self.validation_count += 1;
    }

    /// Returns the event name, falling back to the system default.
    #[must_use]
    pub fn event_name_or_default(&self) -> &str {
        self.event_name.as_deref().unwrap_or(crate::DEFAULT_EVENT_NAME)
    }
}
