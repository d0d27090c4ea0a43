// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Validation change notifications.
//!
//! Events are informational "something changed" signals, delivered
//! at-least-once. Subscribers must tolerate duplicates and react by
//! re-reading the affected aggregates (history, stats), never by
//! applying the event as a diff.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Maximum number of events buffered per subscriber. Slow subscribers
/// lose the oldest events, which is acceptable for refresh triggers.
const EVENT_BUFFER_SIZE: usize = 100;

/// A change to the shared validation state made by some actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationEvent {
    /// A ticket transitioned to used.
    TicketUsed {
        /// The QR code of the used ticket.
        qr_code: String,
    },
    /// A validation history entry was inserted.
    HistoryInserted {
        /// The QR code the entry refers to.
        qr_code: String,
    },
}

/// Broadcaster for validation events.
///
/// A lightweight wrapper around `tokio::sync::broadcast` allowing any
/// number of subscribers to observe state changes.
#[derive(Debug, Clone)]
pub struct ValidationEvents {
    tx: broadcast::Sender<ValidationEvent>,
}

impl ValidationEvents {
    /// Creates a new broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all current subscribers.
    ///
    /// Non-blocking; silently dropped when nobody is subscribed.
    pub fn broadcast(&self, event: &ValidationEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => debug!(?event, receivers = count, "Broadcast validation event"),
            Err(_) => debug!(?event, "No receivers for validation event"),
        }
    }

    /// Opens a new subscription.
    ///
    /// Events broadcast before this call are not delivered.
    #[must_use]
    pub fn subscribe(&self) -> ValidationSubscription {
        ValidationSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ValidationEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle to an open validation event subscription.
///
/// Dropping the handle (or calling [`unsubscribe`](Self::unsubscribe))
/// stops delivery.
#[derive(Debug)]
pub struct ValidationSubscription {
    rx: broadcast::Receiver<ValidationEvent>,
}

impl ValidationSubscription {
    /// Receives the next event, or `None` once the broadcaster is gone.
    ///
    /// A subscriber that falls behind the buffer skips the lost events
    /// and keeps receiving; delivery is at-least-once with gaps under
    /// pressure, and subscribers refresh from the store either way.
    pub async fn recv(&mut self) -> Option<ValidationEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Subscription lagged; continuing");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicitly ends the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
