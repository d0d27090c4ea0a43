// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live validation streaming for door-staff UIs.
//!
//! This module streams read-only, non-authoritative validation change
//! notifications via WebSocket connections. Events are facts about what
//! changed in the shared ticket state, not directives.
//!
//! # Architecture
//!
//! - Events are broadcast to all connected clients
//! - Events are informational only and never authoritative
//! - No commands are executed over WebSocket connections
//! - Clients must still query the HTTP APIs for authoritative data

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use porteiro_store::ValidationSubscription;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::AppState;

/// Connection confirmation frame (sent on initial connect).
///
/// All later frames on the socket are serialized
/// [`porteiro_store::ValidationEvent`]s, which carry their own `type`
/// tag in the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ControlFrame {
    /// The server accepted the stream.
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

/// WebSocket handler that upgrades HTTP connections and streams
/// validation events.
///
/// Sends a connection confirmation, then streams all future validation
/// events to the client until it disconnects.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(app_state): AxumState<AppState>,
) -> Response {
    let subscription: ValidationSubscription = app_state.engine.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, subscription))
}

/// Handles an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, mut subscription: ValidationSubscription) {
    info!("Client connected to live validation stream");

    let (mut sender, mut receiver) = socket.split();

    // Send connection confirmation
    let connected: ControlFrame = ControlFrame::Connected {
        timestamp: porteiro_domain::now_iso8601(),
    };

    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    // Task for sending events to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize validation event");
                }
            }
        }
    });

    // Task for receiving messages from the client (though we don't expect any)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    // We don't process commands over WebSocket
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Ping/pong handled automatically by Axum
                }
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live validation stream");
}
