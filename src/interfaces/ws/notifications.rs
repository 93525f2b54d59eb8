//! WebSocket stream of booking events for front-desk clients
//!
//! `GET /api/v1/notifications/ws?event_types=booking_created,room_checked_in&booking_id=7`

use std::collections::HashSet;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, info, warn};

use crate::notifications::{EventMessage, SharedEventBus};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct EventFilter {
    /// Comma-separated event types, e.g. `booking_created,room_checked_in`
    pub event_types: Option<String>,
    /// Only events of this booking
    pub booking_id: Option<i32>,
}

impl EventFilter {
    fn allowed_types(&self) -> Option<HashSet<String>> {
        self.event_types.as_ref().map(|types| {
            types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    pub fn matches(&self, message: &EventMessage) -> bool {
        let event = &message.event;
        self.booking_id.map_or(true, |id| event.booking_id() == id)
            && self
                .allowed_types()
                .map_or(true, |types| types.contains(event.event_type()))
    }
}

#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
}

pub fn create_notification_state(event_bus: SharedEventBus) -> NotificationState {
    NotificationState { event_bus }
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/ws",
    tag = "Notifications",
    params(EventFilter),
    responses((status = 101, description = "Switching to the event stream"))
)]
pub async fn ws_notifications_handler(
    ws: WebSocketUpgrade,
    State(state): State<NotificationState>,
    Query(filter): Query<EventFilter>,
) -> impl IntoResponse {
    info!(
        booking_id = ?filter.booking_id,
        event_types = ?filter.event_types,
        "Notification client connecting"
    );
    ws.on_upgrade(move |socket| stream_events(socket, state, filter))
}

async fn stream_events(socket: WebSocket, state: NotificationState, filter: EventFilter) {
    let (mut sink, mut incoming) = socket.split();
    // Subscribe before greeting so nothing published in between is lost.
    let mut subscriber = state.event_bus.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "filter": {
            "booking_id": filter.booking_id,
            "event_types": filter.event_types,
        }
    });
    if sink.send(Message::Text(welcome.to_string().into())).await.is_err() {
        return;
    }

    loop {
        select! {
            frame = incoming.next() => match frame {
                Some(Ok(Message::Ping(data))) => {
                    if sink.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(error = %e, "Notification socket error");
                    break;
                }
                // Clients are listeners; anything else they send is ignored.
                Some(Ok(_)) => {}
            },
            event = subscriber.recv() => {
                let Some(message) = event else {
                    warn!("Event bus closed");
                    break;
                };
                if !filter.matches(&message) {
                    continue;
                }
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(error = %e, "Failed to serialize event");
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
                debug!(event_type = message.event.event_type(), "Event pushed to client");
            }
        }
    }

    info!("Notification client disconnected");
}
