//! WebSocket interfaces
//!
//! - `notifications`: real-time booking events for front-desk clients

pub mod notifications;

pub use notifications::{
    create_notification_state, ws_notifications_handler, EventFilter, NotificationState,
};
