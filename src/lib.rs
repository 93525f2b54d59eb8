//! # Timeless Hotel
//!
//! Hotel management backend: rooms, customers, staff and bookings, with a
//! night-level availability engine that refuses double bookings.
//!
//! ## Architecture
//!
//! - **domain**: aggregates (rooms, bookings, customers, employees) and repository traits
//! - **application**: booking engine, identity, summaries and receipt delivery
//! - **infrastructure**: SeaORM database, migrations, JWT and password hashing
//! - **interfaces**: REST API with Swagger documentation and the notifications WebSocket
//! - **notifications**: in-process booking event bus
//! - **server**: runtime bootstrap shared by the CLI

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod notifications;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::{create_api_router, ApiContext};

pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
