//! Employee accounts and the front-desk ledger

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
