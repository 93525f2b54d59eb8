//! Read-only booking reports

pub mod aggregate;
pub mod service;

pub use aggregate::{summarize, BookingSummary};
pub use service::SummaryService;
