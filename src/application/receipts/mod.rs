//! Receipt side channel: build, mail and print receipts after booking changes

pub mod mailer;
pub mod printer;
pub mod receipt;
pub mod worker;

pub use mailer::{OutboxMailer, ReceiptMailer};
pub use printer::{CommandPrinter, ReceiptPrinter};
pub use receipt::Receipt;
pub use worker::ReceiptWorker;
