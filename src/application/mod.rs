pub mod booking;
pub mod identity;
pub mod receipts;
pub mod summary;

// Re-export key types for convenience
pub use booking::{BookingService, CreateBookingRequest, RoomLocks, StayRequest, UpdateBookingRequest};
pub use identity::{Actor, AdminSeed, AuthResult, CreateEmployeeRequest, EmployeeService};
pub use receipts::{CommandPrinter, OutboxMailer, Receipt, ReceiptMailer, ReceiptPrinter, ReceiptWorker};
pub use summary::{BookingSummary, SummaryService};
