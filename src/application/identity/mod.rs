//! Identity module: employee accounts and authentication
//!
//! `EmployeeService` covers login, account management and password changes.

pub mod service;

pub use service::{Actor, AdminSeed, AuthResult, CreateEmployeeRequest, EmployeeService};
