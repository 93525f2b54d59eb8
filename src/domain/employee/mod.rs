//! Employee aggregate
//!
//! Staff accounts: front-desk users and administrators.

pub mod model;
pub mod repository;

pub use model::{generate_employee_id, Employee, EmployeeUpdate, NewEmployee};
pub use repository::EmployeeRepository;
