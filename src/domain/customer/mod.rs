//! Customer aggregate

pub mod model;
pub mod repository;

pub use model::{Customer, CustomerUpdate, NewCustomer};
pub use repository::CustomerRepository;
