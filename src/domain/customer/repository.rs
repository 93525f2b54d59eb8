use async_trait::async_trait;

use super::model::{Customer, CustomerUpdate, NewCustomer};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: NewCustomer) -> DomainResult<Customer>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Customer>>;

    async fn find_all(&self, page: u32, limit: u32) -> DomainResult<PaginatedResult<Customer>>;

    /// Substring match over names, email, phone and plate number
    async fn search(&self, term: &str) -> DomainResult<Vec<Customer>>;

    async fn update(&self, id: i32, changes: CustomerUpdate) -> DomainResult<Option<Customer>>;

    /// Detach the customer's bookings, then delete. `false` if absent.
    async fn delete(&self, id: i32) -> DomainResult<bool>;
}
