use async_trait::async_trait;

use super::model::{Employee, EmployeeUpdate, NewEmployee};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Fails with `Conflict` when the email or staff number is taken
    async fn create(&self, employee: NewEmployee) -> DomainResult<Employee>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Employee>>;

    /// Look up by email or staff number
    async fn find_by_login(&self, login: &str) -> DomainResult<Option<Employee>>;

    async fn find_all(&self, page: u32, limit: u32) -> DomainResult<PaginatedResult<Employee>>;

    /// Substring match over names, role, email and phone
    async fn search(&self, term: &str) -> DomainResult<Vec<Employee>>;

    async fn update(&self, id: i32, changes: EmployeeUpdate) -> DomainResult<Option<Employee>>;

    async fn update_password(&self, id: i32, password_hash: &str) -> DomainResult<()>;

    async fn delete(&self, id: i32) -> DomainResult<bool>;

    async fn count(&self) -> DomainResult<u64>;
}
