//! Repository traits for the domain layer
//!
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::booking::BookingRepository;
use super::customer::CustomerRepository;
use super::employee::EmployeeRepository;
use super::room::RoomRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) -> DomainResult<()> {
///     let room = repos.rooms().find_by_id(12).await?;
///     let stays = repos.bookings().booked_room_bookings(12).await?;
///     Ok(())
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn rooms(&self) -> &dyn RoomRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn customers(&self) -> &dyn CustomerRepository;
    fn employees(&self) -> &dyn EmployeeRepository;
}
