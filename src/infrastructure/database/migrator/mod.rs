//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_employees;
mod m20240101_000002_create_customers;
mod m20240101_000003_create_rooms;
mod m20240101_000004_create_bookings;
mod m20240101_000005_create_room_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_employees::Migration),
            Box::new(m20240101_000002_create_customers::Migration),
            Box::new(m20240101_000003_create_rooms::Migration),
            Box::new(m20240101_000004_create_bookings::Migration),
            Box::new(m20240101_000005_create_room_bookings::Migration),
        ]
    }
}
