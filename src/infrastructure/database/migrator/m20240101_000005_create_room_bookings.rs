//! Create room_bookings table
//!
//! One row per room stay. Stays are owned by their booking (cascade delete).

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_rooms::Rooms;
use super::m20240101_000004_create_bookings::Bookings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomBookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomBookings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomBookings::BookingId).integer().not_null())
                    .col(ColumnDef::new(RoomBookings::RoomId).integer().not_null())
                    .col(
                        ColumnDef::new(RoomBookings::NumberOfNights)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::Status)
                            .string_len(20)
                            .not_null()
                            .default("reserved"),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomBookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_bookings_booking")
                            .from(RoomBookings::Table, RoomBookings::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_bookings_room")
                            .from(RoomBookings::Table, RoomBookings::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_bookings_room_status")
                    .table(RoomBookings::Table)
                    .col(RoomBookings::RoomId)
                    .col(RoomBookings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_bookings_booking")
                    .table(RoomBookings::Table)
                    .col(RoomBookings::BookingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomBookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RoomBookings {
    Table,
    Id,
    BookingId,
    RoomId,
    NumberOfNights,
    StartDate,
    EndDate,
    Amount,
    Status,
    CreatedAt,
    UpdatedAt,
}
