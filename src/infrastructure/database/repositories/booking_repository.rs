//! SeaORM implementation of BookingRepository
//!
//! Multi-row operations open one transaction and run every statement on it.
//! Nothing inside a transaction may touch `self.db`: with a single pooled
//! connection that would wait on the transaction's own connection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use log::{debug, warn};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::db_err;
use super::room_repository;
use crate::domain::booking::{
    Booking, BookingChanges, BookingFilter, BookingRepository, LedgerRow, NewBooking,
    PaymentMethod, RoomBooking, RoomBookingChanges, StayStatus,
};
use crate::domain::room::{Room, RoomStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking, customer, room, room_booking};

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn method_to_domain(m: booking::PaymentMethod) -> PaymentMethod {
    match m {
        booking::PaymentMethod::Cash => PaymentMethod::Cash,
        booking::PaymentMethod::Card => PaymentMethod::Card,
        booking::PaymentMethod::Transfer => PaymentMethod::Transfer,
    }
}

fn method_from_domain(m: PaymentMethod) -> booking::PaymentMethod {
    match m {
        PaymentMethod::Cash => booking::PaymentMethod::Cash,
        PaymentMethod::Card => booking::PaymentMethod::Card,
        PaymentMethod::Transfer => booking::PaymentMethod::Transfer,
    }
}

fn stay_status_to_domain(s: room_booking::StayStatus) -> StayStatus {
    match s {
        room_booking::StayStatus::Reserved => StayStatus::Reserved,
        room_booking::StayStatus::CheckedIn => StayStatus::CheckedIn,
        room_booking::StayStatus::CheckedOut => StayStatus::CheckedOut,
    }
}

fn stay_status_from_domain(s: StayStatus) -> room_booking::StayStatus {
    match s {
        StayStatus::Reserved => room_booking::StayStatus::Reserved,
        StayStatus::CheckedIn => room_booking::StayStatus::CheckedIn,
        StayStatus::CheckedOut => room_booking::StayStatus::CheckedOut,
    }
}

fn nights_to_db(nights: u32) -> DomainResult<i32> {
    i32::try_from(nights)
        .map_err(|_| DomainError::Validation(format!("number of nights {nights} is too large")))
}

/// A stored night count below zero means the row is corrupt.
fn nights_from_db(room_booking_id: i32, nights: i32) -> DomainResult<u32> {
    u32::try_from(nights).map_err(|_| {
        warn!("Room booking {} has invalid number_of_nights {}", room_booking_id, nights);
        DomainError::Persistence(format!(
            "room booking {room_booking_id} has invalid number_of_nights {nights}"
        ))
    })
}

fn stay_to_domain(m: room_booking::Model) -> DomainResult<RoomBooking> {
    Ok(RoomBooking {
        id: m.id,
        booking_id: m.booking_id,
        room_id: m.room_id,
        number_of_nights: nights_from_db(m.id, m.number_of_nights)?,
        start_date: m.start_date,
        end_date: m.end_date,
        amount: m.amount,
        status: stay_status_to_domain(m.status),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn model_to_domain(
    m: booking::Model,
    mut stays: Vec<room_booking::Model>,
) -> DomainResult<Booking> {
    stays.sort_by_key(|s| s.id);
    Ok(Booking {
        id: m.id,
        customer_id: m.customer_id,
        receptionist: m.receptionist,
        amount: m.amount,
        is_paid: m.is_paid,
        payment_method: method_to_domain(m.payment_method),
        is_complementary: m.is_complementary,
        created_at: m.created_at,
        updated_at: m.updated_at,
        deleted_at: m.deleted_at,
        room_bookings: stays
            .into_iter()
            .map(stay_to_domain)
            .collect::<DomainResult<_>>()?,
    })
}

/// Load a live booking with its stays on any connection or transaction.
async fn load_booking<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Option<Booking>> {
    let Some(model) = booking::Entity::find_by_id(id)
        .filter(booking::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(db_err)?
    else {
        return Ok(None);
    };
    let stays = room_booking::Entity::find()
        .filter(room_booking::Column::BookingId.eq(id))
        .order_by_asc(room_booking::Column::Id)
        .all(conn)
        .await
        .map_err(db_err)?;
    model_to_domain(model, stays).map(Some)
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create_with_room_bookings(&self, b: NewBooking) -> DomainResult<Booking> {
        debug!(
            "Creating booking for customer {} with {} room bookings",
            b.customer_id,
            b.room_bookings.len()
        );

        let txn = self.db.begin().await.map_err(db_err)?;

        let saved = booking::ActiveModel {
            customer_id: Set(Some(b.customer_id)),
            receptionist: Set(b.receptionist),
            amount: Set(b.amount),
            is_paid: Set(b.is_paid),
            payment_method: Set(method_from_domain(b.payment_method)),
            is_complementary: Set(b.is_complementary),
            created_at: Set(b.created_at),
            updated_at: Set(b.created_at),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut stays = Vec::with_capacity(b.room_bookings.len());
        for stay in b.room_bookings {
            let model = room_booking::ActiveModel {
                booking_id: Set(saved.id),
                room_id: Set(stay.room_id),
                number_of_nights: Set(nights_to_db(stay.number_of_nights)?),
                start_date: Set(stay.start_date),
                end_date: Set(stay.end_date),
                amount: Set(stay.amount),
                status: Set(room_booking::StayStatus::Reserved),
                created_at: Set(b.created_at),
                updated_at: Set(b.created_at),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            stays.push(model);
        }

        txn.commit().await.map_err(db_err)?;
        model_to_domain(saved, stays)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Booking>> {
        load_booking(&self.db, id).await
    }

    async fn find_all(&self, filter: &BookingFilter) -> DomainResult<Vec<Booking>> {
        debug!("Listing bookings: {:?}", filter);

        let mut query = booking::Entity::find().filter(booking::Column::DeletedAt.is_null());
        if let Some(start) = filter.start {
            let from = start.and_time(NaiveTime::MIN).and_utc();
            query = query.filter(booking::Column::CreatedAt.gte(from));
        }
        if let Some(end) = filter.end {
            let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
            let until = end.and_time(end_of_day).and_utc();
            query = query.filter(booking::Column::CreatedAt.lte(until));
        }
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(booking::Column::Receptionist.eq(employee_id));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(booking::Column::CustomerId.eq(customer_id));
        }

        let models = query
            .order_by_desc(booking::Column::CreatedAt)
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let stays = models
            .load_many(room_booking::Entity, &self.db)
            .await
            .map_err(db_err)?;

        models
            .into_iter()
            .zip(stays)
            .map(|(m, s)| model_to_domain(m, s))
            .collect()
    }

    async fn find_room_booking(&self, id: i32) -> DomainResult<Option<RoomBooking>> {
        let model = room_booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(stay_to_domain).transpose()
    }

    async fn booked_room_bookings(&self, room_id: i32) -> DomainResult<Vec<RoomBooking>> {
        let models = room_booking::Entity::find()
            .filter(room_booking::Column::RoomId.eq(room_id))
            .filter(room_booking::Column::Status.ne(room_booking::StayStatus::CheckedOut))
            .order_by_asc(room_booking::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(stay_to_domain).collect()
    }

    async fn checked_in_room_bookings(&self) -> DomainResult<Vec<RoomBooking>> {
        let models = room_booking::Entity::find()
            .filter(room_booking::Column::Status.eq(room_booking::StayStatus::CheckedIn))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(stay_to_domain).collect()
    }

    async fn update_with_room_booking(
        &self,
        booking_id: i32,
        changes: BookingChanges,
        room_booking_id: i32,
        stay: RoomBookingChanges,
    ) -> DomainResult<Booking> {
        debug!("Updating booking {} / room booking {}", booking_id, room_booking_id);

        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = booking::Entity::find_by_id(booking_id)
            .filter(booking::Column::DeletedAt.is_null())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

        let existing_stay = room_booking::Entity::find_by_id(room_booking_id)
            .filter(room_booking::Column::BookingId.eq(booking_id))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("RoomBooking", room_booking_id))?;

        let mut active_stay: room_booking::ActiveModel = existing_stay.into();
        active_stay.number_of_nights = Set(nights_to_db(stay.number_of_nights)?);
        active_stay.start_date = Set(stay.start_date);
        active_stay.end_date = Set(stay.end_date);
        active_stay.amount = Set(stay.amount);
        active_stay.updated_at = Set(stay.updated_at);
        active_stay.update(&txn).await.map_err(db_err)?;

        let total = room_booking::Entity::find()
            .filter(room_booking::Column::BookingId.eq(booking_id))
            .all(&txn)
            .await
            .map_err(db_err)?
            .iter()
            .try_fold(0i64, |sum, s| sum.checked_add(s.amount))
            .ok_or_else(|| DomainError::Validation("booking total is too large".into()))?;

        let mut active: booking::ActiveModel = existing.into();
        active.amount = Set(total);
        if let Some(method) = changes.payment_method {
            active.payment_method = Set(method_from_domain(method));
        }
        if let Some(is_paid) = changes.is_paid {
            active.is_paid = Set(is_paid);
        }
        if let Some(is_complementary) = changes.is_complementary {
            active.is_complementary = Set(is_complementary);
        }
        active.updated_at = Set(changes.updated_at);
        active.update(&txn).await.map_err(db_err)?;

        let updated = load_booking(&txn, booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    async fn transition_stay(
        &self,
        room_booking_id: i32,
        from: StayStatus,
        to: StayStatus,
    ) -> DomainResult<(RoomBooking, Room)> {
        debug!("Room booking {}: {} -> {}", room_booking_id, from, to);

        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = room_booking::Entity::find_by_id(room_booking_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("RoomBooking", room_booking_id))?;

        let current = stay_status_to_domain(existing.status);
        if current != from {
            return Err(DomainError::Validation(format!(
                "room booking {room_booking_id} is {current}, expected {from}"
            )));
        }

        let room_id = existing.room_id;
        let now = Utc::now();
        let mut active: room_booking::ActiveModel = existing.into();
        active.status = Set(stay_status_from_domain(to));
        active.updated_at = Set(now);
        let saved_stay = active.update(&txn).await.map_err(db_err)?;

        let checked_in = room_booking::Entity::find()
            .filter(room_booking::Column::RoomId.eq(room_id))
            .filter(room_booking::Column::Status.eq(room_booking::StayStatus::CheckedIn))
            .count(&txn)
            .await
            .map_err(db_err)?;

        let room_model = room::Entity::find_by_id(room_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Room", room_id))?;
        let mut active_room: room::ActiveModel = room_model.into();
        active_room.status = Set(room_repository::status_from_domain(RoomStatus::derived(
            checked_in > 0,
        )));
        active_room.updated_at = Set(now);
        let saved_room = active_room.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok((
            stay_to_domain(saved_stay)?,
            room_repository::model_to_domain(saved_room),
        ))
    }

    async fn mark_paid(&self, id: i32, method: PaymentMethod) -> DomainResult<Option<Booking>> {
        debug!("Marking booking {} paid by {}", id, method);

        let Some(existing) = booking::Entity::find_by_id(id)
            .filter(booking::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: booking::ActiveModel = existing.into();
        active.is_paid = Set(true);
        active.payment_method = Set(method_from_domain(method));
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        load_booking(&self.db, id).await
    }

    async fn delete_with_room_bookings(&self, id: i32) -> DomainResult<bool> {
        debug!("Deleting booking {} with its room bookings", id);

        let txn = self.db.begin().await.map_err(db_err)?;

        let exists = booking::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .is_some();
        if !exists {
            return Ok(false);
        }

        room_booking::Entity::delete_many()
            .filter(room_booking::Column::BookingId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        booking::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn ledger(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<LedgerRow>> {
        debug!("Building ledger for {} .. {}", start, end);

        let stays = room_booking::Entity::find()
            .filter(room_booking::Column::StartDate.between(start, end))
            .filter(room_booking::Column::EndDate.between(start, end))
            .order_by_asc(room_booking::Column::StartDate)
            .order_by_asc(room_booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        if stays.is_empty() {
            return Ok(Vec::new());
        }

        let booking_ids: HashSet<i32> = stays.iter().map(|s| s.booking_id).collect();
        let bookings: HashMap<i32, booking::Model> = booking::Entity::find()
            .filter(booking::Column::Id.is_in(booking_ids))
            .filter(booking::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let customer_ids: HashSet<i32> = bookings.values().filter_map(|b| b.customer_id).collect();
        let customers: HashMap<i32, customer::Model> = customer::Entity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let room_ids: HashSet<i32> = stays.iter().map(|s| s.room_id).collect();
        let rooms: HashMap<i32, room::Model> = room::Entity::find()
            .filter(room::Column::Id.is_in(room_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        stays
            .into_iter()
            .filter_map(|stay| {
                let booking = bookings.get(&stay.booking_id)?;
                let customer = customers.get(&booking.customer_id?)?;
                let room = rooms.get(&stay.room_id)?;
                let number_of_nights = match nights_from_db(stay.id, stay.number_of_nights) {
                    Ok(nights) => nights,
                    Err(e) => return Some(Err(e)),
                };
                Some(Ok(LedgerRow {
                    first_name: customer.first_name.clone(),
                    last_name: customer.last_name.clone(),
                    phone_number: customer.phone.clone(),
                    address: customer.address.clone(),
                    email_address: customer.email.clone(),
                    payment_method: method_to_domain(booking.payment_method),
                    amount: booking.amount,
                    checkin_date: stay.start_date,
                    checkout_date: stay.end_date,
                    number_of_nights,
                    receptionist: booking.receptionist,
                    room_number: room.name.clone(),
                }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone};

    use super::*;
    use crate::domain::booking::NewRoomBooking;
    use crate::domain::customer::{CustomerRepository, NewCustomer};
    use crate::domain::room::{NewRoom, RoomRepository};
    use crate::infrastructure::database::memory_database;
    use crate::infrastructure::database::repositories::{
        SeaOrmCustomerRepository, SeaOrmRoomRepository,
    };

    struct Fixture {
        db: DatabaseConnection,
        repo: SeaOrmBookingRepository,
        customer_id: i32,
        room_a: i32,
        room_b: i32,
    }

    async fn fixture() -> Fixture {
        let db = memory_database().await;
        let rooms = SeaOrmRoomRepository::new(db.clone());
        let customers = SeaOrmCustomerRepository::new(db.clone());

        let customer = customers
            .create(NewCustomer {
                first_name: "Ada".into(),
                last_name: "Obi".into(),
                phone: "0800".into(),
                email: "ada@example.com".into(),
                plate_number: "LAG-1".into(),
                address: Some("1 Marina".into()),
                emergency_contact: None,
                image_url: None,
            })
            .await
            .unwrap();
        let mut room_ids = Vec::new();
        for name in ["101", "102"] {
            let room = rooms
                .create(NewRoom {
                    name: name.into(),
                    category: None,
                    description: None,
                    price: 5000,
                    status: RoomStatus::Available,
                })
                .await
                .unwrap();
            room_ids.push(room.id);
        }

        Fixture {
            repo: SeaOrmBookingRepository::new(db.clone()),
            db,
            customer_id: customer.id,
            room_a: room_ids[0],
            room_b: room_ids[1],
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn stay(room_id: i32, start: DateTime<Utc>, nights: u32) -> NewRoomBooking {
        NewRoomBooking {
            room_id,
            number_of_nights: nights,
            start_date: start,
            end_date: start + Duration::days(i64::from(nights)),
            amount: 5000 * i64::from(nights),
        }
    }

    fn two_room_booking(f: &Fixture) -> NewBooking {
        NewBooking {
            customer_id: f.customer_id,
            receptionist: None,
            amount: 15000,
            is_paid: false,
            payment_method: PaymentMethod::Cash,
            is_complementary: false,
            created_at: noon(2024, 6, 1),
            room_bookings: vec![
                stay(f.room_a, noon(2024, 6, 1), 2),
                stay(f.room_b, noon(2024, 6, 1), 1),
            ],
        }
    }

    async fn row_counts(db: &DatabaseConnection) -> (u64, u64) {
        let bookings = booking::Entity::find().count(db).await.unwrap();
        let stays = room_booking::Entity::find().count(db).await.unwrap();
        (bookings, stays)
    }

    #[tokio::test]
    async fn create_persists_booking_with_all_stays() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();

        assert_eq!(created.room_bookings.len(), 2);
        assert!(created.room_bookings.iter().all(|s| s.status == StayStatus::Reserved));

        let loaded = f.repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.amount, 15000);
        assert_eq!(loaded.room_bookings[0].room_id, f.room_a);
        assert_eq!(loaded.room_bookings[0].end_date, noon(2024, 6, 3));
    }

    #[tokio::test]
    async fn check_in_and_out_recompute_room_status() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        let stay_id = created.room_bookings[0].id;

        let (stay, room) = f
            .repo
            .transition_stay(stay_id, StayStatus::Reserved, StayStatus::CheckedIn)
            .await
            .unwrap();
        assert_eq!(stay.status, StayStatus::CheckedIn);
        assert_eq!(room.status, RoomStatus::Unavailable);
        assert_eq!(f.repo.checked_in_room_bookings().await.unwrap().len(), 1);

        let (stay, room) = f
            .repo
            .transition_stay(stay_id, StayStatus::CheckedIn, StayStatus::CheckedOut)
            .await
            .unwrap();
        assert_eq!(stay.status, StayStatus::CheckedOut);
        assert_eq!(room.status, RoomStatus::Available);
        assert!(f.repo.booked_room_bookings(f.room_a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_transition_is_rejected() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        let stay_id = created.room_bookings[0].id;

        let err = f
            .repo
            .transition_stay(stay_id, StayStatus::CheckedIn, StayStatus::CheckedOut)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_removes_booking_and_stays() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        assert_eq!(row_counts(&f.db).await, (1, 2));

        assert!(f.repo.delete_with_room_bookings(created.id).await.unwrap());
        assert_eq!(row_counts(&f.db).await, (0, 0));
        assert!(!f.repo.delete_with_room_bookings(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn failed_delete_rolls_back_every_row() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        f.db.execute_unprepared(
            "CREATE TRIGGER block_booking_delete BEFORE DELETE ON bookings \
             BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
        )
        .await
        .unwrap();

        let result = f.repo.delete_with_room_bookings(created.id).await;
        assert!(result.is_err());
        assert_eq!(row_counts(&f.db).await, (1, 2));
    }

    #[tokio::test]
    async fn update_rejects_stay_of_another_booking() {
        let f = fixture().await;
        let first = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        let mut other = two_room_booking(&f);
        other.room_bookings.truncate(1);
        let second = f.repo.create_with_room_bookings(other).await.unwrap();

        let err = f
            .repo
            .update_with_room_booking(
                first.id,
                BookingChanges {
                    payment_method: None,
                    is_paid: None,
                    is_complementary: None,
                    updated_at: Utc::now(),
                },
                second.room_bookings[0].id,
                RoomBookingChanges {
                    number_of_nights: 1,
                    start_date: noon(2024, 7, 1),
                    end_date: noon(2024, 7, 2),
                    amount: 5000,
                    updated_at: Utc::now(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "RoomBooking", .. }));
    }

    #[tokio::test]
    async fn update_stores_sum_of_stays_as_total() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        let (first, second) = (created.room_bookings[0].id, created.room_bookings[1].id);
        let changes = || BookingChanges {
            payment_method: None,
            is_paid: None,
            is_complementary: None,
            updated_at: Utc::now(),
        };
        let lengthen = |nights: u32| RoomBookingChanges {
            number_of_nights: nights,
            start_date: noon(2024, 6, 1),
            end_date: noon(2024, 6, 1) + Duration::days(i64::from(nights)),
            amount: 5000 * i64::from(nights),
            updated_at: Utc::now(),
        };

        let updated = f
            .repo
            .update_with_room_booking(created.id, changes(), first, lengthen(3))
            .await
            .unwrap();
        assert_eq!(updated.amount, 15000 + 5000);

        // The second update only knows its own stay; the first one's new
        // amount must still be counted.
        let updated = f
            .repo
            .update_with_room_booking(created.id, changes(), second, lengthen(2))
            .await
            .unwrap();
        assert_eq!(updated.amount, 15000 + 10000);

        let loaded = f.repo.find_by_id(created.id).await.unwrap().unwrap();
        let sum: i64 = loaded.room_bookings.iter().map(|s| s.amount).sum();
        assert_eq!(loaded.amount, sum);
    }

    #[tokio::test]
    async fn corrupt_night_count_is_a_persistence_error() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        let stay_id = created.room_bookings[0].id;
        f.db.execute_unprepared(&format!(
            "UPDATE room_bookings SET number_of_nights = -1 WHERE id = {stay_id}"
        ))
        .await
        .unwrap();

        let err = f.repo.find_by_id(created.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        let err = f.repo.find_room_booking(stay_id).await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        let err = f
            .repo
            .ledger(noon(2024, 5, 1), noon(2024, 7, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[tokio::test]
    async fn find_all_filters_by_creation_day_inclusive() {
        let f = fixture().await;
        let mut late = two_room_booking(&f);
        late.created_at = Utc.with_ymd_and_hms(2024, 6, 3, 23, 30, 0).unwrap();
        f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();
        f.repo.create_with_room_bookings(late).await.unwrap();

        let filter = BookingFilter {
            start: NaiveDate::from_ymd_opt(2024, 6, 2),
            end: NaiveDate::from_ymd_opt(2024, 6, 3),
            ..Default::default()
        };
        let found = f.repo.find_all(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].room_bookings.len(), 2);

        let everything = f.repo.find_all(&BookingFilter::default()).await.unwrap();
        assert_eq!(everything.len(), 2);
        assert!(everything[0].created_at > everything[1].created_at);
    }

    #[tokio::test]
    async fn ledger_joins_customer_and_room() {
        let f = fixture().await;
        f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();

        let rows = f
            .repo
            .ledger(noon(2024, 5, 31), noon(2024, 6, 2))
            .await
            .unwrap();
        // Only the one-night stay ends inside the window.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].room_number, "102");
        assert_eq!(rows[0].last_name, "Obi");
        assert_eq!(rows[0].amount, 15000);
    }

    #[tokio::test]
    async fn mark_paid_sets_flag_and_method() {
        let f = fixture().await;
        let created = f.repo.create_with_room_bookings(two_room_booking(&f)).await.unwrap();

        let paid = f
            .repo
            .mark_paid(created.id, PaymentMethod::Transfer)
            .await
            .unwrap()
            .unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.payment_method, PaymentMethod::Transfer);
        assert!(f.repo.mark_paid(999, PaymentMethod::Cash).await.unwrap().is_none());
    }
}
