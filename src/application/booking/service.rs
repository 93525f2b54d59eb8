//! Booking lifecycle service
//!
//! Creation (with availability checks and pricing), update, check-in/out,
//! payment and deletion of bookings. HTTP handlers delegate here.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::conflict::check_conflict;
use super::locks::RoomLocks;
use super::occupancy::{resolve_occupied_nights, stay_bounds, MAX_NIGHTS};
use super::pricing::{booking_total, compute_room_booking_amount};
use crate::domain::booking::{
    BookingChanges, BookingFilter, NewBooking, NewRoomBooking, RoomBookingChanges,
};
use crate::domain::{
    Booking, DomainError, DomainResult, PaymentMethod, RepositoryProvider, Room, RoomBooking,
};
use crate::notifications::{
    BookingCreatedEvent, BookingDeletedEvent, BookingPaidEvent, BookingUpdatedEvent, Event,
    SharedEventBus, StayEvent,
};
use crate::shared::SharedClock;

/// One requested stay
#[derive(Debug, Clone)]
pub struct StayRequest {
    pub room_id: i32,
    /// Defaults to today
    pub start_date: Option<NaiveDate>,
    pub number_of_nights: u32,
    /// Per-night amount replacing the room's price
    pub amount: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    pub customer_id: i32,
    pub receptionist: Option<i32>,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub is_complementary: bool,
    pub room_bookings: Vec<StayRequest>,
}

/// Changes to a booking and one of its stays. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookingRequest {
    pub start_date: Option<NaiveDate>,
    pub number_of_nights: Option<u32>,
    /// Per-night amount replacing the room's price
    pub amount: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub is_paid: Option<bool>,
    pub is_complementary: Option<bool>,
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
    clock: SharedClock,
    locks: Arc<RoomLocks>,
}

impl BookingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        event_bus: SharedEventBus,
        clock: SharedClock,
        locks: Arc<RoomLocks>,
    ) -> Self {
        Self {
            repos,
            event_bus,
            clock,
            locks,
        }
    }

    // ── Creation ────────────────────────────────────────────────

    /// Check every requested stay for availability, price it, and persist the
    /// booking with all its stays in one transaction.
    pub async fn create_booking(&self, req: CreateBookingRequest) -> DomainResult<Booking> {
        validate_create(&req)?;

        self.repos
            .customers()
            .find_by_id(req.customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", req.customer_id))?;

        let room_ids: Vec<i32> = req.room_bookings.iter().map(|s| s.room_id).collect();
        let rooms = self.load_rooms(&room_ids).await?;

        let today = self.clock.today();
        let _guards = self.locks.acquire(&room_ids).await;

        let mut occupied: HashMap<i32, BTreeSet<NaiveDate>> = HashMap::new();
        for room_id in rooms.keys() {
            let stays = self.repos.bookings().booked_room_bookings(*room_id).await?;
            occupied.insert(*room_id, resolve_occupied_nights(&stays));
        }

        let mut stays = Vec::with_capacity(req.room_bookings.len());
        for stay in &req.room_bookings {
            let room = rooms
                .get(&stay.room_id)
                .ok_or_else(|| DomainError::not_found("Room", stay.room_id))?;
            let start = stay.start_date.unwrap_or(today);
            let taken = occupied.entry(room.id).or_default();

            if let Some(date) = check_conflict(taken, start, stay.number_of_nights)? {
                metrics::counter!("booking_conflicts_total").increment(1);
                warn!(room_id = room.id, %date, "Room unavailable for requested stay");
                return Err(DomainError::RoomUnavailable {
                    room_id: room.id,
                    room_name: room.name.clone(),
                    date,
                });
            }
            // Later stays of this request on the same room must not overlap it.
            taken.extend(start.iter_days().take(stay.number_of_nights as usize));

            let (start_date, end_date) = stay_bounds(start, stay.number_of_nights)?;
            stays.push(NewRoomBooking {
                room_id: room.id,
                number_of_nights: stay.number_of_nights,
                start_date,
                end_date,
                amount: compute_room_booking_amount(
                    stay.amount,
                    room.price,
                    stay.number_of_nights,
                )?,
            });
        }

        let amount = booking_total(stays.iter().map(|s| s.amount))?;
        let booking = self
            .repos
            .bookings()
            .create_with_room_bookings(NewBooking {
                customer_id: req.customer_id,
                receptionist: req.receptionist,
                amount,
                is_paid: req.is_paid,
                payment_method: req.payment_method,
                is_complementary: req.is_complementary,
                created_at: self.clock.now(),
                room_bookings: stays,
            })
            .await?;

        metrics::counter!("bookings_created_total").increment(1);
        info!(
            booking_id = booking.id,
            customer_id = req.customer_id,
            amount = booking.amount,
            stays = booking.room_bookings.len(),
            "Booking created"
        );

        self.event_bus
            .publish(Event::BookingCreated(BookingCreatedEvent {
                booking_id: booking.id,
                customer_id: booking.customer_id,
                receptionist: booking.receptionist,
                room_ids: booking.room_bookings.iter().map(|s| s.room_id).collect(),
                amount: booking.amount,
                timestamp: Utc::now(),
            }));

        Ok(booking)
    }

    async fn load_rooms(&self, room_ids: &[i32]) -> DomainResult<HashMap<i32, Room>> {
        let rooms: HashMap<i32, Room> = self
            .repos
            .rooms()
            .find_by_ids(room_ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        if let Some(missing) = room_ids.iter().find(|id| !rooms.contains_key(*id)) {
            return Err(DomainError::not_found("Room", *missing));
        }
        Ok(rooms)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get_booking(&self, id: i32) -> DomainResult<Booking> {
        self.repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", id))
    }

    pub async fn list_bookings(&self, filter: &BookingFilter) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_all(filter).await
    }

    /// A stay, provided it belongs to the given booking
    pub async fn view_room_booking(
        &self,
        booking_id: i32,
        room_booking_id: i32,
    ) -> DomainResult<RoomBooking> {
        let booking = self.get_booking(booking_id).await?;
        booking
            .room_bookings
            .into_iter()
            .find(|s| s.id == room_booking_id)
            .ok_or_else(|| DomainError::not_found("RoomBooking", room_booking_id))
    }

    /// Nights currently held on a room, ascending
    pub async fn booked_dates(&self, room_id: i32) -> DomainResult<BTreeSet<NaiveDate>> {
        self.repos
            .rooms()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", room_id))?;
        let stays = self.repos.bookings().booked_room_bookings(room_id).await?;
        Ok(resolve_occupied_nights(&stays))
    }

    // ── Update ──────────────────────────────────────────────────

    /// Re-date and re-price one stay and recompute the booking total.
    ///
    /// Availability is not re-checked here.
    pub async fn update_booking_and_room_booking(
        &self,
        booking_id: i32,
        room_booking_id: i32,
        req: UpdateBookingRequest,
    ) -> DomainResult<Booking> {
        match req.number_of_nights {
            Some(0) => {
                return Err(DomainError::Validation(
                    "number_of_nights must be at least 1".into(),
                ))
            }
            Some(n) if n > MAX_NIGHTS => {
                return Err(DomainError::Validation(format!(
                    "number_of_nights must be at most {MAX_NIGHTS}"
                )))
            }
            _ => {}
        }
        if matches!(req.amount, Some(a) if a < 0) {
            return Err(DomainError::Validation("amount must not be negative".into()));
        }

        let booking = self.get_booking(booking_id).await?;
        let stay = booking
            .room_bookings
            .iter()
            .find(|s| s.id == room_booking_id)
            .ok_or_else(|| DomainError::not_found("RoomBooking", room_booking_id))?;
        let room = self
            .repos
            .rooms()
            .find_by_id(stay.room_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Room", stay.room_id))?;

        let start = req.start_date.unwrap_or_else(|| stay.start_date.date_naive());
        let nights = req.number_of_nights.unwrap_or(stay.number_of_nights);
        let (start_date, end_date) = stay_bounds(start, nights)?;
        let stay_amount = compute_room_booking_amount(req.amount, room.price, nights)?;
        // Rejects a total that would overflow; the stored total is summed by
        // the repository inside the update transaction.
        booking_total(booking.room_bookings.iter().map(|s| {
            if s.id == room_booking_id {
                stay_amount
            } else {
                s.amount
            }
        }))?;

        let now = self.clock.now();
        let updated = self
            .repos
            .bookings()
            .update_with_room_booking(
                booking_id,
                BookingChanges {
                    payment_method: req.payment_method,
                    is_paid: req.is_paid,
                    is_complementary: req.is_complementary,
                    updated_at: now,
                },
                room_booking_id,
                RoomBookingChanges {
                    number_of_nights: nights,
                    start_date,
                    end_date,
                    amount: stay_amount,
                    updated_at: now,
                },
            )
            .await?;

        info!(booking_id, room_booking_id, amount = updated.amount, "Booking updated");
        self.event_bus
            .publish(Event::BookingUpdated(BookingUpdatedEvent {
                booking_id,
                room_booking_id,
                amount: updated.amount,
                timestamp: Utc::now(),
            }));

        Ok(updated)
    }

    // ── Check-in / check-out ────────────────────────────────────

    pub async fn check_in(&self, room_booking_id: i32) -> DomainResult<(RoomBooking, Room)> {
        let stay = self.find_stay(room_booking_id).await?;
        let next = stay.status.check_in()?;
        let (stay, room) = self
            .repos
            .bookings()
            .transition_stay(room_booking_id, stay.status, next)
            .await?;

        metrics::counter!("room_check_ins_total").increment(1);
        info!(room_booking_id, room_id = room.id, room_status = %room.status, "Checked in");
        self.event_bus.publish(Event::RoomCheckedIn(stay_event(&stay)));
        Ok((stay, room))
    }

    /// Check a guest out, or release a reservation that never checked in
    pub async fn check_out(&self, room_booking_id: i32) -> DomainResult<(RoomBooking, Room)> {
        let stay = self.find_stay(room_booking_id).await?;
        let next = stay.status.check_out()?;
        let (stay, room) = self
            .repos
            .bookings()
            .transition_stay(room_booking_id, stay.status, next)
            .await?;

        metrics::counter!("room_check_outs_total").increment(1);
        info!(room_booking_id, room_id = room.id, room_status = %room.status, "Checked out");
        self.event_bus.publish(Event::RoomCheckedOut(stay_event(&stay)));
        Ok((stay, room))
    }

    async fn find_stay(&self, room_booking_id: i32) -> DomainResult<RoomBooking> {
        self.repos
            .bookings()
            .find_room_booking(room_booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("RoomBooking", room_booking_id))
    }

    // ── Payment / deletion ──────────────────────────────────────

    pub async fn pay(&self, booking_id: i32, method: PaymentMethod) -> DomainResult<Booking> {
        let booking = self
            .repos
            .bookings()
            .mark_paid(booking_id, method)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

        info!(booking_id, method = %method, "Booking paid");
        self.event_bus.publish(Event::BookingPaid(BookingPaidEvent {
            booking_id,
            payment_method: method,
            timestamp: Utc::now(),
        }));
        Ok(booking)
    }

    pub async fn delete_booking(&self, booking_id: i32) -> DomainResult<()> {
        if !self
            .repos
            .bookings()
            .delete_with_room_bookings(booking_id)
            .await?
        {
            return Err(DomainError::not_found("Booking", booking_id));
        }

        info!(booking_id, "Booking deleted");
        self.event_bus
            .publish(Event::BookingDeleted(BookingDeletedEvent {
                booking_id,
                timestamp: Utc::now(),
            }));
        Ok(())
    }
}

fn stay_event(stay: &RoomBooking) -> StayEvent {
    StayEvent {
        booking_id: stay.booking_id,
        room_booking_id: stay.id,
        room_id: stay.room_id,
        timestamp: Utc::now(),
    }
}

/// Shape checks that need no store access
fn validate_create(req: &CreateBookingRequest) -> DomainResult<()> {
    if req.customer_id <= 0 {
        return Err(DomainError::Validation("customer_id must be positive".into()));
    }
    if req.room_bookings.is_empty() {
        return Err(DomainError::Validation(
            "at least one room booking is required".into(),
        ));
    }
    for stay in &req.room_bookings {
        if stay.room_id <= 0 {
            return Err(DomainError::Validation("room_id must be positive".into()));
        }
        if stay.number_of_nights == 0 {
            return Err(DomainError::Validation(
                "number_of_nights must be at least 1".into(),
            ));
        }
        if stay.number_of_nights > MAX_NIGHTS {
            return Err(DomainError::Validation(format!(
                "number_of_nights must be at most {MAX_NIGHTS}"
            )));
        }
        if matches!(stay.amount, Some(a) if a < 0) {
            return Err(DomainError::Validation("amount must not be negative".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::customer::NewCustomer;
    use crate::domain::room::NewRoom;
    use crate::domain::{RoomStatus, StayStatus};
    use crate::infrastructure::database::memory_database;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::notifications::create_event_bus;
    use crate::shared::FixedClock;

    struct Harness {
        service: Arc<BookingService>,
        repos: Arc<dyn RepositoryProvider>,
        bus: SharedEventBus,
        customer_id: i32,
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    async fn harness() -> Harness {
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(memory_database().await));
        let bus = create_event_bus();
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap()));
        let customer = repos
            .customers()
            .create(NewCustomer {
                first_name: "Ada".into(),
                last_name: "Obi".into(),
                phone: "0800".into(),
                email: "ada@example.com".into(),
                plate_number: "LAG-1".into(),
                address: None,
                emergency_contact: None,
                image_url: None,
            })
            .await
            .unwrap();

        Harness {
            service: Arc::new(BookingService::new(
                repos.clone(),
                bus.clone(),
                clock,
                Arc::new(RoomLocks::new()),
            )),
            repos,
            bus,
            customer_id: customer.id,
        }
    }

    async fn add_room(h: &Harness, name: &str, price: i64) -> Room {
        h.repos
            .rooms()
            .create(NewRoom {
                name: name.into(),
                category: Some("standard".into()),
                description: None,
                price,
                status: RoomStatus::Available,
            })
            .await
            .unwrap()
    }

    fn request(customer_id: i32, stays: Vec<StayRequest>) -> CreateBookingRequest {
        CreateBookingRequest {
            customer_id,
            receptionist: None,
            payment_method: PaymentMethod::Cash,
            is_paid: false,
            is_complementary: false,
            room_bookings: stays,
        }
    }

    fn stay(room_id: i32, start: Option<NaiveDate>, nights: u32) -> StayRequest {
        StayRequest {
            room_id,
            start_date: start,
            number_of_nights: nights,
            amount: None,
        }
    }

    #[tokio::test]
    async fn create_prices_stay_and_anchors_dates() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;

        let booking = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 2)]))
            .await
            .unwrap();

        assert_eq!(booking.amount, 100);
        let s = &booking.room_bookings[0];
        assert_eq!(s.amount, 100);
        assert_eq!(s.start_date.to_rfc3339(), "2024-06-01T12:00:00+00:00");
        assert_eq!(s.end_date.to_rfc3339(), "2024-06-03T12:00:00+00:00");
        assert_eq!(s.status, StayStatus::Reserved);

        let nights = h.service.booked_dates(room.id).await.unwrap();
        assert_eq!(nights.into_iter().collect::<Vec<_>>(), vec![date(6, 1), date(6, 2)]);
    }

    #[tokio::test]
    async fn overlapping_stay_is_rejected_with_first_conflicting_date() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        h.service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 2)]))
            .await
            .unwrap();

        let err = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 2)), 1)]))
            .await
            .unwrap_err();
        match err {
            DomainError::RoomUnavailable {
                room_id,
                room_name,
                date: d,
            } => {
                assert_eq!(room_id, room.id);
                assert_eq!(room_name, "101");
                assert_eq!(d, date(6, 2));
            }
            other => panic!("expected RoomUnavailable, got {other:?}"),
        }

        // Departure day is free for the next arrival.
        h.service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 3)), 1)]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn identical_requests_second_one_conflicts() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let req = request(h.customer_id, vec![stay(room.id, Some(date(7, 1)), 3)]);

        h.service.create_booking(req.clone()).await.unwrap();
        assert!(matches!(
            h.service.create_booking(req).await,
            Err(DomainError::RoomUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn overlap_within_one_request_is_rejected_atomically() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let other = add_room(&h, "102", 70).await;

        let err = h
            .service
            .create_booking(request(
                h.customer_id,
                vec![
                    stay(other.id, Some(date(6, 1)), 1),
                    stay(room.id, Some(date(6, 1)), 3),
                    stay(room.id, Some(date(6, 2)), 1),
                ],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RoomUnavailable { date: d, .. } if d == date(6, 2)));

        // Nothing was persisted, not even the non-conflicting stay.
        assert!(h.service.booked_dates(other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn multi_room_total_and_default_start_date() {
        let h = harness().await;
        let a = add_room(&h, "101", 50).await;
        let b = add_room(&h, "102", 80).await;

        let booking = h
            .service
            .create_booking(request(
                h.customer_id,
                vec![
                    stay(a.id, None, 2),
                    StayRequest {
                        amount: Some(60),
                        ..stay(b.id, None, 3)
                    },
                ],
            ))
            .await
            .unwrap();

        assert_eq!(booking.amount, 100 + 180);
        // FixedClock date
        assert_eq!(booking.room_bookings[0].start_date.date_naive(), date(5, 20));
    }

    #[tokio::test]
    async fn validation_runs_before_lookups() {
        let h = harness().await;
        // Neither customer 999 nor room 999 exist; the zero-night stay is reported first.
        let err = h
            .service
            .create_booking(request(999, vec![stay(999, None, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = h
            .service
            .create_booking(request(h.customer_id, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn overlong_stay_is_rejected_before_pricing() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;

        for nights in [MAX_NIGHTS + 1, 200_000_000, u32::MAX] {
            let err = h
                .service
                .create_booking(request(h.customer_id, vec![stay(room.id, None, nights)]))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{nights}: {err:?}");
        }
        assert!(h.service.booked_dates(room.id).await.unwrap().is_empty());

        let booking = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, None, MAX_NIGHTS)]))
            .await
            .unwrap();
        assert_eq!(booking.room_bookings[0].number_of_nights, MAX_NIGHTS);
    }

    #[tokio::test]
    async fn unknown_customer_or_room_is_not_found() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;

        let err = h
            .service
            .create_booking(request(999, vec![stay(room.id, None, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Customer", .. }));

        let err = h
            .service
            .create_booking(request(h.customer_id, vec![stay(4242, None, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Room", .. }));
    }

    #[tokio::test]
    async fn check_in_and_out_toggle_room_availability() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let booking = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 2)]))
            .await
            .unwrap();
        let stay_id = booking.room_bookings[0].id;

        let (stay, room_after) = h.service.check_in(stay_id).await.unwrap();
        assert!(stay.status.is_checked_in());
        assert_eq!(room_after.status, RoomStatus::Unavailable);

        assert!(matches!(
            h.service.check_in(stay_id).await,
            Err(DomainError::Validation(_))
        ));

        let (stay, room_after) = h.service.check_out(stay_id).await.unwrap();
        assert!(stay.status.is_checked_out());
        assert_eq!(room_after.status, RoomStatus::Available);

        // Checked-out stays free their nights.
        assert!(h.service.booked_dates(room.id).await.unwrap().is_empty());
        assert!(matches!(
            h.service.check_out(stay_id).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn room_stays_unavailable_while_another_stay_is_checked_in() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let first = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 1)]))
            .await
            .unwrap();
        let second = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 2)), 1)]))
            .await
            .unwrap();

        h.service.check_in(first.room_bookings[0].id).await.unwrap();
        h.service.check_in(second.room_bookings[0].id).await.unwrap();
        let (_, room_after) = h.service.check_out(first.room_bookings[0].id).await.unwrap();
        assert_eq!(room_after.status, RoomStatus::Unavailable);
    }

    #[tokio::test]
    async fn no_show_reservation_can_be_released() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let booking = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 1)]))
            .await
            .unwrap();

        let (released, _) = h.service.check_out(booking.room_bookings[0].id).await.unwrap();
        assert_eq!(released.status, StayStatus::CheckedOut);

        // The released night can be sold again.
        h.service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 1)]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_reprices_stay_and_recomputes_total() {
        let h = harness().await;
        let a = add_room(&h, "101", 50).await;
        let b = add_room(&h, "102", 80).await;
        let booking = h
            .service
            .create_booking(request(
                h.customer_id,
                vec![stay(a.id, Some(date(6, 1)), 2), stay(b.id, Some(date(6, 1)), 1)],
            ))
            .await
            .unwrap();
        let target = booking.room_bookings[0].id;

        let updated = h
            .service
            .update_booking_and_room_booking(
                booking.id,
                target,
                UpdateBookingRequest {
                    number_of_nights: Some(4),
                    is_paid: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let s = updated.room_bookings.iter().find(|s| s.id == target).unwrap();
        assert_eq!(s.amount, 200);
        assert_eq!(s.end_date.date_naive(), date(6, 5));
        assert_eq!(updated.amount, 200 + 80);
        assert!(updated.is_paid);
    }

    #[tokio::test]
    async fn update_may_extend_into_another_booking() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let first = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 2)]))
            .await
            .unwrap();
        h.service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 3)), 1)]))
            .await
            .unwrap();

        // Updates are not re-checked against other stays.
        let extended = h
            .service
            .update_booking_and_room_booking(
                first.id,
                first.room_bookings[0].id,
                UpdateBookingRequest {
                    number_of_nights: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(extended.room_bookings[0].end_date.date_naive(), date(6, 4));
    }

    #[tokio::test]
    async fn update_rejects_overlong_stay() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let booking = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 1)]))
            .await
            .unwrap();
        let target = booking.room_bookings[0].id;

        for nights in [MAX_NIGHTS + 1, u32::MAX] {
            let err = h
                .service
                .update_booking_and_room_booking(
                    booking.id,
                    target,
                    UpdateBookingRequest {
                        number_of_nights: Some(nights),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{nights}: {err:?}");
        }

        let unchanged = h.service.get_booking(booking.id).await.unwrap();
        assert_eq!(unchanged.room_bookings[0].number_of_nights, 1);
        assert_eq!(unchanged.amount, 50);
    }

    #[tokio::test]
    async fn concurrent_updates_of_different_stays_keep_total_consistent() {
        let h = harness().await;
        let a = add_room(&h, "101", 50).await;
        let b = add_room(&h, "102", 80).await;
        let booking = h
            .service
            .create_booking(request(
                h.customer_id,
                vec![stay(a.id, Some(date(6, 1)), 1), stay(b.id, Some(date(6, 1)), 1)],
            ))
            .await
            .unwrap();
        let stay_of = |room_id: i32| {
            booking
                .room_bookings
                .iter()
                .find(|s| s.room_id == room_id)
                .unwrap()
                .id
        };
        let (first, second) = (stay_of(a.id), stay_of(b.id));

        let lengthen = |id: i32, nights: u32| {
            let service = h.service.clone();
            let booking_id = booking.id;
            async move {
                service
                    .update_booking_and_room_booking(
                        booking_id,
                        id,
                        UpdateBookingRequest {
                            number_of_nights: Some(nights),
                            ..Default::default()
                        },
                    )
                    .await
            }
        };
        let (r1, r2) = tokio::join!(lengthen(first, 3), lengthen(second, 2));
        r1.unwrap();
        r2.unwrap();

        let stored = h.service.get_booking(booking.id).await.unwrap();
        let sum: i64 = stored.room_bookings.iter().map(|s| s.amount).sum();
        assert_eq!(sum, 3 * 50 + 2 * 80);
        assert_eq!(stored.amount, sum);
    }

    #[tokio::test]
    async fn update_requires_stay_of_that_booking() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let one = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 1)]))
            .await
            .unwrap();
        let two = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 5)), 1)]))
            .await
            .unwrap();

        let err = h
            .service
            .update_booking_and_room_booking(
                one.id,
                two.room_bookings[0].id,
                UpdateBookingRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "RoomBooking", .. }));
        assert!(h
            .service
            .view_room_booking(one.id, two.room_bookings[0].id)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn concurrent_requests_for_same_night_admit_one() {
        let h = harness().await;
        let room = add_room(&h, "101", 50).await;
        let req = request(h.customer_id, vec![stay(room.id, Some(date(8, 1)), 2)]);

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let service = h.service.clone();
                let req = req.clone();
                tokio::spawn(async move { service.create_booking(req).await })
            })
            .collect();

        let mut ok = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => ok += 1,
                Err(DomainError::RoomUnavailable { .. }) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn pay_delete_and_events() {
        let h = harness().await;
        let mut events = h.bus.subscribe();
        let room = add_room(&h, "101", 50).await;
        let booking = h
            .service
            .create_booking(request(h.customer_id, vec![stay(room.id, Some(date(6, 1)), 1)]))
            .await
            .unwrap();

        let paid = h.service.pay(booking.id, PaymentMethod::Card).await.unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.payment_method, PaymentMethod::Card);

        h.service.delete_booking(booking.id).await.unwrap();
        assert!(matches!(
            h.service.get_booking(booking.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            h.service.delete_booking(booking.id).await,
            Err(DomainError::NotFound { .. })
        ));

        let kinds: Vec<&str> = [
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ]
        .iter()
        .map(|m| m.event.event_type())
        .collect();
        assert_eq!(kinds, vec!["booking_created", "booking_paid", "booking_deleted"]);
    }
}
