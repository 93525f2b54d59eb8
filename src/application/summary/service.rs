//! Summary and ledger queries

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use super::aggregate::{summarize, BookingSummary};
use crate::domain::booking::BookingFilter;
use crate::domain::{DomainError, DomainResult, LedgerRow, RepositoryProvider};
use crate::shared::SharedClock;

pub struct SummaryService {
    repos: Arc<dyn RepositoryProvider>,
    clock: SharedClock,
}

impl SummaryService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: SharedClock) -> Self {
        Self { repos, clock }
    }

    /// Summary of bookings created within `[start, end]` (whole days, both optional)
    pub async fn summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> DomainResult<BookingSummary> {
        check_range(start, end)?;

        let filter = BookingFilter {
            start,
            end,
            ..Default::default()
        };
        let bookings = self.repos.bookings().find_all(&filter).await?;
        let rooms = self.repos.rooms().find_all().await?;
        let checked_in = self.repos.bookings().checked_in_room_bookings().await?;

        debug!(
            bookings = bookings.len(),
            rooms = rooms.len(),
            "Summarizing bookings"
        );
        Ok(summarize(&bookings, &rooms, &checked_in, self.clock.now()))
    }

    /// Front-desk ledger: stays that start and end within `[start, end]`
    pub async fn ledger(&self, start: NaiveDate, end: NaiveDate) -> DomainResult<Vec<LedgerRow>> {
        check_range(Some(start), Some(end))?;

        let from = start.and_time(NaiveTime::MIN).and_utc();
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        let until = end.and_time(end_of_day).and_utc();
        self.repos.bookings().ledger(from, until).await
    }
}

fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> DomainResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(DomainError::Validation(format!(
            "start {start} is after end {end}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::application::booking::{
        BookingService, CreateBookingRequest, RoomLocks, StayRequest,
    };
    use crate::domain::customer::NewCustomer;
    use crate::domain::room::NewRoom;
    use crate::domain::{PaymentMethod, RoomStatus};
    use crate::infrastructure::database::memory_database;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::notifications::create_event_bus;
    use crate::shared::FixedClock;

    #[tokio::test]
    async fn summary_reflects_bookings_and_check_ins() {
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(memory_database().await));
        let clock: SharedClock =
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap()));
        let bookings = BookingService::new(
            repos.clone(),
            create_event_bus(),
            clock.clone(),
            Arc::new(RoomLocks::new()),
        );
        let summaries = SummaryService::new(repos.clone(), clock);

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
        let mut room_ids = Vec::new();
        for name in ["101", "102", "103"] {
            let room = repos
                .rooms()
                .create(NewRoom {
                    name: name.into(),
                    category: None,
                    description: None,
                    price: 100,
                    status: RoomStatus::Available,
                })
                .await
                .unwrap();
            room_ids.push(room.id);
        }

        let booking = bookings
            .create_booking(CreateBookingRequest {
                customer_id: customer.id,
                receptionist: None,
                payment_method: PaymentMethod::Card,
                is_paid: true,
                is_complementary: false,
                room_bookings: vec![StayRequest {
                    room_id: room_ids[0],
                    start_date: None,
                    number_of_nights: 2,
                    amount: None,
                }],
            })
            .await
            .unwrap();
        bookings.check_in(booking.room_bookings[0].id).await.unwrap();

        let summary = summaries.summary(None, None).await.unwrap();
        assert_eq!(summary.total_bookings, 1);
        assert_eq!(summary.card_amount, 200);
        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.available_rooms, 2);

        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let ledger = summaries.ledger(day, later).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].room_number, "101");
        assert_eq!(ledger[0].number_of_nights, 2);

        assert!(matches!(
            summaries.summary(Some(later), Some(day)).await,
            Err(DomainError::Validation(_))
        ));
    }
}
