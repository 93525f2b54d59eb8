//! Background task that turns booking events into receipts.
//!
//! Subscribes to the event bus; for every `BookingCreated` / `BookingUpdated`
//! it loads the booking, customer and room, then mails and prints the
//! receipt on separate tasks. Nothing here can fail a booking request.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::mailer::ReceiptMailer;
use super::printer::ReceiptPrinter;
use super::receipt::Receipt;
use crate::domain::RepositoryProvider;
use crate::notifications::{Event, SharedEventBus};
use crate::shared::{
    retry_with_backoff, NotificationError, RetryConfig, SharedClock, ShutdownSignal,
};

pub struct ReceiptWorker {
    repos: Arc<dyn RepositoryProvider>,
    mailer: Arc<dyn ReceiptMailer>,
    printer: Option<Arc<dyn ReceiptPrinter>>,
    clock: SharedClock,
    retry: RetryConfig,
}

impl ReceiptWorker {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        mailer: Arc<dyn ReceiptMailer>,
        printer: Option<Arc<dyn ReceiptPrinter>>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repos,
            mailer,
            printer,
            clock,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Spawn the subscription loop. It ends on shutdown or when the bus closes.
    pub fn start(self, event_bus: SharedEventBus, shutdown: ShutdownSignal) -> JoinHandle<()> {
        let mut subscriber = event_bus.subscribe();
        let worker = Arc::new(self);

        tokio::spawn(async move {
            info!(
                printer = worker.printer.is_some(),
                "🧾 Receipt worker started"
            );

            loop {
                tokio::select! {
                    msg = subscriber.recv() => {
                        let Some(msg) = msg else { break };
                        if !msg.event.wants_receipt() {
                            continue;
                        }
                        if let Err(e) = worker.dispatch(&msg.event).await {
                            warn!(
                                booking_id = msg.event.booking_id(),
                                error = %e,
                                "Receipt not issued"
                            );
                        }
                    }
                    _ = shutdown.wait() => {
                        info!("🧾 Receipt worker shutting down");
                        break;
                    }
                }
            }

            info!("🧾 Receipt worker stopped");
        })
    }

    async fn dispatch(&self, event: &Event) -> Result<(), NotificationError> {
        let (receipt, recipient) = self.build_receipt(event).await?;
        let receipt = Arc::new(receipt);

        let mailer = self.mailer.clone();
        let retry = self.retry.clone();
        let mail_receipt = receipt.clone();
        tokio::spawn(async move {
            let result = retry_with_backoff(
                &retry,
                || mailer.send_receipt(&recipient, &mail_receipt),
                |e| matches!(e, NotificationError::Io(_)),
                "send_receipt",
            )
            .await;
            if let Err(e) = result {
                warn!(
                    receipt_number = %mail_receipt.receipt_number,
                    error = %e,
                    "Failed to mail receipt"
                );
            }
        });

        if let Some(printer) = self.printer.clone() {
            tokio::spawn(async move {
                if let Err(e) = printer.print_receipt(&receipt).await {
                    warn!(
                        receipt_number = %receipt.receipt_number,
                        error = %e,
                        "Failed to print receipt"
                    );
                }
            });
        }
        Ok(())
    }

    async fn build_receipt(&self, event: &Event) -> Result<(Receipt, String), NotificationError> {
        let booking_id = event.booking_id();
        let missing = |what: String| NotificationError::MissingData(what);

        let booking = self
            .repos
            .bookings()
            .find_by_id(booking_id)
            .await
            .map_err(|e| missing(e.to_string()))?
            .ok_or_else(|| missing(format!("booking {booking_id}")))?;

        let customer_id = booking
            .customer_id
            .ok_or_else(|| missing(format!("booking {booking_id} has no customer")))?;
        let customer = self
            .repos
            .customers()
            .find_by_id(customer_id)
            .await
            .map_err(|e| missing(e.to_string()))?
            .ok_or_else(|| missing(format!("customer {customer_id}")))?;

        // The updated stay for updates, otherwise the first one.
        let stay = match event {
            Event::BookingUpdated(e) => booking
                .room_bookings
                .iter()
                .find(|s| s.id == e.room_booking_id),
            _ => None,
        }
        .or_else(|| booking.room_bookings.first())
        .ok_or_else(|| missing(format!("booking {booking_id} has no stays")))?;

        let room = self
            .repos
            .rooms()
            .find_by_id(stay.room_id)
            .await
            .map_err(|e| missing(e.to_string()))?
            .ok_or_else(|| missing(format!("room {}", stay.room_id)))?;

        let receipt = Receipt::build(&booking, &customer, stay, &room, self.clock.now());
        debug!(
            booking_id,
            receipt_number = %receipt.receipt_number,
            "Receipt built"
        );
        Ok((receipt, customer.email))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tokio::sync::mpsc;

    use super::*;
    use crate::application::booking::{BookingService, CreateBookingRequest, RoomLocks, StayRequest};
    use crate::domain::customer::NewCustomer;
    use crate::domain::room::NewRoom;
    use crate::domain::{PaymentMethod, RoomStatus};
    use crate::infrastructure::database::memory_database;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::notifications::create_event_bus;
    use crate::shared::FixedClock;

    struct ChannelMailer(mpsc::UnboundedSender<(String, Receipt)>);

    #[async_trait]
    impl ReceiptMailer for ChannelMailer {
        async fn send_receipt(
            &self,
            recipient: &str,
            receipt: &Receipt,
        ) -> Result<(), NotificationError> {
            let _ = self.0.send((recipient.to_string(), receipt.clone()));
            Ok(())
        }
    }

    struct BrokenPrinter;

    #[async_trait]
    impl ReceiptPrinter for BrokenPrinter {
        async fn print_receipt(&self, _: &Receipt) -> Result<(), NotificationError> {
            Err(NotificationError::Print("paper jam".into()))
        }
    }

    #[tokio::test]
    async fn created_booking_is_mailed_even_when_printer_fails() {
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(memory_database().await));
        let bus = create_event_bus();
        let clock: SharedClock =
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap()));
        let shutdown = ShutdownSignal::new();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ReceiptWorker::new(
            repos.clone(),
            Arc::new(ChannelMailer(tx)),
            Some(Arc::new(BrokenPrinter)),
            clock.clone(),
        )
        .start(bus.clone(), shutdown.clone());

        let customer = repos
            .customers()
            .create(NewCustomer {
                first_name: "Tunde".into(),
                last_name: "Bello".into(),
                phone: "0809".into(),
                email: "tunde@example.com".into(),
                plate_number: "ABJ-9".into(),
                address: None,
                emergency_contact: None,
                image_url: None,
            })
            .await
            .unwrap();
        let room = repos
            .rooms()
            .create(NewRoom {
                name: "204".into(),
                category: None,
                description: None,
                price: 7000,
                status: RoomStatus::Available,
            })
            .await
            .unwrap();

        let service = BookingService::new(repos, bus, clock, Arc::new(RoomLocks::new()));
        service
            .create_booking(CreateBookingRequest {
                customer_id: customer.id,
                receptionist: None,
                payment_method: PaymentMethod::Transfer,
                is_paid: true,
                is_complementary: false,
                room_bookings: vec![StayRequest {
                    room_id: room.id,
                    start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
                    number_of_nights: 3,
                    amount: None,
                }],
            })
            .await
            .unwrap();

        let (recipient, receipt) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(recipient, "tunde@example.com");
        assert_eq!(receipt.customer_name, "Bello Tunde");
        assert_eq!(receipt.room_name, "204");
        assert_eq!(receipt.amount, 21_000);
        assert_eq!(receipt.number_of_nights, 3);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
