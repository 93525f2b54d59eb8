//! Printable booking receipt

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::domain::{Booking, Customer, PaymentMethod, Room, RoomBooking};

#[derive(Debug, Clone)]
pub struct Receipt {
    /// "Last First"
    pub customer_name: String,
    pub customer_email: String,
    /// `{unix seconds}-{8 hex chars}`
    pub receipt_number: String,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    /// Booking total in minor units
    pub amount: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub number_of_nights: u32,
    pub room_name: String,
}

impl Receipt {
    /// Receipt for `booking`, describing the given stay and room.
    pub fn build(
        booking: &Booking,
        customer: &Customer,
        stay: &RoomBooking,
        room: &Room,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_name: customer.receipt_name(),
            customer_email: customer.email.clone(),
            receipt_number: receipt_number(issued_at),
            transaction_date: issued_at,
            payment_method: booking.payment_method,
            amount: booking.amount,
            start_date: stay.start_date,
            end_date: stay.end_date,
            number_of_nights: stay.number_of_nights,
            room_name: room.name.clone(),
        }
    }
}

fn receipt_number(at: DateTime<Utc>) -> String {
    let mut suffix = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut suffix);
    format!("{}-{}", at.timestamp(), hex::encode(suffix))
}

/// Minor units rendered as `major.minor`
fn money(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Receipt No: {}", self.receipt_number)?;
        writeln!(f, "Date:       {}", self.transaction_date.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "Guest:      {}", self.customer_name)?;
        writeln!(f, "Room:       {}", self.room_name)?;
        writeln!(f, "Check-in:   {}", self.start_date.format("%Y-%m-%d"))?;
        writeln!(f, "Check-out:  {}", self.end_date.format("%Y-%m-%d"))?;
        writeln!(f, "Nights:     {}", self.number_of_nights)?;
        writeln!(f, "Payment:    {}", self.payment_method)?;
        write!(f, "Total:      {}", money(self.amount))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{RoomStatus, StayStatus};
    use chrono::TimeZone;

    pub(crate) fn sample() -> (Booking, Customer, RoomBooking, Room) {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let stay = RoomBooking {
            id: 4,
            booking_id: 1,
            room_id: 2,
            number_of_nights: 2,
            start_date: at,
            end_date: Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap(),
            amount: 10_050,
            status: StayStatus::Reserved,
            created_at: at,
            updated_at: at,
        };
        let booking = Booking {
            id: 1,
            customer_id: Some(3),
            receptionist: None,
            amount: 10_050,
            is_paid: true,
            payment_method: PaymentMethod::Card,
            is_complementary: false,
            created_at: at,
            updated_at: at,
            deleted_at: None,
            room_bookings: vec![stay.clone()],
        };
        let customer = Customer {
            id: 3,
            first_name: "Amaka".into(),
            last_name: "Eze".into(),
            phone: "0803".into(),
            email: "amaka@example.com".into(),
            plate_number: "LAG-123".into(),
            address: None,
            emergency_contact: None,
            image_url: None,
            created_at: at,
            updated_at: at,
        };
        let room = Room {
            id: 2,
            name: "101".into(),
            category: Some("single".into()),
            description: None,
            price: 5025,
            status: RoomStatus::Available,
            created_at: at,
            updated_at: at,
        };
        (booking, customer, stay, room)
    }

    #[test]
    fn number_is_timestamp_and_hex_suffix() {
        let (booking, customer, stay, room) = sample();
        let receipt = Receipt::build(&booking, &customer, &stay, &room, booking.created_at);
        let (ts, suffix) = receipt.receipt_number.split_once('-').unwrap();
        assert_eq!(ts, booking.created_at.timestamp().to_string());
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn display_shows_guest_room_and_total() {
        let (booking, customer, stay, room) = sample();
        let text = Receipt::build(&booking, &customer, &stay, &room, booking.created_at).to_string();
        assert!(text.contains("Guest:      Eze Amaka"));
        assert!(text.contains("Room:       101"));
        assert!(text.contains("Check-out:  2024-06-03"));
        assert!(text.ends_with("Total:      100.50"));
    }

    #[test]
    fn money_formats_minor_units() {
        assert_eq!(money(0), "0.00");
        assert_eq!(money(5), "0.05");
        assert_eq!(money(-1234), "-12.34");
    }
}
