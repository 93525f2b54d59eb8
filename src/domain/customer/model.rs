//! Customer domain entity

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub plate_number: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// "Last First", as printed on receipts
    pub fn receipt_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub plate_number: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub plate_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub image_url: Option<String>,
}
