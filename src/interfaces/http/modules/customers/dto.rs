//! Customer DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::customer::{CustomerUpdate, NewCustomer};
use crate::domain::Customer;

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDto {
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

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            phone: c.phone,
            email: c.email,
            plate_number: c.plate_number,
            address: c.address,
            emergency_contact: c.emergency_contact,
            image_url: c.image_url,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 30, message = "phone is required"))]
    pub phone: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub plate_number: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

impl From<CreateCustomerRequest> for NewCustomer {
    fn from(r: CreateCustomerRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            email: r.email,
            plate_number: r.plate_number,
            address: r.address,
            emergency_contact: r.emergency_contact,
            image_url: r.image_url,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub phone: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub plate_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

impl From<UpdateCustomerRequest> for CustomerUpdate {
    fn from(r: UpdateCustomerRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            email: r.email,
            plate_number: r.plate_number,
            address: r.address,
            emergency_contact: r.emergency_contact,
            image_url: r.image_url,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FindByNameQuery {
    /// Substring of name, email, phone or plate number
    pub name: Option<String>,
}
