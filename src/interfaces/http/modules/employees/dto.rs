//! Employee DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::CreateEmployeeRequest as NewEmployeeCommand;
use crate::domain::employee::EmployeeUpdate;
use crate::domain::Employee;

/// Employee as returned by the API; never carries the password hash
#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeDto {
    pub id: i32,
    pub email: String,
    /// Staff number, e.g. `TO-8KQ2M`
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub emergency_contact: Option<String>,
    pub is_admin: bool,
    pub role: String,
    pub salary: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeDto {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            email: e.email,
            employee_id: e.employee_id,
            first_name: e.first_name,
            last_name: e.last_name,
            phone: e.phone,
            emergency_contact: e.emergency_contact,
            is_admin: e.is_admin,
            role: e.role,
            salary: e.salary,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeeRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    /// Defaults to `password` when omitted
    #[serde(default)]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "salary must not be negative"))]
    pub salary: i64,
}

fn default_role() -> String {
    "Receptionist".to_string()
}

impl From<CreateEmployeeRequest> for NewEmployeeCommand {
    fn from(r: CreateEmployeeRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            emergency_contact: r.emergency_contact,
            is_admin: r.is_admin,
            role: r.role,
            salary: r.salary,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployeeRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_admin: Option<bool>,
    pub role: Option<String>,
    #[validate(range(min = 0, message = "salary must not be negative"))]
    pub salary: Option<i64>,
}

impl From<UpdateEmployeeRequest> for EmployeeUpdate {
    fn from(r: UpdateEmployeeRequest) -> Self {
        Self {
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            emergency_contact: r.emergency_contact,
            is_admin: r.is_admin,
            role: r.role,
            salary: r.salary,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 6, max = 128, message = "password must be 6–128 characters"))]
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeSearchQuery {
    /// Substring of name, role, email or phone
    pub q: Option<String>,
}

/// Inclusive day range
#[derive(Debug, Deserialize, IntoParams)]
pub struct DateRangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}
