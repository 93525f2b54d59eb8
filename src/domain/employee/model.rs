//! Employee (staff account) domain entity

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Prefix of generated staff numbers
pub const EMPLOYEE_ID_PREFIX: &str = "TO-";
const EMPLOYEE_ID_SUFFIX_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct Employee {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    /// Staff number, usable as a login name
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub emergency_contact: Option<String>,
    pub is_admin: bool,
    /// Job title, free text
    pub role: String,
    pub salary: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub email: String,
    pub password_hash: String,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub emergency_contact: Option<String>,
    pub is_admin: bool,
    pub role: String,
    pub salary: i64,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_admin: Option<bool>,
    pub role: Option<String>,
    pub salary: Option<i64>,
}

/// `TO-` followed by five random ASCII alphanumerics
pub fn generate_employee_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(EMPLOYEE_ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{EMPLOYEE_ID_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_and_length() {
        let id = generate_employee_id();
        assert!(id.starts_with("TO-"));
        assert_eq!(id.len(), 8);
        assert!(id[3..].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
