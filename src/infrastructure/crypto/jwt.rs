//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::Employee;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(72),
            issuer: "timeless-hotel".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            ..Default::default()
        }
    }
}

/// JWT claims for a signed-in employee
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (employee primary key)
    pub sub: String,
    /// Staff number
    pub employee_id: String,
    /// Job title
    pub role: String,
    pub is_admin: bool,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TokenClaims {
    pub fn for_employee(employee: &Employee, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: employee.id.to_string(),
            employee_id: employee.employee_id.clone(),
            role: employee.role.clone(),
            is_admin: employee.is_admin,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Employee primary key carried in `sub`
    pub fn employee_pk(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Create a signed JWT for an employee
pub fn create_token(
    employee: &Employee,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::for_employee(employee, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(is_admin: bool) -> Employee {
        Employee {
            id: 7,
            email: "front@hotel.test".into(),
            password_hash: String::new(),
            employee_id: "TO-Ab3dE".into(),
            first_name: "Amaka".into(),
            last_name: "Nwosu".into(),
            phone: "0803".into(),
            emergency_contact: None,
            is_admin,
            role: "Front Desk".into(),
            salary: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_carries_admin_flag() {
        let config = JwtConfig::new("test-secret", 1);
        let token = create_token(&employee(true), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.employee_pk(), Some(7));
        assert_eq!(claims.employee_id, "TO-Ab3dE");
        assert!(claims.is_admin);
        assert!(!claims.is_expired());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token(&employee(false), &JwtConfig::new("one", 1)).unwrap();
        assert!(verify_token(&token, &JwtConfig::new("two", 1)).is_err());
    }
}
