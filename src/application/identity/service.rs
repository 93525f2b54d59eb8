//! Employee management and authentication
//!
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::employee::{generate_employee_id, EmployeeUpdate, NewEmployee};
use crate::domain::{DomainError, DomainResult, Employee, RepositoryProvider};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{
    hash_password_with_cost, verify_password, DEFAULT_HASH_COST,
};
use crate::shared::PaginatedResult;

/// Password given to accounts created without one
const DEFAULT_PASSWORD: &str = "password";
const MIN_PASSWORD_LEN: usize = 6;
/// Fresh staff numbers tried before giving up on a collision streak
const EMPLOYEE_ID_ATTEMPTS: usize = 5;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub employee: Employee,
}

/// The signed-in employee performing an action
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: i32,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct CreateEmployeeRequest {
    pub email: String,
    /// Empty means the default password
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub emergency_contact: Option<String>,
    pub is_admin: bool,
    pub role: String,
    pub salary: i64,
}

/// Administrator account created on first start
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct EmployeeService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    hash_cost: u32,
}

impl EmployeeService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self {
            repos,
            jwt_config,
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    /// Override the bcrypt work factor
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password_with_cost(password, self.hash_cost)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email or staff number + password and return a JWT.
    pub async fn login(&self, login: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(employee) = self.repos.employees().find_by_login(login.trim()).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !verify_password(password, &employee.password_hash) {
            warn!(employee_id = %employee.employee_id, "Failed login attempt");
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let token = create_token(&employee, &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        info!(employee_id = %employee.employee_id, "Employee signed in");
        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            employee,
        })
    }

    // ── Accounts ────────────────────────────────────────────────

    /// Create an account with a freshly generated staff number.
    pub async fn create_employee(&self, req: CreateEmployeeRequest) -> DomainResult<Employee> {
        if !req.email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        let password = if req.password.is_empty() {
            DEFAULT_PASSWORD
        } else {
            req.password.as_str()
        };
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.repos.employees().find_by_login(&req.email).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "email {} is already registered",
                req.email
            )));
        }

        let password_hash = self.hash(password)?;
        let mut last_err = None;
        for _ in 0..EMPLOYEE_ID_ATTEMPTS {
            let candidate = NewEmployee {
                email: req.email.clone(),
                password_hash: password_hash.clone(),
                employee_id: generate_employee_id(),
                first_name: req.first_name.clone(),
                last_name: req.last_name.clone(),
                phone: req.phone.clone(),
                emergency_contact: req.emergency_contact.clone(),
                is_admin: req.is_admin,
                role: req.role.clone(),
                salary: req.salary,
            };
            match self.repos.employees().create(candidate).await {
                Ok(employee) => {
                    info!(
                        id = employee.id,
                        employee_id = %employee.employee_id,
                        is_admin = employee.is_admin,
                        "Employee created"
                    );
                    return Ok(employee);
                }
                // A staff-number collision; the email was checked above.
                Err(DomainError::Conflict(detail)) => {
                    warn!(%detail, "Generated staff number collided, retrying");
                    last_err = Some(DomainError::Conflict(detail));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            DomainError::Conflict("could not allocate a staff number".into())
        }))
    }

    /// Seed an administrator when no employee exists yet.
    pub async fn ensure_default_admin(&self, seed: AdminSeed) -> DomainResult<Option<Employee>> {
        if self.repos.employees().count().await? > 0 {
            return Ok(None);
        }
        let admin = self
            .create_employee(CreateEmployeeRequest {
                email: seed.email,
                password: seed.password,
                first_name: seed.first_name,
                last_name: seed.last_name,
                phone: String::new(),
                emergency_contact: None,
                is_admin: true,
                role: "Administrator".into(),
                salary: 0,
            })
            .await?;
        warn!(
            email = %admin.email,
            employee_id = %admin.employee_id,
            "Default administrator created, change its password"
        );
        Ok(Some(admin))
    }

    pub async fn list_employees(
        &self,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<Employee>> {
        self.repos.employees().find_all(page, limit).await
    }

    pub async fn search_employees(&self, term: &str) -> DomainResult<Vec<Employee>> {
        self.repos.employees().search(term).await
    }

    pub async fn get_employee(&self, id: i32) -> DomainResult<Employee> {
        self.repos
            .employees()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Employee", id))
    }

    pub async fn update_employee(&self, id: i32, changes: EmployeeUpdate) -> DomainResult<Employee> {
        if matches!(&changes.email, Some(email) if !email.contains('@')) {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        self.repos
            .employees()
            .update(id, changes)
            .await?
            .ok_or_else(|| DomainError::not_found("Employee", id))
    }

    pub async fn delete_employee(&self, id: i32) -> DomainResult<()> {
        if !self.repos.employees().delete(id).await? {
            return Err(DomainError::not_found("Employee", id));
        }
        info!(id, "Employee deleted");
        Ok(())
    }

    /// Set a new password. Employees may change their own; admins anyone's.
    pub async fn change_password(
        &self,
        actor: Actor,
        target_id: i32,
        password: &str,
        confirm_password: &str,
    ) -> DomainResult<()> {
        if actor.id != target_id && !actor.is_admin {
            return Err(DomainError::Forbidden(
                "cannot change another employee's password".into(),
            ));
        }
        if password != confirm_password {
            return Err(DomainError::Validation("Passwords do not match".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let new_hash = self.hash(password)?;
        self.repos
            .employees()
            .update_password(target_id, &new_hash)
            .await?;

        info!(target_id, by = actor.id, "Password changed");
        Ok(())
    }
}
