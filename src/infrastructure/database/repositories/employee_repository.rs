//! SeaORM implementation of EmployeeRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::db_err;
use crate::domain::employee::{Employee, EmployeeRepository, EmployeeUpdate, NewEmployee};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::employee;
use crate::shared::PaginatedResult;

pub struct SeaOrmEmployeeRepository {
    db: DatabaseConnection,
}

impl SeaOrmEmployeeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: employee::Model) -> Employee {
    Employee {
        id: m.id,
        email: m.email,
        password_hash: m.password_hash,
        employee_id: m.employee_id,
        first_name: m.first_name,
        last_name: m.last_name,
        phone: m.phone,
        emergency_contact: m.emergency_contact,
        is_admin: m.is_admin,
        role: m.role,
        salary: m.salary,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl EmployeeRepository for SeaOrmEmployeeRepository {
    async fn create(&self, e: NewEmployee) -> DomainResult<Employee> {
        debug!("Creating employee: {} ({})", e.email, e.employee_id);

        let now = Utc::now();
        let model = employee::ActiveModel {
            email: Set(e.email),
            password_hash: Set(e.password_hash),
            employee_id: Set(e.employee_id),
            first_name: Set(e.first_name),
            last_name: Set(e.last_name),
            phone: Set(e.phone),
            emergency_contact: Set(e.emergency_contact),
            is_admin: Set(e.is_admin),
            role: Set(e.role),
            salary: Set(e.salary),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Employee>> {
        let model = employee::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_login(&self, login: &str) -> DomainResult<Option<Employee>> {
        let model = employee::Entity::find()
            .filter(
                Condition::any()
                    .add(employee::Column::Email.eq(login))
                    .add(employee::Column::EmployeeId.eq(login)),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self, page: u32, limit: u32) -> DomainResult<PaginatedResult<Employee>> {
        let paginator = employee::Entity::find()
            .order_by_asc(employee::Column::Id)
            .paginate(&self.db, u64::from(limit));
        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator
            .fetch_page(u64::from(page.saturating_sub(1)))
            .await
            .map_err(db_err)?;
        Ok(PaginatedResult::new(
            models.into_iter().map(model_to_domain).collect(),
            total,
            page,
            limit,
        ))
    }

    async fn search(&self, term: &str) -> DomainResult<Vec<Employee>> {
        let term = term.trim();
        let models = employee::Entity::find()
            .filter(
                Condition::any()
                    .add(employee::Column::FirstName.contains(term))
                    .add(employee::Column::LastName.contains(term))
                    .add(employee::Column::Role.contains(term))
                    .add(employee::Column::Email.contains(term))
                    .add(employee::Column::Phone.contains(term)),
            )
            .order_by_asc(employee::Column::LastName)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, id: i32, changes: EmployeeUpdate) -> DomainResult<Option<Employee>> {
        debug!("Updating employee: {}", id);

        let Some(existing) = employee::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: employee::ActiveModel = existing.into();
        if let Some(v) = changes.email {
            active.email = Set(v);
        }
        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = changes.phone {
            active.phone = Set(v);
        }
        if let Some(v) = changes.emergency_contact {
            active.emergency_contact = Set(Some(v));
        }
        if let Some(v) = changes.is_admin {
            active.is_admin = Set(v);
        }
        if let Some(v) = changes.role {
            active.role = Set(v);
        }
        if let Some(v) = changes.salary {
            active.salary = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let saved = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(saved)))
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> DomainResult<()> {
        let existing = employee::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Employee", id))?;

        let mut active: employee::ActiveModel = existing.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        debug!("Deleting employee: {}", id);
        let result = employee::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> DomainResult<u64> {
        employee::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
