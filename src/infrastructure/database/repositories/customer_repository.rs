//! SeaORM implementation of CustomerRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::db_err;
use crate::domain::customer::{Customer, CustomerRepository, CustomerUpdate, NewCustomer};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::{booking, customer};
use crate::shared::PaginatedResult;

pub struct SeaOrmCustomerRepository {
    db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: customer::Model) -> Customer {
    Customer {
        id: m.id,
        first_name: m.first_name,
        last_name: m.last_name,
        phone: m.phone,
        email: m.email,
        plate_number: m.plate_number,
        address: m.address,
        emergency_contact: m.emergency_contact,
        image_url: m.image_url,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn create(&self, c: NewCustomer) -> DomainResult<Customer> {
        debug!("Creating customer: {} {}", c.first_name, c.last_name);

        let now = Utc::now();
        let model = customer::ActiveModel {
            first_name: Set(c.first_name),
            last_name: Set(c.last_name),
            phone: Set(c.phone),
            email: Set(c.email),
            plate_number: Set(c.plate_number),
            address: Set(c.address),
            emergency_contact: Set(c.emergency_contact),
            image_url: Set(c.image_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Customer>> {
        let model = customer::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self, page: u32, limit: u32) -> DomainResult<PaginatedResult<Customer>> {
        let paginator = customer::Entity::find()
            .order_by_desc(customer::Column::Id)
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

    async fn search(&self, term: &str) -> DomainResult<Vec<Customer>> {
        let term = term.trim();
        let models = customer::Entity::find()
            .filter(
                Condition::any()
                    .add(customer::Column::FirstName.contains(term))
                    .add(customer::Column::LastName.contains(term))
                    .add(customer::Column::Email.contains(term))
                    .add(customer::Column::Phone.contains(term))
                    .add(customer::Column::PlateNumber.contains(term)),
            )
            .order_by_asc(customer::Column::LastName)
            .order_by_asc(customer::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, id: i32, changes: CustomerUpdate) -> DomainResult<Option<Customer>> {
        debug!("Updating customer: {}", id);

        let Some(existing) = customer::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: customer::ActiveModel = existing.into();
        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = changes.phone {
            active.phone = Set(v);
        }
        if let Some(v) = changes.email {
            active.email = Set(v);
        }
        if let Some(v) = changes.plate_number {
            active.plate_number = Set(v);
        }
        if let Some(v) = changes.address {
            active.address = Set(Some(v));
        }
        if let Some(v) = changes.emergency_contact {
            active.emergency_contact = Set(Some(v));
        }
        if let Some(v) = changes.image_url {
            active.image_url = Set(Some(v));
        }
        active.updated_at = Set(Utc::now());

        let saved = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(saved)))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        debug!("Deleting customer: {}", id);

        let txn = self.db.begin().await.map_err(db_err)?;

        let detached = booking::Entity::update_many()
            .col_expr(booking::Column::CustomerId, Expr::value(Option::<i32>::None))
            .filter(booking::Column::CustomerId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let deleted = customer::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        debug!(
            "Customer {} deleted ({} bookings detached)",
            id, detached.rows_affected
        );
        Ok(deleted.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::memory_database;

    fn new_customer(first: &str, last: &str, plate: &str) -> NewCustomer {
        NewCustomer {
            first_name: first.into(),
            last_name: last.into(),
            phone: "0801 000 0000".into(),
            email: format!("{}@example.com", first.to_lowercase()),
            plate_number: plate.into(),
            address: None,
            emergency_contact: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn search_matches_names_and_plate() {
        let repo = SeaOrmCustomerRepository::new(memory_database().await);
        repo.create(new_customer("Ada", "Obi", "LAG-123")).await.unwrap();
        repo.create(new_customer("Bola", "Adeyemi", "ABJ-777")).await.unwrap();

        assert_eq!(repo.search("Obi").await.unwrap().len(), 1);
        assert_eq!(repo.search("777").await.unwrap()[0].first_name, "Bola");
        assert_eq!(repo.search("example.com").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn find_all_paginates() {
        let repo = SeaOrmCustomerRepository::new(memory_database().await);
        for i in 0..5 {
            repo.create(new_customer(&format!("C{i}"), "Test", "X")).await.unwrap();
        }

        let page = repo.find_all(2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let repo = SeaOrmCustomerRepository::new(memory_database().await);
        let c = repo.create(new_customer("Ada", "Obi", "LAG-123")).await.unwrap();

        let updated = repo
            .update(
                c.id,
                CustomerUpdate {
                    address: Some("2 Broad St".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.address.as_deref(), Some("2 Broad St"));
        assert_eq!(updated.plate_number, "LAG-123");
    }

    #[tokio::test]
    async fn delete_detaches_bookings() {
        let db = memory_database().await;
        let repo = SeaOrmCustomerRepository::new(db.clone());
        let c = repo.create(new_customer("Ada", "Obi", "LAG-123")).await.unwrap();

        let now = Utc::now();
        let saved = booking::ActiveModel {
            customer_id: Set(Some(c.id)),
            receptionist: Set(None),
            amount: Set(1000),
            is_paid: Set(false),
            payment_method: Set(booking::PaymentMethod::Cash),
            is_complementary: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(repo.delete(c.id).await.unwrap());
        assert!(!repo.delete(c.id).await.unwrap());

        let orphan = booking::Entity::find_by_id(saved.id).one(&db).await.unwrap().unwrap();
        assert_eq!(orphan.customer_id, None);
    }
}
