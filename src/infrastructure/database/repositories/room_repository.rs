//! SeaORM implementation of RoomRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::db_err;
use crate::domain::room::{NewRoom, Room, RoomRepository, RoomSearch, RoomStatus, RoomUpdate};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::room;

pub struct SeaOrmRoomRepository {
    db: DatabaseConnection,
}

impl SeaOrmRoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(super) fn status_to_domain(s: room::RoomStatus) -> RoomStatus {
    match s {
        room::RoomStatus::Available => RoomStatus::Available,
        room::RoomStatus::Unavailable => RoomStatus::Unavailable,
    }
}

pub(super) fn status_from_domain(s: RoomStatus) -> room::RoomStatus {
    match s {
        RoomStatus::Available => room::RoomStatus::Available,
        RoomStatus::Unavailable => room::RoomStatus::Unavailable,
    }
}

pub(super) fn model_to_domain(m: room::Model) -> Room {
    Room {
        id: m.id,
        name: m.name,
        category: m.category,
        description: m.description,
        price: m.price,
        status: status_to_domain(m.status),
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

// ── RoomRepository impl ─────────────────────────────────────────

#[async_trait]
impl RoomRepository for SeaOrmRoomRepository {
    async fn create(&self, r: NewRoom) -> DomainResult<Room> {
        debug!("Creating room: {}", r.name);

        let now = Utc::now();
        let model = room::ActiveModel {
            name: Set(r.name),
            category: Set(r.category),
            description: Set(r.description),
            price: Set(r.price),
            status: Set(status_from_domain(r.status)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Room>> {
        let model = room::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Room>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = room::Entity::find()
            .filter(room::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(room::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Room>> {
        let models = room::Entity::find()
            .order_by_asc(room::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn search(&self, criteria: RoomSearch) -> DomainResult<Vec<Room>> {
        debug!("Searching rooms: {:?}", criteria);

        let query = match criteria {
            RoomSearch::All => room::Entity::find(),
            RoomSearch::Name(name) => room::Entity::find().filter(room::Column::Name.eq(name)),
            RoomSearch::Category(category) => {
                room::Entity::find().filter(room::Column::Category.eq(category))
            }
            RoomSearch::Status(status) => {
                room::Entity::find().filter(room::Column::Status.eq(status_from_domain(status)))
            }
        };
        let models = query
            .order_by_asc(room::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, id: i32, changes: RoomUpdate) -> DomainResult<Option<Room>> {
        debug!("Updating room: {}", id);

        let Some(existing) = room::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: room::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(category) = changes.category {
            active.category = Set(Some(category));
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(status) = changes.status {
            active.status = Set(status_from_domain(status));
        }
        active.updated_at = Set(Utc::now());

        let saved = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(model_to_domain(saved)))
    }

    async fn categories(&self) -> DomainResult<Vec<String>> {
        let categories: Vec<Option<String>> = room::Entity::find()
            .select_only()
            .column(room::Column::Category)
            .distinct()
            .filter(room::Column::Category.is_not_null())
            .filter(room::Column::Category.ne(""))
            .order_by_asc(room::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(categories.into_iter().flatten().collect())
    }
}
