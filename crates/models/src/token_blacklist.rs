use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Revoked refresh token ids; rows past `expires_at` can be purged.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_blacklist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub jti: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn contains<C: ConnectionTrait>(db: &C, jti: Uuid) -> Result<bool, ModelError> {
    Ok(Entity::find_by_id(jti).one(db).await.map_err(ModelError::db)?.is_some())
}

pub async fn insert<C: ConnectionTrait>(db: &C, jti: Uuid, user_id: Uuid, expires_at: DateTimeWithTimeZone) -> Result<(), ModelError> {
    if contains(db, jti).await? {
        return Ok(());
    }
    ActiveModel {
        jti: Set(jti),
        user_id: Set(user_id),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(ModelError::db)?;
    Ok(())
}

pub async fn purge_expired<C: ConnectionTrait>(db: &C) -> Result<u64, ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::delete_many()
        .filter(Column::ExpiresAt.lt(now))
        .exec(db)
        .await
        .map_err(ModelError::db)?;
    Ok(res.rows_affected)
}
