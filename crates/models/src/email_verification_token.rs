use chrono::{Duration, Utc};
use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_verification_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub token: Uuid,
    pub is_used: bool,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        !self.is_used && !self.is_expired()
    }
}

pub async fn issue<C: ConnectionTrait>(db: &C, user_id: Uuid, ttl: Duration) -> Result<Model, ModelError> {
    let now = Utc::now();
    ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token: Set(Uuid::new_v4()),
        is_used: Set(false),
        expires_at: Set((now + ttl).into()),
        created_at: Set(now.into()),
    }
    .insert(db)
    .await
    .map_err(ModelError::db)
}

pub async fn find_by_token<C: ConnectionTrait>(db: &C, token: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find().filter(Column::Token.eq(token)).one(db).await.map_err(ModelError::db)
}

pub async fn mark_used<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ModelError> {
    Entity::update_many()
        .col_expr(Column::IsUsed, Expr::value(true))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await
        .map_err(ModelError::db)?;
    Ok(())
}

/// Invalidate every outstanding token of a user.
pub async fn revoke_all<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::IsUsed, Expr::value(true))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsUsed.eq(false))
        .exec(db)
        .await
        .map_err(ModelError::db)?;
    Ok(res.rows_affected)
}
