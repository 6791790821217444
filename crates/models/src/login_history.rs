use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::LoginStatus;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "login_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: String,
    pub failure_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub user_id: Option<Uuid>,
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: LoginStatus,
    pub failure_reason: Option<String>,
}

pub async fn record<C: ConnectionTrait>(db: &C, attempt: NewLoginAttempt) -> Result<Model, ModelError> {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(attempt.user_id),
        email: Set(attempt.email),
        ip_address: Set(attempt.ip_address),
        user_agent: Set(attempt.user_agent),
        status: Set(attempt.status.as_str().to_string()),
        failure_reason: Set(attempt.failure_reason),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(ModelError::db)
}
