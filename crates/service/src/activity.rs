//! Barbershop activity log.

use chrono::NaiveDate;
use models::activity_log::{self, NewActivity};
use models::enums::ActionType;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceResult;

pub const RECENT_LIMIT: u64 = 100;

/// Append an entry; every write path in operations goes through here.
pub async fn log<C: ConnectionTrait>(db: &C, entry: NewActivity) -> ServiceResult<activity_log::Model> {
    debug!(barbershop_id = %entry.barbershop_id, action = %entry.action, "activity");
    Ok(activity_log::record(db, entry).await?)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFilter {
    pub action_type: Option<ActionType>,
    pub start_date: Option<NaiveDate>,
}

/// Newest entries first, capped at [`RECENT_LIMIT`].
pub async fn list_recent(db: &DatabaseConnection, barbershop_id: Uuid, filter: ActivityFilter) -> ServiceResult<Vec<activity_log::Model>> {
    let mut q = activity_log::Entity::find().filter(activity_log::Column::BarbershopId.eq(barbershop_id));
    if let Some(a) = filter.action_type {
        q = q.filter(activity_log::Column::ActionType.eq(a.as_str()));
    }
    if let Some(d) = filter.start_date {
        if let Some(start) = d.and_hms_opt(0, 0, 0) {
            q = q.filter(activity_log::Column::CreatedAt.gte(start.and_utc()));
        }
    }
    Ok(q.order_by_desc(activity_log::Column::CreatedAt).limit(RECENT_LIMIT).all(db).await?)
}
