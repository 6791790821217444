use axum::http::StatusCode;
use axum::Json;
use common::types::{ApiMessage, ApiResponse};
use serde::{Deserialize, Serialize};
use service::pagination::Pagination;

use crate::errors::JsonApiError;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, JsonApiError>;
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), JsonApiError>;

pub fn ok<T: Serialize>(message: &str, data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(message, data)))
}

pub fn created<T: Serialize>(message: &str, data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message, data))))
}

pub fn done(message: &str) -> Result<Json<ApiMessage>, JsonApiError> {
    Ok(Json(ApiMessage::ok(message)))
}

/// `?page=&page_size=` on paginated lists.
#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn pagination(self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }

    pub fn pagination_or(self, default_size: u32) -> Pagination {
        Pagination::new(self.page, Some(self.page_size.unwrap_or(default_size)))
    }
}
