use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::pagination::Pagination;
use service::user_service;

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::routes::auth::ServerState;

/// User as exposed over the API; the password hash never leaves the
/// credentials table.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserDetail {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<models::user::Model> for UserDetail {
    fn from(u: models::user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListUsersQuery {
    fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) }
    }
}

#[utoipa::path(get, path = "/api/users", tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users, newest first"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = [])))]
pub async fn list_users(
    State(state): State<ServerState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Envelope<Vec<UserDetail>>>, ApiError> {
    let users = user_service::list_users(&state.db, query.pagination()).await?;
    let out = users.into_iter().map(UserDetail::from).collect();
    Ok(Json(Envelope::list(out)))
}

#[utoipa::path(get, path = "/api/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_token" = [])))]
pub async fn get_user(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<UserDetail>>, ApiError> {
    let user = user_service::get_user(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(Envelope::data(user.into())))
}
