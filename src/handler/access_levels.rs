use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    handler::error::ErrorResponse,
    service::{
        access_levels::{AccessLevelView, CreateAccessLevelInput},
        ServiceError,
    },
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateAccessLevel {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AccessLevelResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<AccessLevelView> for AccessLevelResponse {
    fn from(view: AccessLevelView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            description: view.description,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/access-levels",
    request_body = CreateAccessLevel,
    responses(
        (status = 201, description = "Created", body = AccessLevelResponse),
        (status = 400, description = "Invalid payload or duplicate name", body = ErrorResponse)
    ),
    tag = "access-levels"
)]
pub async fn create_access_level(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAccessLevel>,
) -> Result<(StatusCode, Json<AccessLevelResponse>), ServiceError> {
    let created = state
        .access_levels()
        .create(CreateAccessLevelInput {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/access-levels",
    responses(
        (status = 200, description = "Access levels ordered by name", body = [AccessLevelResponse])
    ),
    tag = "access-levels"
)]
pub async fn list_access_levels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccessLevelResponse>>, ServiceError> {
    let levels = state.access_levels().list().await?;
    Ok(Json(levels.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/access-levels/{id}",
    params(
        ("id" = i32, Path, description = "Access level id")
    ),
    responses(
        (status = 200, description = "Access level", body = AccessLevelResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "access-levels"
)]
pub async fn get_access_level(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<AccessLevelResponse>, ServiceError> {
    Ok(Json(state.access_levels().get(id).await?.into()))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/v1/access-levels",
            get(list_access_levels).post(create_access_level),
        )
        .route("/api/v1/access-levels/:id", get(get_access_level))
        .with_state(state)
}
