use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    handler::{access_levels::AccessLevelResponse, error::ErrorResponse},
    service::{
        accounts::{AccountPage, AccountView, CreateAccountInput, LoginInput, UpdateAccountInput},
        ServiceError,
    },
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAccount {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignAccessLevels {
    pub access_level_ids: Vec<i32>,
}

#[derive(Deserialize, IntoParams)]
pub struct ListQuery {
    /// 1-based page number. Defaults to 1.
    pub page: Option<i64>,
    /// Between 1 and 100. Defaults to 10.
    pub page_size: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub access_levels: Vec<AccessLevelResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountView> for AccountResponse {
    fn from(view: AccountView) -> Self {
        Self {
            id: view.id,
            first_name: view.first_name,
            last_name: view.last_name,
            email: view.email,
            phone_number: view.phone_number,
            access_levels: view.access_levels.into_iter().map(Into::into).collect(),
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl From<AccountPage> for AccountListResponse {
    fn from(page: AccountPage) -> Self {
        Self {
            accounts: page.accounts.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub account: AccountResponse,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccount,
    responses(
        (status = 201, description = "Created", body = AccountResponse),
        (status = 400, description = "Invalid payload or email already in use", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAccount>,
) -> Result<(StatusCode, Json<AccountResponse>), ServiceError> {
    let input = CreateAccountInput {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone_number: payload.phone_number,
        password: payload.password,
    };

    let created = state.accounts().create(input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    params(ListQuery),
    responses(
        (status = 200, description = "Accounts, newest first", body = AccountListResponse)
    ),
    tag = "accounts"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AccountListResponse>, ServiceError> {
    let page = state
        .accounts()
        .list(query.page.unwrap_or(1), query.page_size.unwrap_or(0))
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, ServiceError> {
    Ok(Json(state.accounts().get(id).await?.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/accounts/{id}",
    request_body = UpdateAccount,
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Updated", body = AccountResponse),
        (status = 400, description = "Invalid payload or email already in use", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccount>,
) -> Result<Json<AccountResponse>, ServiceError> {
    let input = UpdateAccountInput {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone_number: payload.phone_number,
    };

    Ok(Json(state.accounts().update(id, input).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.accounts().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let output = state
        .accounts()
        .authenticate(LoginInput {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        account: output.account.into(),
        message: output.message.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/access-levels",
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Active access levels ordered by name", body = [AccessLevelResponse])
    ),
    tag = "accounts"
)]
pub async fn list_account_access_levels(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AccessLevelResponse>>, ServiceError> {
    let levels = state.accounts().access_levels(id).await?;
    Ok(Json(levels.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/access-levels",
    request_body = AssignAccessLevels,
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Access levels now held by the account", body = [AccessLevelResponse]),
        (status = 400, description = "Empty id list", body = ErrorResponse),
        (status = 404, description = "Account or access level not found", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn assign_access_levels(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignAccessLevels>,
) -> Result<Json<Vec<AccessLevelResponse>>, ServiceError> {
    if payload.access_level_ids.is_empty() {
        return Err(ServiceError::Validation(
            "access_level_ids must not be empty".to_string(),
        ));
    }

    state
        .accounts()
        .assign_access_levels(id, &payload.access_level_ids)
        .await?;
    let levels = state.accounts().access_levels(id).await?;
    Ok(Json(levels.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}/access-levels/{access_level_id}",
    params(
        ("id" = Uuid, Path, description = "Account id"),
        ("access_level_id" = i32, Path, description = "Access level id")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn remove_access_level(
    State(state): State<Arc<AppState>>,
    Path((id, access_level_id)): Path<(Uuid, i32)>,
) -> Result<StatusCode, ServiceError> {
    state
        .accounts()
        .remove_access_level(id, access_level_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/accounts", get(list_accounts).post(create_account))
        .route("/api/v1/accounts/login", post(login))
        .route(
            "/api/v1/accounts/:id",
            get(get_account).patch(update_account).delete(delete_account),
        )
        .route(
            "/api/v1/accounts/:id/access-levels",
            get(list_account_access_levels).post(assign_access_levels),
        )
        .route(
            "/api/v1/accounts/:id/access-levels/:access_level_id",
            delete(remove_access_level),
        )
        .with_state(state)
}
