use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub mod access_levels;
pub mod accounts;
pub mod error;
pub mod health;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::routes(state.clone()))
        .merge(accounts::routes(state.clone()))
        .merge(access_levels::routes(state))
}
