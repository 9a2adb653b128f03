use utoipa::OpenApi;

use crate::{
    handler,
    handler::{
        access_levels::{AccessLevelResponse, CreateAccessLevel},
        accounts::{
            AccountListResponse, AccountResponse, AssignAccessLevels, CreateAccount, LoginRequest,
            LoginResponse, UpdateAccount,
        },
        error::ErrorResponse,
        health::Health,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::health::ready,
        handler::accounts::create_account,
        handler::accounts::list_accounts,
        handler::accounts::get_account,
        handler::accounts::update_account,
        handler::accounts::delete_account,
        handler::accounts::login,
        handler::accounts::list_account_access_levels,
        handler::accounts::assign_access_levels,
        handler::accounts::remove_access_level,
        handler::access_levels::create_access_level,
        handler::access_levels::list_access_levels,
        handler::access_levels::get_access_level
    ),
    components(schemas(
        Health,
        ErrorResponse,
        CreateAccount,
        UpdateAccount,
        LoginRequest,
        LoginResponse,
        AssignAccessLevels,
        AccountResponse,
        AccountListResponse,
        CreateAccessLevel,
        AccessLevelResponse
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "accounts", description = "Accounts and their access levels"),
        (name = "access-levels", description = "Access level definitions")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/health",
            "/api/v1/health/ready",
            "/api/v1/accounts",
            "/api/v1/accounts/login",
            "/api/v1/accounts/{id}",
            "/api/v1/accounts/{id}/access-levels",
            "/api/v1/accounts/{id}/access-levels/{access_level_id}",
            "/api/v1/access-levels",
            "/api/v1/access-levels/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
