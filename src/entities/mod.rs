pub mod access_levels;
pub mod account_access_levels;
pub mod account_credentials;
pub mod accounts;

use sea_orm::EntityTrait;

/// Entities whose rows are retired by stamping `deleted_at` instead of being removed.
pub trait SoftDelete: EntityTrait {
    fn deleted_at() -> Self::Column;
}
