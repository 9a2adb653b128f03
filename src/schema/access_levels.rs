use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{create_active_unique_index, timestamp_col};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(AccessLevels::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(AccessLevels::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(AccessLevels::Name).string_len(50).not_null())
                .col(ColumnDef::new(AccessLevels::Description).text())
                .col(timestamp_col(AccessLevels::CreatedAt))
                .col(timestamp_col(AccessLevels::UpdatedAt))
                .col(ColumnDef::new(AccessLevels::DeletedAt).timestamp_with_time_zone())
                .to_owned(),
        )
        .await?;

    create_active_unique_index(conn, "access_levels_name_active_unique", "access_levels", "name")
        .await
}

#[derive(DeriveIden)]
pub(super) enum AccessLevels {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
