use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{create_active_unique_index, timestamp_col};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Accounts::Table)
                .if_not_exists()
                .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Accounts::FirstName).string_len(50).not_null())
                .col(ColumnDef::new(Accounts::LastName).string_len(50).not_null())
                .col(ColumnDef::new(Accounts::Email).string_len(255).not_null())
                .col(ColumnDef::new(Accounts::PhoneNumber).string_len(20))
                .col(timestamp_col(Accounts::CreatedAt))
                .col(timestamp_col(Accounts::UpdatedAt))
                .col(ColumnDef::new(Accounts::DeletedAt).timestamp_with_time_zone())
                .to_owned(),
        )
        .await?;

    create_active_unique_index(conn, "accounts_email_active_unique", "accounts", "email").await
}

#[derive(DeriveIden)]
pub(super) enum Accounts {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
