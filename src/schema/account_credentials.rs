use sea_orm_migration::prelude::*;

use super::{accounts::Accounts, timestamp_col};

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(AccountCredentials::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(AccountCredentials::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(AccountCredentials::AccountId).uuid().not_null())
                .col(
                    ColumnDef::new(AccountCredentials::PasswordHash)
                        .string_len(255)
                        .not_null(),
                )
                .col(timestamp_col(AccountCredentials::CreatedAt))
                .col(timestamp_col(AccountCredentials::UpdatedAt))
                .col(ColumnDef::new(AccountCredentials::DeletedAt).timestamp_with_time_zone())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_account_credentials_account")
                        .from(AccountCredentials::Table, AccountCredentials::AccountId)
                        .to(Accounts::Table, Accounts::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name("account_credentials_account_unique")
                .table(AccountCredentials::Table)
                .col(AccountCredentials::AccountId)
                .unique()
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum AccountCredentials {
    Table,
    Id,
    AccountId,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
