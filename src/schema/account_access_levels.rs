use sea_orm_migration::prelude::*;

use super::{access_levels::AccessLevels, accounts::Accounts, timestamp_col};

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    // The composite primary key is also the conflict target of the assignment upsert, so it
    // must cover soft-deleted rows too.
    manager
        .create_table(
            Table::create()
                .table(AccountAccessLevels::Table)
                .if_not_exists()
                .col(ColumnDef::new(AccountAccessLevels::AccountId).uuid().not_null())
                .col(
                    ColumnDef::new(AccountAccessLevels::AccessLevelId)
                        .integer()
                        .not_null(),
                )
                .col(timestamp_col(AccountAccessLevels::CreatedAt))
                .col(timestamp_col(AccountAccessLevels::UpdatedAt))
                .col(ColumnDef::new(AccountAccessLevels::DeletedAt).timestamp_with_time_zone())
                .primary_key(
                    Index::create()
                        .col(AccountAccessLevels::AccountId)
                        .col(AccountAccessLevels::AccessLevelId),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_account_access_levels_account")
                        .from(AccountAccessLevels::Table, AccountAccessLevels::AccountId)
                        .to(Accounts::Table, Accounts::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_account_access_levels_access_level")
                        .from(AccountAccessLevels::Table, AccountAccessLevels::AccessLevelId)
                        .to(AccessLevels::Table, AccessLevels::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum AccountAccessLevels {
    Table,
    AccountId,
    AccessLevelId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
