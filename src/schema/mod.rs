use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::prelude::*;

mod access_levels;
mod account_access_levels;
mod account_credentials;
mod accounts;

/// Creates the tables and indexes if they are missing. Safe to run on every start.
pub async fn apply(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);

    accounts::apply(&manager, conn).await?;
    account_credentials::apply(&manager).await?;
    access_levels::apply(&manager, conn).await?;
    account_access_levels::apply(&manager).await?;

    Ok(())
}

/// Uniqueness that only holds among live rows. Supported by both Postgres and SQLite.
async fn create_active_unique_index(
    conn: &DatabaseConnection,
    name: &str,
    table: &str,
    column: &str,
) -> Result<(), DbErr> {
    conn.execute(Statement::from_string(
        conn.get_database_backend(),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {name} ON {table} ({column}) \
             WHERE deleted_at IS NULL"
        ),
    ))
    .await?;
    Ok(())
}

fn timestamp_col<T: IntoIden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}
