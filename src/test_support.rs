use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

use crate::{schema, service::password::Passwords, state::DatabaseClient};

pub struct TestDatabaseClient {
    conn: DatabaseConnection,
}

impl DatabaseClient for TestDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Fresh in-memory SQLite database with the schema applied. A single pooled connection
/// keeps every query on the same in-memory database.
pub async fn sqlite() -> Arc<TestDatabaseClient> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options).await.expect("sqlite connect");
    schema::apply(&conn).await.expect("schema apply");
    Arc::new(TestDatabaseClient { conn })
}

pub fn cheap_passwords() -> Passwords {
    Passwords::new(64, 1).expect("argon2 params")
}
