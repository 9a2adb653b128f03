use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::{
    repo::{access_levels::SeaOrmAccessLevelsRepo, accounts::SeaOrmAccountsRepo},
    service::{
        access_levels::{AccessLevelsService, AccessLevelsServiceImpl},
        accounts::{AccountsService, AccountsServiceImpl},
        config::ConfigService,
        password::Passwords,
    },
};

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    pub async fn new(config: &dyn ConfigService) -> Result<Self, DbErr> {
        let conn = crate::db::connect(config.values()).await?;
        crate::schema::apply(&conn).await?;
        Ok(Self { conn })
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

pub struct AppState {
    db: Arc<dyn DatabaseClient>,
    accounts: Arc<dyn AccountsService>,
    access_levels: Arc<dyn AccessLevelsService>,
    config: Arc<dyn ConfigService>,
}

impl AppState {
    pub async fn new(config: Arc<dyn ConfigService>) -> anyhow::Result<Arc<Self>> {
        let db: Arc<dyn DatabaseClient> = Arc::new(SeaOrmDatabaseClient::new(config.as_ref()).await?);
        let values = config.values();
        let passwords = Passwords::new(
            values.password_hash_memory_kib,
            values.password_hash_iterations,
        )
        .map_err(|err| anyhow::anyhow!("invalid password hash parameters: {err}"))?;

        let accounts_repo = Arc::new(SeaOrmAccountsRepo::new(db.clone()));
        let access_levels_repo = Arc::new(SeaOrmAccessLevelsRepo::new(db.clone()));
        let accounts = Arc::new(AccountsServiceImpl::new(
            accounts_repo,
            access_levels_repo.clone(),
            passwords,
        ));
        let access_levels = Arc::new(AccessLevelsServiceImpl::new(access_levels_repo));

        Ok(Arc::new(Self {
            db,
            accounts,
            access_levels,
            config,
        }))
    }

    pub fn db(&self) -> &dyn DatabaseClient {
        self.db.as_ref()
    }

    pub fn accounts(&self) -> &dyn AccountsService {
        self.accounts.as_ref()
    }

    pub fn access_levels(&self) -> &dyn AccessLevelsService {
        self.access_levels.as_ref()
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }
}
