use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionError,
    TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{active, not_deleted, DbResultExt, StoreError};
use crate::{
    entities::{account_credentials, accounts},
    state::DatabaseClient,
};

#[async_trait]
pub trait AccountsRepo: Send + Sync {
    /// Inserts the account and its credential in one transaction. Identifiers and
    /// timestamps are assigned here; the persisted rows are returned.
    async fn create(
        &self,
        account: accounts::ActiveModel,
        credential: account_credentials::ActiveModel,
    ) -> Result<(accounts::Model, account_credentials::Model), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<accounts::Model, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<accounts::Model, StoreError>;
    async fn update(&self, account: accounts::Model) -> Result<accounts::Model, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    /// One page ordered newest first, plus the number of live accounts overall.
    async fn list(&self, limit: u64, offset: u64)
        -> Result<(Vec<accounts::Model>, u64), StoreError>;
    async fn find_credential(
        &self,
        account_id: Uuid,
    ) -> Result<account_credentials::Model, StoreError>;
}

pub struct SeaOrmAccountsRepo {
    db: Arc<dyn DatabaseClient>,
}

impl SeaOrmAccountsRepo {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountsRepo for SeaOrmAccountsRepo {
    async fn create(
        &self,
        mut account: accounts::ActiveModel,
        mut credential: account_credentials::ActiveModel,
    ) -> Result<(accounts::Model, account_credentials::Model), StoreError> {
        let now = Utc::now();
        account.id = Set(Uuid::new_v4());
        account.created_at = Set(now.into());
        account.updated_at = Set(now.into());
        account.deleted_at = Set(None);

        credential.id = Set(Uuid::new_v4());
        credential.created_at = Set(now.into());
        credential.updated_at = Set(now.into());
        credential.deleted_at = Set(None);

        self.db
            .conn()
            .transaction::<_, _, DbErr>(|txn| {
                Box::pin(async move {
                    let account = account.insert(txn).await?;
                    credential.account_id = Set(account.id);
                    let credential = credential.insert(txn).await?;
                    Ok((account, credential))
                })
            })
            .await
            .map_err(|err| match err {
                TransactionError::Connection(err) | TransactionError::Transaction(err) => err,
            })
            .context("create account")
    }

    async fn find_by_id(&self, id: Uuid) -> Result<accounts::Model, StoreError> {
        active::<accounts::Entity>()
            .filter(accounts::Column::Id.eq(id))
            .one(self.db.conn())
            .await
            .context("get account")?
            .ok_or(StoreError::NotFound("account"))
    }

    async fn find_by_email(&self, email: &str) -> Result<accounts::Model, StoreError> {
        active::<accounts::Entity>()
            .filter(accounts::Column::Email.eq(email))
            .one(self.db.conn())
            .await
            .context("get account by email")?
            .ok_or(StoreError::NotFound("account"))
    }

    async fn update(&self, account: accounts::Model) -> Result<accounts::Model, StoreError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::FirstName, Expr::value(account.first_name.clone()))
            .col_expr(accounts::Column::LastName, Expr::value(account.last_name.clone()))
            .col_expr(accounts::Column::Email, Expr::value(account.email.clone()))
            .col_expr(
                accounts::Column::PhoneNumber,
                Expr::value(account.phone_number.clone()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(account.id))
            .filter(not_deleted::<accounts::Entity>())
            .exec(self.db.conn())
            .await
            .context("update account")?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound("account"));
        }

        Ok(accounts::Model {
            updated_at: now,
            ..account
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::DeletedAt, Expr::value(Some(now)))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(id))
            .filter(not_deleted::<accounts::Entity>())
            .exec(self.db.conn())
            .await
            .context("delete account")?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound("account"));
        }
        Ok(())
    }

    async fn list(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<accounts::Model>, u64), StoreError> {
        let total = active::<accounts::Entity>()
            .count(self.db.conn())
            .await
            .context("count accounts")?;

        let page = active::<accounts::Entity>()
            .order_by_desc(accounts::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.conn())
            .await
            .context("list accounts")?;

        Ok((page, total))
    }

    async fn find_credential(
        &self,
        account_id: Uuid,
    ) -> Result<account_credentials::Model, StoreError> {
        active::<account_credentials::Entity>()
            .filter(account_credentials::Column::AccountId.eq(account_id))
            .one(self.db.conn())
            .await
            .context("get credential")?
            .ok_or(StoreError::NotFound("credential"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use sea_orm::{ConnectionTrait, Statement};

    fn new_account(email: &str) -> accounts::ActiveModel {
        accounts::ActiveModel {
            first_name: Set("John".to_string()),
            last_name: Set("Doe".to_string()),
            email: Set(email.to_string()),
            phone_number: Set(None),
            ..Default::default()
        }
    }

    fn new_credential() -> account_credentials::ActiveModel {
        account_credentials::ActiveModel {
            password_hash: Set("$argon2id$placeholder".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_links_credential() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db.clone());

        let (account, credential) = repo
            .create(new_account("john@example.com"), new_credential())
            .await
            .expect("create");

        assert_ne!(account.id, Uuid::nil());
        assert_eq!(credential.account_id, account.id);
        assert!(account.deleted_at.is_none());

        let found = repo.find_credential(account.id).await.expect("credential");
        assert_eq!(found.id, credential.id);
        assert_eq!(found.password_hash, "$argon2id$placeholder");
    }

    #[tokio::test]
    async fn create_rolls_back_when_credential_insert_fails() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db.clone());
        db.conn()
            .execute(Statement::from_string(
                db.conn().get_database_backend(),
                "DROP TABLE account_credentials".to_string(),
            ))
            .await
            .expect("drop credentials table");

        let err = repo
            .create(new_account("john@example.com"), new_credential())
            .await
            .expect_err("credential insert must fail");
        assert!(matches!(err, StoreError::Persistence { .. }));

        let rows = accounts::Entity::find()
            .count(db.conn())
            .await
            .expect("count");
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn lookups_miss_with_not_found() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db);

        assert!(matches!(
            repo.find_by_id(Uuid::new_v4()).await,
            Err(StoreError::NotFound("account"))
        ));
        assert!(matches!(
            repo.find_by_email("nobody@example.com").await,
            Err(StoreError::NotFound("account"))
        ));
        assert!(matches!(
            repo.find_credential(Uuid::new_v4()).await,
            Err(StoreError::NotFound("credential"))
        ));
    }

    #[tokio::test]
    async fn delete_hides_row_but_keeps_it() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db.clone());
        let (account, _) = repo
            .create(new_account("john@example.com"), new_credential())
            .await
            .expect("create");

        repo.delete(account.id).await.expect("delete");

        assert!(matches!(
            repo.find_by_id(account.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.find_by_email("john@example.com").await,
            Err(StoreError::NotFound(_))
        ));

        let raw = accounts::Entity::find_by_id(account.id)
            .one(db.conn())
            .await
            .expect("unscoped query")
            .expect("row still present");
        assert!(raw.deleted_at.is_some());

        assert!(matches!(
            repo.delete(account.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn email_can_be_reused_after_soft_delete() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db);
        let (first, _) = repo
            .create(new_account("reuse@example.com"), new_credential())
            .await
            .expect("create first");
        repo.delete(first.id).await.expect("delete");

        let (second, _) = repo
            .create(new_account("reuse@example.com"), new_credential())
            .await
            .expect("create second");

        assert_ne!(first.id, second.id);
        let found = repo.find_by_email("reuse@example.com").await.expect("lookup");
        assert_eq!(found.id, second.id);
    }

    #[tokio::test]
    async fn duplicate_live_email_is_rejected_by_the_database() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db);
        repo.create(new_account("dup@example.com"), new_credential())
            .await
            .expect("create");

        let err = repo
            .create(new_account("dup@example.com"), new_credential())
            .await
            .expect_err("unique index");
        assert!(matches!(err, StoreError::Persistence { .. }));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_bumps_updated_at() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db);
        let (account, _) = repo
            .create(new_account("john@example.com"), new_credential())
            .await
            .expect("create");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = repo
            .update(accounts::Model {
                first_name: "Johnny".to_string(),
                phone_number: Some("555-0100".to_string()),
                ..account.clone()
            })
            .await
            .expect("update");
        assert!(updated.updated_at > account.updated_at);

        let stored = repo.find_by_id(account.id).await.expect("lookup");
        assert_eq!(stored.first_name, "Johnny");
        assert_eq!(stored.phone_number.as_deref(), Some("555-0100"));
        assert_eq!(stored.email, "john@example.com");
    }

    #[tokio::test]
    async fn update_of_deleted_account_is_not_found() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db);
        let (account, _) = repo
            .create(new_account("john@example.com"), new_credential())
            .await
            .expect("create");
        repo.delete(account.id).await.expect("delete");

        assert!(matches!(
            repo.update(account).await,
            Err(StoreError::NotFound("account"))
        ));
    }

    #[tokio::test]
    async fn list_counts_all_live_rows_independent_of_page() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccountsRepo::new(db);
        let mut ids = Vec::new();
        for n in 0..6 {
            let (account, _) = repo
                .create(new_account(&format!("user{n}@example.com")), new_credential())
                .await
                .expect("create");
            ids.push(account.id);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        repo.delete(ids[0]).await.expect("delete");

        let (page, total) = repo.list(3, 3).await.expect("list");
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);

        let (first_page, _) = repo.list(3, 0).await.expect("list");
        assert_eq!(first_page[0].email, "user5@example.com");
    }
}
