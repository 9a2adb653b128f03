use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{active, not_deleted, DbResultExt, StoreError};
use crate::{
    entities::{access_levels, account_access_levels},
    state::DatabaseClient,
};

#[async_trait]
pub trait AccessLevelsRepo: Send + Sync {
    /// Inserts without a duplicate-name check; callers check first.
    async fn create(
        &self,
        model: access_levels::ActiveModel,
    ) -> Result<access_levels::Model, StoreError>;
    async fn find_by_id(&self, id: i32) -> Result<access_levels::Model, StoreError>;
    async fn find_by_name(&self, name: &str) -> Result<access_levels::Model, StoreError>;
    async fn list(&self) -> Result<Vec<access_levels::Model>, StoreError>;
    /// Grants the access level, reviving a previously removed assignment in place.
    async fn assign_to_account(
        &self,
        account_id: Uuid,
        access_level_id: i32,
    ) -> Result<(), StoreError>;
    async fn remove_from_account(
        &self,
        account_id: Uuid,
        access_level_id: i32,
    ) -> Result<(), StoreError>;
    /// Live access levels currently held by the account, ordered by name.
    async fn list_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<access_levels::Model>, StoreError>;
}

pub struct SeaOrmAccessLevelsRepo {
    db: Arc<dyn DatabaseClient>,
}

impl SeaOrmAccessLevelsRepo {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccessLevelsRepo for SeaOrmAccessLevelsRepo {
    async fn create(
        &self,
        mut model: access_levels::ActiveModel,
    ) -> Result<access_levels::Model, StoreError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        model.created_at = Set(now);
        model.updated_at = Set(now);
        model.deleted_at = Set(None);
        model
            .insert(self.db.conn())
            .await
            .context("create access level")
    }

    async fn find_by_id(&self, id: i32) -> Result<access_levels::Model, StoreError> {
        active::<access_levels::Entity>()
            .filter(access_levels::Column::Id.eq(id))
            .one(self.db.conn())
            .await
            .context("get access level")?
            .ok_or(StoreError::NotFound("access level"))
    }

    async fn find_by_name(&self, name: &str) -> Result<access_levels::Model, StoreError> {
        active::<access_levels::Entity>()
            .filter(access_levels::Column::Name.eq(name))
            .one(self.db.conn())
            .await
            .context("get access level by name")?
            .ok_or(StoreError::NotFound("access level"))
    }

    async fn list(&self) -> Result<Vec<access_levels::Model>, StoreError> {
        active::<access_levels::Entity>()
            .order_by_asc(access_levels::Column::Name)
            .all(self.db.conn())
            .await
            .context("list access levels")
    }

    async fn assign_to_account(
        &self,
        account_id: Uuid,
        access_level_id: i32,
    ) -> Result<(), StoreError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let assignment = account_access_levels::ActiveModel {
            account_id: Set(account_id),
            access_level_id: Set(access_level_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        // Single statement: on an existing pair the conflicting row takes the incoming
        // `deleted_at` (NULL) and `updated_at`, keeping its original `created_at`.
        account_access_levels::Entity::insert(assignment)
            .on_conflict(
                OnConflict::columns([
                    account_access_levels::Column::AccountId,
                    account_access_levels::Column::AccessLevelId,
                ])
                .update_columns([
                    account_access_levels::Column::DeletedAt,
                    account_access_levels::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.conn())
            .await
            .context("assign access level")?;

        Ok(())
    }

    async fn remove_from_account(
        &self,
        account_id: Uuid,
        access_level_id: i32,
    ) -> Result<(), StoreError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = account_access_levels::Entity::update_many()
            .col_expr(account_access_levels::Column::DeletedAt, Expr::value(Some(now)))
            .col_expr(account_access_levels::Column::UpdatedAt, Expr::value(now))
            .filter(account_access_levels::Column::AccountId.eq(account_id))
            .filter(account_access_levels::Column::AccessLevelId.eq(access_level_id))
            .filter(not_deleted::<account_access_levels::Entity>())
            .exec(self.db.conn())
            .await
            .context("remove access level")?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound("access level assignment"));
        }
        Ok(())
    }

    async fn list_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<access_levels::Model>, StoreError> {
        active::<access_levels::Entity>()
            .inner_join(account_access_levels::Entity)
            .filter(account_access_levels::Column::AccountId.eq(account_id))
            .filter(not_deleted::<account_access_levels::Entity>())
            .order_by_asc(access_levels::Column::Name)
            .all(self.db.conn())
            .await
            .context("list account access levels")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::{account_credentials, accounts},
        repo::accounts::{AccountsRepo, SeaOrmAccountsRepo},
        test_support::{self, TestDatabaseClient},
    };
    use sea_orm::PaginatorTrait;
    use std::time::Duration;

    async fn seed_account(db: &Arc<TestDatabaseClient>, email: &str) -> Uuid {
        let repo = SeaOrmAccountsRepo::new(db.clone());
        let (account, _) = repo
            .create(
                accounts::ActiveModel {
                    first_name: Set("Jane".to_string()),
                    last_name: Set("Roe".to_string()),
                    email: Set(email.to_string()),
                    phone_number: Set(None),
                    ..Default::default()
                },
                account_credentials::ActiveModel {
                    password_hash: Set("hash".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("seed account");
        account.id
    }

    async fn seed_level(repo: &SeaOrmAccessLevelsRepo, name: &str) -> access_levels::Model {
        repo.create(access_levels::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            ..Default::default()
        })
        .await
        .expect("seed access level")
    }

    async fn assignment(
        db: &Arc<TestDatabaseClient>,
        account_id: Uuid,
        access_level_id: i32,
    ) -> account_access_levels::Model {
        account_access_levels::Entity::find_by_id((account_id, access_level_id))
            .one(db.conn())
            .await
            .expect("unscoped query")
            .expect("assignment row")
    }

    async fn assignment_rows(db: &Arc<TestDatabaseClient>, account_id: Uuid) -> u64 {
        account_access_levels::Entity::find()
            .filter(account_access_levels::Column::AccountId.eq(account_id))
            .count(db.conn())
            .await
            .expect("count")
    }

    #[tokio::test]
    async fn create_and_look_up_access_levels() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccessLevelsRepo::new(db);
        let admin = repo
            .create(access_levels::ActiveModel {
                name: Set("admin".to_string()),
                description: Set(Some("Full access".to_string())),
                ..Default::default()
            })
            .await
            .expect("create");
        seed_level(&repo, "auditor").await;

        assert!(admin.id > 0);
        assert_eq!(repo.find_by_id(admin.id).await.expect("by id").name, "admin");
        assert_eq!(
            repo.find_by_name("admin").await.expect("by name").description.as_deref(),
            Some("Full access")
        );
        assert!(matches!(
            repo.find_by_id(999).await,
            Err(StoreError::NotFound("access level"))
        ));
        assert!(matches!(
            repo.find_by_name("missing").await,
            Err(StoreError::NotFound("access level"))
        ));

        let names: Vec<String> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|level| level.name)
            .collect();
        assert_eq!(names, vec!["admin", "auditor"]);
    }

    #[tokio::test]
    async fn assigning_twice_leaves_one_active_row() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccessLevelsRepo::new(db.clone());
        let account_id = seed_account(&db, "jane@example.com").await;
        let admin = seed_level(&repo, "admin").await;

        repo.assign_to_account(account_id, admin.id)
            .await
            .expect("first assign");
        repo.assign_to_account(account_id, admin.id)
            .await
            .expect("second assign");

        assert_eq!(assignment_rows(&db, account_id).await, 1);
        assert!(assignment(&db, account_id, admin.id).await.deleted_at.is_none());
        assert_eq!(repo.list_for_account(account_id).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn reassigning_revives_the_removed_row() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccessLevelsRepo::new(db.clone());
        let account_id = seed_account(&db, "jane@example.com").await;
        let admin = seed_level(&repo, "admin").await;

        repo.assign_to_account(account_id, admin.id)
            .await
            .expect("assign");
        let first = assignment(&db, account_id, admin.id).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        repo.remove_from_account(account_id, admin.id)
            .await
            .expect("remove");
        assert!(assignment(&db, account_id, admin.id).await.deleted_at.is_some());
        assert!(repo.list_for_account(account_id).await.expect("list").is_empty());

        tokio::time::sleep(Duration::from_millis(5)).await;
        repo.assign_to_account(account_id, admin.id)
            .await
            .expect("reassign");
        let revived = assignment(&db, account_id, admin.id).await;

        assert_eq!(assignment_rows(&db, account_id).await, 1);
        assert!(revived.deleted_at.is_none());
        assert!(revived.updated_at > first.updated_at);
        assert_eq!(revived.created_at, first.created_at);
    }

    #[tokio::test]
    async fn removing_unknown_or_removed_assignment_is_not_found() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccessLevelsRepo::new(db.clone());
        let account_id = seed_account(&db, "jane@example.com").await;
        let admin = seed_level(&repo, "admin").await;

        assert!(matches!(
            repo.remove_from_account(account_id, admin.id).await,
            Err(StoreError::NotFound("access level assignment"))
        ));

        repo.assign_to_account(account_id, admin.id)
            .await
            .expect("assign");
        repo.remove_from_account(account_id, admin.id)
            .await
            .expect("remove");
        assert!(matches!(
            repo.remove_from_account(account_id, admin.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn account_levels_are_sorted_and_scoped_to_the_account() {
        let db = test_support::sqlite().await;
        let repo = SeaOrmAccessLevelsRepo::new(db.clone());
        let jane = seed_account(&db, "jane@example.com").await;
        let john = seed_account(&db, "john@example.com").await;
        let viewer = seed_level(&repo, "viewer").await;
        let admin = seed_level(&repo, "admin").await;
        let editor = seed_level(&repo, "editor").await;

        for level in [&viewer, &admin] {
            repo.assign_to_account(jane, level.id).await.expect("assign");
        }
        repo.assign_to_account(john, editor.id).await.expect("assign");

        let names: Vec<String> = repo
            .list_for_account(jane)
            .await
            .expect("list")
            .into_iter()
            .map(|level| level.name)
            .collect();
        assert_eq!(names, vec!["admin", "viewer"]);

        assert!(repo
            .list_for_account(Uuid::new_v4())
            .await
            .expect("list")
            .is_empty());
    }
}
