use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::Set;
use std::sync::Arc;
use uuid::Uuid;

use super::{access_levels::AccessLevelView, password::Passwords, required, ServiceError};
use crate::{
    entities::{account_credentials, accounts},
    repo::{access_levels::AccessLevelsRepo, accounts::AccountsRepo, StoreError},
};

const NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 255;
const PHONE_MAX: usize = 20;
const PASSWORD_MIN: usize = 8;
const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
const MAX_OFFSET: u64 = i64::MAX as u64;

pub struct CreateAccountInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password: String,
}

/// Blank or missing fields leave the stored value untouched.
#[derive(Default)]
pub struct UpdateAccountInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct AccountView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub access_levels: Vec<AccessLevelView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub account: AccountView,
    pub message: &'static str,
}

#[derive(Debug)]
pub struct AccountPage {
    pub accounts: Vec<AccountView>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[async_trait]
pub trait AccountsService: Send + Sync {
    async fn create(&self, input: CreateAccountInput) -> Result<AccountView, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<AccountView, ServiceError>;
    async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<AccountView, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
    /// `page` below 1 becomes 1; `page_size` outside 1..=100 becomes 10.
    async fn list(&self, page: i64, page_size: i64) -> Result<AccountPage, ServiceError>;
    async fn authenticate(&self, input: LoginInput) -> Result<LoginOutput, ServiceError>;
    /// Assigns in order and stops at the first failure. Earlier assignments stay committed.
    async fn assign_access_levels(
        &self,
        account_id: Uuid,
        access_level_ids: &[i32],
    ) -> Result<(), ServiceError>;
    async fn remove_access_level(
        &self,
        account_id: Uuid,
        access_level_id: i32,
    ) -> Result<(), ServiceError>;
    async fn access_levels(&self, account_id: Uuid)
        -> Result<Vec<AccessLevelView>, ServiceError>;
}

pub struct AccountsServiceImpl {
    accounts_repo: Arc<dyn AccountsRepo>,
    access_levels_repo: Arc<dyn AccessLevelsRepo>,
    passwords: Passwords,
}

impl AccountsServiceImpl {
    pub fn new(
        accounts_repo: Arc<dyn AccountsRepo>,
        access_levels_repo: Arc<dyn AccessLevelsRepo>,
        passwords: Passwords,
    ) -> Self {
        Self {
            accounts_repo,
            access_levels_repo,
            passwords,
        }
    }

    fn validate_email(email: &str) -> Result<String, ServiceError> {
        let email = required("email", email, EMAIL_MAX)?;
        if !email.contains('@') {
            return Err(ServiceError::Validation("invalid email format".to_string()));
        }
        Ok(email)
    }

    fn validate_phone(phone: &str) -> Result<String, ServiceError> {
        let phone = phone.trim();
        if phone.chars().count() > PHONE_MAX {
            return Err(ServiceError::Validation(format!(
                "phone number must be at most {PHONE_MAX} characters"
            )));
        }
        Ok(phone.to_string())
    }

    /// Some(value) only when the caller supplied a non-blank value.
    fn provided(value: Option<String>) -> Option<String> {
        value.filter(|value| !value.trim().is_empty())
    }

    /// Fails with Conflict when a live account other than `owner` holds `email`.
    async fn ensure_email_available(
        &self,
        email: &str,
        owner: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        match self.accounts_repo.find_by_email(email).await {
            Ok(existing) if Some(existing.id) != owner => {
                tracing::warn!(email, "email already in use");
                Err(ServiceError::Conflict(format!(
                    "account with email {email} already exists"
                )))
            }
            Ok(_) | Err(StoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn view(&self, account: accounts::Model) -> Result<AccountView, ServiceError> {
        let access_levels = self.access_levels(account.id).await?;
        Ok(AccountView {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone_number: account.phone_number,
            access_levels,
            created_at: account.created_at.with_timezone(&Utc),
            updated_at: account.updated_at.with_timezone(&Utc),
        })
    }

    fn normalize_page(page: i64, page_size: i64) -> (u64, u64) {
        let page = if page < 1 { 1 } else { page as u64 };
        let page_size = match u64::try_from(page_size) {
            Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => size,
            _ => DEFAULT_PAGE_SIZE,
        };
        (page, page_size)
    }
}

#[async_trait]
impl AccountsService for AccountsServiceImpl {
    async fn create(&self, input: CreateAccountInput) -> Result<AccountView, ServiceError> {
        let first_name = required("first name", &input.first_name, NAME_MAX)?;
        let last_name = required("last name", &input.last_name, NAME_MAX)?;
        let email = Self::validate_email(&input.email)?;
        let phone_number = match Self::provided(input.phone_number) {
            Some(phone) => Some(Self::validate_phone(&phone)?),
            None => None,
        };
        if input.password.chars().count() < PASSWORD_MIN {
            return Err(ServiceError::Validation(format!(
                "password must be at least {PASSWORD_MIN} characters"
            )));
        }

        self.ensure_email_available(&email, None).await?;
        let password_hash = self.passwords.hash(&input.password)?;

        let account = accounts::ActiveModel {
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            phone_number: Set(phone_number),
            ..Default::default()
        };
        let credential = account_credentials::ActiveModel {
            password_hash: Set(password_hash),
            ..Default::default()
        };

        let (account, _) = self.accounts_repo.create(account, credential).await?;
        tracing::info!(account_id = %account.id, "account created");
        self.view(account).await
    }

    async fn get(&self, id: Uuid) -> Result<AccountView, ServiceError> {
        let account = self.accounts_repo.find_by_id(id).await?;
        self.view(account).await
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<AccountView, ServiceError> {
        let mut account = self.accounts_repo.find_by_id(id).await?;

        if let Some(first_name) = Self::provided(input.first_name) {
            account.first_name = required("first name", &first_name, NAME_MAX)?;
        }
        if let Some(last_name) = Self::provided(input.last_name) {
            account.last_name = required("last name", &last_name, NAME_MAX)?;
        }
        if let Some(email) = Self::provided(input.email) {
            let email = Self::validate_email(&email)?;
            self.ensure_email_available(&email, Some(id)).await?;
            account.email = email;
        }
        if let Some(phone) = Self::provided(input.phone_number) {
            account.phone_number = Some(Self::validate_phone(&phone)?);
        }

        let account = self.accounts_repo.update(account).await?;
        tracing::info!(account_id = %id, "account updated");
        self.view(account).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.accounts_repo.delete(id).await?;
        tracing::info!(account_id = %id, "account deleted");
        Ok(())
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<AccountPage, ServiceError> {
        let (page, page_size) = Self::normalize_page(page, page_size);
        // Offsets past what the database can bind yield an empty page; the total is still real.
        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| *offset <= MAX_OFFSET)
            .unwrap_or(MAX_OFFSET);
        let (models, total) = self.accounts_repo.list(page_size, offset).await?;

        let mut accounts = Vec::with_capacity(models.len());
        for model in models {
            accounts.push(self.view(model).await?);
        }

        Ok(AccountPage {
            accounts,
            total,
            page,
            page_size,
        })
    }

    async fn authenticate(&self, input: LoginInput) -> Result<LoginOutput, ServiceError> {
        let email = input.email.trim();
        let account = match self.accounts_repo.find_by_email(email).await {
            Ok(account) => account,
            Err(StoreError::NotFound(_)) => {
                self.passwords.reject(&input.password);
                tracing::warn!("login for unknown email");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        };

        let credential = match self.accounts_repo.find_credential(account.id).await {
            Ok(credential) => credential,
            Err(StoreError::NotFound(_)) => {
                self.passwords.reject(&input.password);
                tracing::warn!(account_id = %account.id, "login for account without credential");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        };

        if !self
            .passwords
            .verify(&credential.password_hash, &input.password)
        {
            tracing::warn!(account_id = %account.id, "login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(LoginOutput {
            account: self.view(account).await?,
            message: "Login successful",
        })
    }

    async fn assign_access_levels(
        &self,
        account_id: Uuid,
        access_level_ids: &[i32],
    ) -> Result<(), ServiceError> {
        self.accounts_repo.find_by_id(account_id).await?;

        for &access_level_id in access_level_ids {
            match self.access_levels_repo.find_by_id(access_level_id).await {
                Ok(_) => {}
                Err(StoreError::NotFound(_)) => {
                    return Err(ServiceError::NotFound(format!(
                        "access level {access_level_id} not found"
                    )));
                }
                Err(err) => return Err(err.into()),
            }
            self.access_levels_repo
                .assign_to_account(account_id, access_level_id)
                .await?;
            tracing::info!(%account_id, access_level_id, "access level assigned");
        }

        Ok(())
    }

    async fn remove_access_level(
        &self,
        account_id: Uuid,
        access_level_id: i32,
    ) -> Result<(), ServiceError> {
        self.access_levels_repo
            .remove_from_account(account_id, access_level_id)
            .await?;
        tracing::info!(%account_id, access_level_id, "access level removed");
        Ok(())
    }

    async fn access_levels(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<AccessLevelView>, ServiceError> {
        let levels = self.access_levels_repo.list_for_account(account_id).await?;
        Ok(levels.into_iter().map(AccessLevelView::from).collect())
    }
}
