use async_trait::async_trait;
use sea_orm::Set;
use std::sync::Arc;

use super::{required, ServiceError};
use crate::{
    entities::access_levels,
    repo::{access_levels::AccessLevelsRepo, StoreError},
};

const NAME_MAX: usize = 50;

pub struct CreateAccessLevelInput {
    pub name: String,
    pub description: Option<String>,
}

/// Public shape of an access level. A missing description is an empty string.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessLevelView {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<access_levels::Model> for AccessLevelView {
    fn from(model: access_levels::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description.unwrap_or_default(),
        }
    }
}

#[async_trait]
pub trait AccessLevelsService: Send + Sync {
    async fn create(&self, input: CreateAccessLevelInput)
        -> Result<AccessLevelView, ServiceError>;
    async fn get(&self, id: i32) -> Result<AccessLevelView, ServiceError>;
    async fn list(&self) -> Result<Vec<AccessLevelView>, ServiceError>;
}

pub struct AccessLevelsServiceImpl {
    repo: Arc<dyn AccessLevelsRepo>,
}

impl AccessLevelsServiceImpl {
    pub fn new(repo: Arc<dyn AccessLevelsRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AccessLevelsService for AccessLevelsServiceImpl {
    async fn create(
        &self,
        input: CreateAccessLevelInput,
    ) -> Result<AccessLevelView, ServiceError> {
        let name = required("name", &input.name, NAME_MAX)?;

        match self.repo.find_by_name(&name).await {
            Ok(_) => {
                tracing::warn!(name = %name, "access level name already in use");
                return Err(ServiceError::Conflict(format!(
                    "access level with name {name} already exists"
                )));
            }
            Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let model = access_levels::ActiveModel {
            name: Set(name),
            description: Set(input.description.filter(|value| !value.is_empty())),
            ..Default::default()
        };
        let created = self.repo.create(model).await?;
        tracing::info!(access_level_id = created.id, "access level created");
        Ok(created.into())
    }

    async fn get(&self, id: i32) -> Result<AccessLevelView, ServiceError> {
        Ok(self.repo.find_by_id(id).await?.into())
    }

    async fn list(&self) -> Result<Vec<AccessLevelView>, ServiceError> {
        let levels = self.repo.list().await?;
        Ok(levels.into_iter().map(AccessLevelView::from).collect())
    }
}
