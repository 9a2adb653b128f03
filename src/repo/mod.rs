pub mod access_levels;
pub mod accounts;

use sea_orm::{sea_query::SimpleExpr, ColumnTrait, DbErr, EntityTrait, QueryFilter, Select};

use crate::entities::SoftDelete;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("failed to {op}: {source}")]
    Persistence {
        op: &'static str,
        #[source]
        source: DbErr,
    },
}

pub(crate) trait DbResultExt<T> {
    fn context(self, op: &'static str) -> Result<T, StoreError>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn context(self, op: &'static str) -> Result<T, StoreError> {
        self.map_err(|source| StoreError::Persistence { op, source })
    }
}

/// Filter that hides soft-deleted rows. Reads go through [`active`]; conditional writes
/// apply this directly.
pub(crate) fn not_deleted<E: SoftDelete>() -> SimpleExpr {
    E::deleted_at().is_null()
}

pub(crate) fn active<E: SoftDelete>() -> Select<E> {
    E::find().filter(not_deleted::<E>())
}
