use sea_orm::entity::prelude::*;

/// One row per (account, access level) pair for the lifetime of the pair. Removal stamps
/// `deleted_at`; re-assignment clears it on the same row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "account_access_levels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub access_level_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_delete = "Cascade"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::access_levels::Entity",
        from = "Column::AccessLevelId",
        to = "super::access_levels::Column::Id",
        on_delete = "Cascade"
    )]
    AccessLevels,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::access_levels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessLevels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::SoftDelete for Entity {
    fn deleted_at() -> Column {
        Column::DeletedAt
    }
}
