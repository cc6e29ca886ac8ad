use sea_orm::entity::prelude::*;

use crate::db::dao::base_traits::{HasCreatedAtColumn, TimestampedActiveModel};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(default_value = false)]
    pub completed: bool,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}

impl TimestampedActiveModel for ActiveModel {
    fn set_created_at(&mut self, ts: DateTimeWithTimeZone) {
        self.created_at = sea_orm::ActiveValue::Set(ts);
    }
}

impl HasCreatedAtColumn for Entity {
    fn created_at_column() -> Self::Column {
        Column::CreatedAt
    }
}
