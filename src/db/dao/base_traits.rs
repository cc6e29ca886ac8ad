pub trait HasCreatedAtColumn: sea_orm::EntityTrait {
    fn created_at_column() -> Self::Column;
}

pub trait TimestampedActiveModel {
    fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone);
}
