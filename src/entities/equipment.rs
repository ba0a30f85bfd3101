use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A delivery vehicle (transit mixer) and the operator it is assigned to.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Equipment name must be between 1 and 255 characters"
    ))]
    pub equipment_name: String,

    #[validate(length(
        min = 1,
        max = 32,
        message = "Plate number must be between 1 and 32 characters"
    ))]
    pub plate_no: String,

    pub operator_name: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::delivery::Entity")]
    Deliveries,
}

impl Related<super::delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deliveries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
