use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A sales order: one customer, one design mix, a contracted total volume
/// to be fulfilled across any number of delivery trips.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[validate(length(
        min = 1,
        max = 50,
        message = "SO number must be between 1 and 50 characters"
    ))]
    pub so_no: String,

    pub customer_id: i64,
    pub item_design_id: Option<i64>,

    /// Contracted volume in cubic meters. Never negative.
    pub total_delivery: Decimal,

    pub site_address: Option<String>,
    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,

    #[sea_orm(
        belongs_to = "super::item_design::Entity",
        from = "Column::ItemDesignId",
        to = "super::item_design::Column::Id",
        on_delete = "SetNull"
    )]
    ItemDesign,

    #[sea_orm(has_many = "super::delivery::Entity")]
    Deliveries,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::item_design::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemDesign.def()
    }
}

impl Related<super::delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deliveries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
