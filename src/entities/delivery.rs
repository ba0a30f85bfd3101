use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Delivery lifecycle status.
///
/// The stored string values are the labels the dispatch floor already uses;
/// they are also the wire representation. Which subset of the five is
/// active in a given deployment is decided by
/// [`crate::ledger::LifecycleVariant`], not per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "SO Created")]
    Created,

    #[sea_orm(string_value = "Schedule Create")]
    Scheduled,

    #[sea_orm(string_value = "Batching on Process")]
    Batching,

    #[sea_orm(string_value = "Out for Delivery")]
    OutForDelivery,

    #[sea_orm(string_value = "Delivered")]
    Delivered,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Created => write!(f, "SO Created"),
            DeliveryStatus::Scheduled => write!(f, "Schedule Create"),
            DeliveryStatus::Batching => write!(f, "Batching on Process"),
            DeliveryStatus::OutForDelivery => write!(f, "Out for Delivery"),
            DeliveryStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let status = match value.to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "so created" | "created" => DeliveryStatus::Created,
            "schedule create" | "scheduled" => DeliveryStatus::Scheduled,
            "batching on process" | "batching" => DeliveryStatus::Batching,
            "out for delivery" => DeliveryStatus::OutForDelivery,
            "delivered" => DeliveryStatus::Delivered,
            other => return Err(format!("Unknown delivery status '{}'", other)),
        };
        Ok(status)
    }
}

/// One mixer trip against an order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning order; immutable after creation.
    pub order_id: i64,

    /// Batch ticket reference from the plant.
    #[validate(length(
        min = 1,
        max = 255,
        message = "MP number must be between 1 and 255 characters"
    ))]
    pub mp_no: String,

    pub equipment_id: Option<i64>,

    /// This trip's volume in cubic meters. Never negative.
    pub volume: Decimal,

    pub status: DeliveryStatus,

    /// Monotonic per order; ties (racing creates) are broken by `id`.
    pub sequence_key: i64,

    pub schedule_date: Option<NaiveDate>,
    pub schedule_time: Option<NaiveTime>,

    /// Optimistic-lock counter, bumped on every mutation.
    pub version: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,

    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id",
        on_delete = "SetNull"
    )]
    Equipment,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_labels() {
        for status in [
            DeliveryStatus::Created,
            DeliveryStatus::Scheduled,
            DeliveryStatus::Batching,
            DeliveryStatus::OutForDelivery,
            DeliveryStatus::Delivered,
        ] {
            let label = status.to_string();
            assert_eq!(label.parse::<DeliveryStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_parse_accepts_relaxed_forms() {
        assert_eq!(
            "out-for-delivery".parse::<DeliveryStatus>().unwrap(),
            DeliveryStatus::OutForDelivery
        );
        assert_eq!(
            "batching".parse::<DeliveryStatus>().unwrap(),
            DeliveryStatus::Batching
        );
        assert!("in transit".parse::<DeliveryStatus>().is_err());
    }
}
