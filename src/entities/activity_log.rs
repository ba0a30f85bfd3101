use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit trail, written by the event worker only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub actor_name: String,
    pub actor_id: Option<i64>,

    /// "created", "updated", "status_changed", "deleted", ...
    pub action: String,

    /// Resource family the action touched ("orders", "deliveries", ...).
    pub module: String,

    pub record_id: Option<i64>,
    pub description: String,

    pub old_values: Option<Json>,
    pub new_values: Option<Json>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
