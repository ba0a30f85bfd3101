use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::activity_log;
use crate::errors::ServiceError;

/// Lists audit entries, newest first, optionally scoped to one module.
#[instrument(skip(db))]
pub async fn list_activity_logs(
    db: &DbPool,
    page: u64,
    limit: u64,
    module: Option<String>,
) -> Result<(Vec<activity_log::Model>, u64), ServiceError> {
    let mut query = activity_log::Entity::find();

    if let Some(module) = module.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        query = query.filter(activity_log::Column::Module.eq(module));
    }

    let paginator = query
        .order_by_desc(activity_log::Column::CreatedAt)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let entries = paginator.fetch_page(page - 1).await?;

    Ok((entries, total))
}
