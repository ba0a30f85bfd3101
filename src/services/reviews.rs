use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use crate::actor::Actor;
use crate::db::DbPool;
use crate::entities::review::{self, ReviewStatus};
use crate::entities::customer;
use crate::errors::ServiceError;
use crate::events::{AuditEvent, Event, EventSender};

/// A submitted satisfaction form.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub q1: bool,
    pub q2: bool,
    pub q3: bool,
    pub q4: bool,
    pub q5: i16,
    pub q6: i16,
    pub q7: String,
    pub q8: String,
    pub q9: String,
    pub q10: String,
}

#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl ReviewService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Client submits a review; it enters moderation as `pending`.
    #[instrument(skip(self, actor, input))]
    pub async fn submit_review(
        &self,
        input: ReviewInput,
        actor: &Actor,
    ) -> Result<review::Model, ServiceError> {
        let customer_id = actor.id.ok_or_else(|| {
            ServiceError::Unauthorized("Client actor id is required to submit a review".to_string())
        })?;

        customer::Entity::find_by_id(customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("Customer {} not found", customer_id))
            })?;

        for rating in [input.q5, input.q6] {
            if !(1..=5).contains(&rating) {
                return Err(ServiceError::ValidationError(
                    "Ratings must be between 1 and 5".to_string(),
                ));
            }
        }
        for essay in [&input.q7, &input.q8, &input.q9, &input.q10] {
            if essay.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "All written answers are required".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let model = review::ActiveModel {
            customer_id: Set(customer_id),
            q1: Set(input.q1),
            q2: Set(input.q2),
            q3: Set(input.q3),
            q4: Set(input.q4),
            q5: Set(input.q5),
            q6: Set(input.q6),
            q7: Set(input.q7),
            q8: Set(input.q8),
            q9: Set(input.q9),
            q10: Set(input.q10),
            status: Set(ReviewStatus::Pending),
            submitted_at: Set(now),
            created_at: Set(now),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::ReviewSubmitted {
                    review_id: created.id,
                    customer_id,
                },
            ))
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_review(&self, review_id: i64) -> Result<Option<review::Model>, ServiceError> {
        Ok(review::Entity::find_by_id(review_id).one(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_reviews(
        &self,
        page: u64,
        limit: u64,
        status: Option<ReviewStatus>,
        customer_id: Option<i64>,
    ) -> Result<(Vec<review::Model>, u64), ServiceError> {
        let mut query = review::Entity::find();

        if let Some(status) = status {
            query = query.filter(review::Column::Status.eq(status));
        }
        if let Some(customer_id) = customer_id {
            query = query.filter(review::Column::CustomerId.eq(customer_id));
        }

        let paginator = query
            .order_by_desc(review::Column::SubmittedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let reviews = paginator.fetch_page(page - 1).await?;

        Ok((reviews, total))
    }

    /// Staff moderation: approve or reject a pending review.
    #[instrument(skip(self, actor))]
    pub async fn update_status(
        &self,
        review_id: i64,
        new_status: ReviewStatus,
        actor: &Actor,
    ) -> Result<review::Model, ServiceError> {
        let existing = review::Entity::find_by_id(review_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", review_id)))?;

        if existing.status == new_status {
            return Err(ServiceError::InvalidOperation(format!(
                "Review {} is already {}",
                review_id, new_status
            )));
        }

        let old_status = existing.status;
        let mut active: review::ActiveModel = existing.into();
        active.status = Set(new_status);

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .emit(AuditEvent::by(
                actor,
                Event::ReviewStatusChanged {
                    review_id,
                    old_status: old_status.to_string(),
                    new_status: updated.status.to_string(),
                },
            ))
            .await;

        Ok(updated)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete_review(&self, review_id: i64, actor: &Actor) -> Result<(), ServiceError> {
        review::Entity::find_by_id(review_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", review_id)))?;

        review::Entity::delete_by_id(review_id)
            .exec(&*self.db)
            .await?;

        self.event_sender
            .emit(AuditEvent::by(actor, Event::ReviewDeleted { review_id }))
            .await;

        Ok(())
    }
}
